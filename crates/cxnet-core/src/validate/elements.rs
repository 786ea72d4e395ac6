use super::{IssueKind, ValidationReport, index_segment};
use crate::cx2::{Cx2Document, EDGES, NODES};
use rustc_hash::FxHashSet;
use serde_json::Value;

/// Node and edge CX2 ids seen in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementIds {
    pub nodes: FxHashSet<i64>,
    pub edges: FxHashSet<i64>,
}

fn integer_field(element: &Value, key: &str) -> Option<i64> {
    element.get(key).and_then(Value::as_i64)
}

pub fn collect_element_ids(doc: &Cx2Document) -> ElementIds {
    ElementIds {
        nodes: doc
            .aspect_elements(NODES)
            .filter_map(|n| integer_field(n, "id"))
            .collect(),
        edges: doc
            .aspect_elements(EDGES)
            .filter_map(|e| integer_field(e, "id"))
            .collect(),
    }
}

/// Checks node/edge ids and edge endpoint encodings. Returns the id sets for the reference pass.
pub fn check_elements(doc: &Cx2Document) -> (ValidationReport, ElementIds) {
    let mut report = ValidationReport::new();
    let mut ids = ElementIds::default();
    let kind = IssueKind::Element;

    for (tag, seen) in [(NODES, &mut ids.nodes), (EDGES, &mut ids.edges)] {
        for (i, element) in doc.aspect_elements(tag).enumerate() {
            let path = issue_path![tag, index_segment(i)];
            if !element.is_object() {
                report.error(kind, path, format!("{tag} element must be an object"));
                continue;
            }
            match element.get("id") {
                None => report.error(kind, path.clone(), "element has no id"),
                Some(id) => match id.as_i64() {
                    Some(id) => {
                        if !seen.insert(id) {
                            report.warning(kind, path.clone(), format!("duplicate id {id}"));
                        }
                    }
                    None => report.error(kind, path.clone(), format!("id must be an integer, found {id}")),
                },
            }
            if tag == EDGES {
                for end in ["s", "t"] {
                    if integer_field(element, end).is_none() {
                        report.error(
                            kind,
                            issue_path![tag, index_segment(i), end],
                            format!("edge endpoint {end:?} must be an integer"),
                        );
                    }
                }
            }
            if element.get("v").is_some_and(|v| !v.is_object() && !v.is_null()) {
                report.error(kind, issue_path![tag, index_segment(i), "v"], "attribute map must be an object");
            }
            if tag == NODES {
                for coord in ["x", "y", "z"] {
                    if element.get(coord).is_some_and(|c| !c.is_number() && !c.is_null()) {
                        report.error(
                            kind,
                            issue_path![tag, index_segment(i), coord],
                            format!("coordinate {coord:?} must be a number"),
                        );
                    }
                }
            }
        }
    }
    (report, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicates_warn_and_bad_ids_error() {
        let doc = Cx2Document::parse(&json!([
            {"CXVersion": "2.0"},
            {"nodes": [{"id": 1}, {"id": 1}, {"id": "2"}, {"x": 3}]},
            {"edges": [{"id": 5, "s": 1, "t": "1"}]},
        ]))
        .unwrap();
        let (report, ids) = check_elements(&doc);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[2].path, vec!["edges", "index 0", "t"]);
        assert!(ids.nodes.contains(&1));
        assert!(ids.edges.contains(&5));
    }

    #[test]
    fn fragments_share_one_id_space() {
        let doc = Cx2Document::parse(&json!([
            {"CXVersion": "2.0"},
            {"nodes": [{"id": 1}]},
            {"nodes": [{"id": 1}]},
        ]))
        .unwrap();
        let (report, _) = check_elements(&doc);
        assert!(report.is_valid);
        assert_eq!(report.warnings[0].path, vec!["nodes", "index 1"]);
        assert_eq!(collect_element_ids(&doc).nodes.len(), 1);
    }
}
