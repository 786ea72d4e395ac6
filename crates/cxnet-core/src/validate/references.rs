use super::{ElementIds, IssueKind, ValidationReport, collect_element_ids, index_segment};
use crate::cx2::{Cx2Document, EDGE_BYPASSES, EDGES, NODE_BYPASSES};
use serde_json::Value;

/// Edge endpoints must name nodes; bypasses must name elements of their group.
///
/// Builds its own id sets when `ids` is `None`.
pub fn check_references(doc: &Cx2Document, ids: Option<&ElementIds>) -> ValidationReport {
    let owned;
    let ids = match ids {
        Some(ids) => ids,
        None => {
            owned = collect_element_ids(doc);
            &owned
        }
    };
    let mut report = ValidationReport::new();
    let kind = IssueKind::Reference;

    for (i, edge) in doc.aspect_elements(EDGES).enumerate() {
        for end in ["s", "t"] {
            if let Some(node) = edge.get(end).and_then(Value::as_i64) {
                if !ids.nodes.contains(&node) {
                    report.error(
                        kind,
                        issue_path![EDGES, index_segment(i), end],
                        format!("edge endpoint {node} does not reference an existing node"),
                    );
                }
            }
        }
    }

    for (tag, targets, group) in [
        (NODE_BYPASSES, &ids.nodes, "node"),
        (EDGE_BYPASSES, &ids.edges, "edge"),
    ] {
        for (i, bypass) in doc.aspect_elements(tag).enumerate() {
            let path = issue_path![tag, index_segment(i)];
            match bypass.get("id").and_then(Value::as_i64) {
                Some(id) if targets.contains(&id) => {}
                Some(id) => report.error(kind, path, format!("bypass targets missing {group} {id}")),
                None => report.error(kind, path, "bypass has no integer id"),
            }
        }
    }
    report
}
