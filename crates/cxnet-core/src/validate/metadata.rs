use super::{IssueKind, ValidateOptions, ValidationReport, index_segment};
use crate::cx2::{Cx2Document, METADATA, STATUS};
use serde_json::Value;

/// Cross-checks `metaData` declarations against the aspects actually present.
pub fn check_metadata(doc: &Cx2Document, options: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let kind = IssueKind::Metadata;

    if !doc.has_aspect(METADATA) {
        if options.require_metadata {
            report.error(kind, Vec::new(), "document has no metaData aspect");
        }
        return report;
    }

    let mut declared: Vec<&str> = Vec::new();
    for (i, entry) in doc.aspect_elements(METADATA).enumerate() {
        let path = issue_path![METADATA, index_segment(i)];
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            report.error(kind, path, "metaData entry has no name");
            continue;
        };
        declared.push(name);
        let declared_count = entry.get("elementCount").and_then(Value::as_u64);

        if !doc.has_aspect(name) {
            match declared_count {
                Some(n) if n > 0 => report.error(
                    kind,
                    path,
                    format!("metaData declares {n} {name} elements but the aspect is missing"),
                ),
                _ => report.warning(kind, path, format!("metaData declares missing aspect {name:?}")),
            }
            continue;
        }

        let actual = doc.aspect_len(name) as u64;
        match declared_count {
            Some(n) if n == actual => {}
            Some(0) => report.warning(
                kind,
                path,
                format!("metaData declares 0 {name} elements, found {actual}"),
            ),
            Some(n) => report.error(
                kind,
                path,
                format!("metaData declares {n} {name} elements, found {actual}"),
            ),
            None => {}
        }
    }

    for tag in doc.aspect_tags() {
        if tag != METADATA && tag != STATUS && !declared.contains(&tag) {
            report.warning(kind, issue_path![tag], format!("aspect {tag:?} is not declared in metaData"));
        }
    }
    report
}
