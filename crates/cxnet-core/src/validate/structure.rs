use super::{IssueKind, ValidateOptions, ValidationReport, index_segment};
use crate::cx2::STATUS;
use serde_json::Value;

/// Checks the array/preamble/aspect shape of the raw document.
pub fn check_structure(doc: &Value, options: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let kind = IssueKind::Structure;

    let Value::Array(items) = doc else {
        report.error(kind, Vec::new(), "CX2 document must be a JSON array");
        return report;
    };
    let Some(first) = items.first() else {
        report.error(kind, Vec::new(), "CX2 document is empty");
        return report;
    };

    match first.get("CXVersion") {
        None => report.error(kind, issue_path![index_segment(0)], "missing CXVersion in preamble"),
        Some(Value::String(version)) => {
            if options.supported_versions.iter().any(|v| v == version) {
                report.version = Some(version.clone());
            } else {
                report.error(
                    kind,
                    issue_path![index_segment(0), "CXVersion"],
                    format!(
                        "unsupported CX version {version:?}; supported: {}",
                        options.supported_versions.join(", ")
                    ),
                );
            }
        }
        Some(other) => report.error(
            kind,
            issue_path![index_segment(0), "CXVersion"],
            format!("CXVersion must be a string, found {other}"),
        ),
    }

    for (i, item) in items.iter().enumerate().skip(1) {
        let Value::Object(obj) = item else {
            report.error(kind, issue_path![index_segment(i)], "aspect must be an object");
            continue;
        };
        if obj.len() != 1 {
            report.error(
                kind,
                issue_path![index_segment(i)],
                format!("aspect must have exactly one key, found {}", obj.len()),
            );
            continue;
        }
        for (tag, value) in obj {
            if !value.is_array() {
                report.error(
                    kind,
                    issue_path![index_segment(i), tag],
                    format!("aspect {tag:?} must hold an array"),
                );
            }
        }
    }
    if !report.is_valid {
        return report;
    }

    let status = items
        .last()
        .filter(|_| items.len() > 1)
        .and_then(|last| last.get(STATUS))
        .and_then(Value::as_array);
    match status {
        None if options.require_status => {
            report.error(kind, Vec::new(), "document does not end with a status aspect")
        }
        None => report.warning(kind, Vec::new(), "document does not end with a status aspect"),
        Some(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                if entry.get("success").and_then(Value::as_bool) == Some(false) {
                    let message = entry.get("error").and_then(Value::as_str).unwrap_or("unknown error");
                    report.warning(
                        kind,
                        issue_path![STATUS, index_segment(i)],
                        format!("document reports failure: {message}"),
                    );
                }
            }
        }
    }
    report
}
