//! CX2 document validation.
//!
//! [`validate`] runs the passes in order and merges their reports. The structure pass runs first
//! and short-circuits everything else when it finds errors. Every other pass is independent and
//! can be called on its own against a parsed [`Cx2Document`].

// Issue path from mixed string-ish segments.
macro_rules! issue_path {
    ($($seg:expr),* $(,)?) => {
        vec![$(::std::string::ToString::to_string(&$seg)),*]
    };
}

mod attributes;
mod elements;
mod metadata;
mod references;
mod structure;
mod visual_properties;

pub use attributes::check_attributes;
pub use elements::{ElementIds, check_elements, collect_element_ids};
pub use metadata::check_metadata;
pub use references::check_references;
pub use structure::check_structure;
pub use visual_properties::check_visual_properties;

use crate::cx2::{CX_VERSION, Cx2Document};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    Structure,
    Metadata,
    Element,
    Reference,
    Attribute,
    VisualProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    pub path: Vec<String>,
    pub severity: Severity,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.path.join(" / "))
        }
    }
}

pub(crate) fn index_segment(i: usize) -> String {
    format!("index {i}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            version: None,
        }
    }

    pub fn error(&mut self, kind: IssueKind, path: Vec<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            message: message.into(),
            path,
            severity: Severity::Error,
            kind,
        });
        self.is_valid = false;
    }

    pub fn warning(&mut self, kind: IssueKind, path: Vec<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            message: message.into(),
            path,
            severity: Severity::Warning,
            kind,
        });
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        if self.version.is_none() {
            self.version = other.version;
        }
    }

    pub fn has_errors_of(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

/// Validation policy knobs. The passes themselves are always the strict ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    pub supported_versions: Vec<String>,
    /// Missing `metaData` is an error instead of going unreported.
    pub require_metadata: bool,
    /// Missing trailing `status` aspect is an error instead of a warning.
    pub require_status: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            supported_versions: vec![CX_VERSION.to_string()],
            require_metadata: false,
            require_status: false,
        }
    }
}

impl ValidateOptions {
    /// Metadata and trailing status are both mandatory.
    pub fn strict() -> Self {
        Self {
            require_metadata: true,
            require_status: true,
            ..Default::default()
        }
    }

    /// Metadata and status may be absent.
    pub fn lenient() -> Self {
        Self::default()
    }
}

/// Validates a raw CX2 document. Never fails: every finding is in the returned report.
pub fn validate(doc: &Value, options: &ValidateOptions) -> ValidationReport {
    let mut report = check_structure(doc, options);
    if !report.is_valid {
        return report;
    }
    let parsed = match Cx2Document::parse(doc) {
        Ok(parsed) => parsed,
        Err(err) => {
            report.error(IssueKind::Structure, Vec::new(), err.to_string());
            return report;
        }
    };

    report.merge(check_metadata(&parsed, options));
    let (element_report, ids) = check_elements(&parsed);
    report.merge(element_report);
    report.merge(check_references(&parsed, Some(&ids)));
    report.merge(check_attributes(&parsed));
    report.merge(check_visual_properties(&parsed));

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated CX2 document"
    );
    report
}
