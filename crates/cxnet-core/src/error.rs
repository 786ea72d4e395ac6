use crate::mapping::MappingError;
use crate::validate::ValidationReport;
use crate::value::VisualPropertyValue;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CX2 document must be a JSON array")]
    NotAnArray,

    #[error("Invalid CX2 document: {}", summarize(.report))]
    InvalidDocument { report: Box<ValidationReport> },

    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Unknown network: {network_id}")]
    UnknownNetwork { network_id: String },

    #[error("Invalid value for visual property {name}: {value:?}")]
    InvalidVisualPropertyValue {
        name: String,
        value: VisualPropertyValue,
    },

    #[error("Unknown {group} element: {element_id}")]
    UnknownElement { group: &'static str, element_id: String },
}

fn summarize(report: &ValidationReport) -> String {
    match report.errors.first() {
        Some(first) if report.errors.len() > 1 => {
            format!("{} (and {} more errors)", first, report.errors.len() - 1)
        }
        Some(first) => first.to_string(),
        None => "no errors reported".to_string(),
    }
}
