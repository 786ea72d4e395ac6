#![forbid(unsafe_code)]

//! CX2 network document model, validator and visual-mapping engine (headless).
//!
//! Design goals:
//! - parse a CX2 document once into typed network/table/style/view models
//! - report every validation finding instead of failing on the first one
//! - resolve per-element visual property values deterministically (bypass, mapping, default)

pub mod color;
pub mod config;
pub mod cx2;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod network;
pub mod store;
pub mod table;
pub mod validate;
pub mod value;
pub mod view;
pub mod visual_style;

pub use config::Config;
pub use error::{Error, Result};
pub use export::export_to_cx2;
pub use import::{ImportedNetwork, import_cx2, import_cx2_with_id};
pub use mapping::{MappingError, MappingFunction, resolve_value};
pub use network::Network;
pub use store::{NetworkBundle, NetworkStore};
pub use table::{NetworkAttributes, Table};
pub use validate::{ValidateOptions, ValidationReport, validate};
pub use value::{AttributeType, AttributeValue, VisualPropertyValue};
pub use view::{NetworkView, VisualEditorProperties, build_view};
pub use visual_style::{VisualProperty, VisualPropertyName, VisualStyle};

use serde_json::Value;

/// Entry point bundling configuration with the validate/import/export operations.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merges `config` over the defaults.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config.deep_merge(config.as_value());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate_options(&self) -> ValidateOptions {
        self.config.validate_options()
    }

    pub fn validate_value(&self, doc: &Value) -> ValidationReport {
        validate(doc, &self.validate_options())
    }

    /// Only malformed JSON is an `Err`; every other finding lands in the report.
    pub fn validate_str(&self, text: &str) -> Result<ValidationReport> {
        let doc: Value = serde_json::from_str(text)?;
        Ok(self.validate_value(&doc))
    }

    pub fn import_value(&self, doc: &Value) -> Result<ImportedNetwork> {
        import_cx2(doc, &self.validate_options())
    }

    pub fn import_str(&self, text: &str) -> Result<ImportedNetwork> {
        let doc: Value = serde_json::from_str(text)?;
        self.import_value(&doc)
    }

    pub fn export(&self, bundle: &NetworkBundle) -> Value {
        export_to_cx2(bundle)
    }
}

#[cfg(test)]
mod tests;
