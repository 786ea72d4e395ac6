//! Typed shapes of the CX2 aspects this crate understands.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CX_VERSION: &str = "2.0";

pub const NODES: &str = "nodes";
pub const EDGES: &str = "edges";
pub const NETWORK_ATTRIBUTES: &str = "networkAttributes";
pub const ATTRIBUTE_DECLARATIONS: &str = "attributeDeclarations";
pub const VISUAL_PROPERTIES: &str = "visualProperties";
pub const NODE_BYPASSES: &str = "nodeBypasses";
pub const EDGE_BYPASSES: &str = "edgeBypasses";
pub const METADATA: &str = "metaData";
pub const VISUAL_EDITOR_PROPERTIES: &str = "visualEditorProperties";
pub const STATUS: &str = "status";

/// Aspect tags with a typed model in this crate. Anything else is carried as an opaque aspect.
pub const KNOWN_ASPECTS: &[&str] = &[
    NODES,
    EDGES,
    NETWORK_ATTRIBUTES,
    ATTRIBUTE_DECLARATIONS,
    VISUAL_PROPERTIES,
    NODE_BYPASSES,
    EDGE_BYPASSES,
    METADATA,
    VISUAL_EDITOR_PROPERTIES,
    STATUS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2Node {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2Edge {
    pub id: i64,
    pub s: i64,
    pub t: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Map<String, Value>>,
}

/// One `{d, v, a}` entry of an attribute declaration scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDeclarations {
    #[serde(
        rename = "networkAttributes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub network_attributes: IndexMap<String, DeclaredAttribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nodes: IndexMap<String, DeclaredAttribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub edges: IndexMap<String, DeclaredAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cx2VisualPropertyDefaults {
    #[serde(default)]
    pub node: Map<String, Value>,
    #[serde(default)]
    pub edge: Map<String, Value>,
    #[serde(default)]
    pub network: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2Mapping {
    #[serde(rename = "type")]
    pub mapping_type: String,
    #[serde(default)]
    pub definition: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cx2VisualProperties {
    #[serde(default)]
    pub default: Cx2VisualPropertyDefaults,
    #[serde(rename = "nodeMapping", default)]
    pub node_mapping: IndexMap<String, Cx2Mapping>,
    #[serde(rename = "edgeMapping", default)]
    pub edge_mapping: IndexMap<String, Cx2Mapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2Bypass {
    pub id: i64,
    #[serde(default)]
    pub v: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2MetaData {
    pub name: String,
    #[serde(rename = "elementCount", default)]
    pub element_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cx2VisualEditorProperties {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cx2Status {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
