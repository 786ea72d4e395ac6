use super::{IssueKind, ValidationReport, index_segment};
use crate::cx2::{ATTRIBUTE_DECLARATIONS, Cx2Document, EDGES, NETWORK_ATTRIBUTES, NODES};
use crate::value::{AttributeType, is_valid_data_type};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

/// What one declared attribute resolves to: full name and declared type.
struct Declared<'a> {
    name: &'a str,
    ty: Option<AttributeType>,
}

/// Checks one declaration scope and returns a lookup keyed by both name and alias.
fn check_scope<'a>(
    report: &mut ValidationReport,
    scope: &str,
    decls: &'a Map<String, Value>,
) -> IndexMap<&'a str, Declared<'a>> {
    let kind = IssueKind::Attribute;
    let mut lookup = IndexMap::new();
    let is_network = scope == NETWORK_ATTRIBUTES;

    for (name, decl) in decls {
        let path = issue_path![ATTRIBUTE_DECLARATIONS, scope, name];
        let Some(decl) = decl.as_object() else {
            report.error(kind, path, "declaration must be an object");
            continue;
        };
        let ty = match decl.get("d") {
            None => Some(AttributeType::String),
            Some(Value::String(tag)) => {
                let ty = AttributeType::parse(tag);
                if ty.is_none() {
                    report.error(kind, path.clone(), format!("unknown attribute type {tag:?}"));
                }
                ty
            }
            Some(other) => {
                report.error(kind, path.clone(), format!("declared type must be a string, found {other}"));
                None
            }
        };

        if is_network {
            for field in ["a", "v"] {
                if decl.contains_key(field) {
                    report.error(
                        kind,
                        path.clone(),
                        format!("network attribute declarations do not support {field:?}"),
                    );
                }
            }
        } else {
            if let (Some(default), Some(ty)) = (decl.get("v"), ty) {
                if !is_valid_data_type(default, ty) {
                    report.error(
                        kind,
                        path.clone(),
                        format!("default value {default} does not match declared type {ty}"),
                    );
                }
            }
            match decl.get("a") {
                None => {}
                Some(Value::String(alias)) => {
                    if decls.contains_key(alias) || lookup.contains_key(alias.as_str()) {
                        report.error(kind, path.clone(), format!("alias {alias:?} collides with another attribute"));
                    } else {
                        lookup.insert(alias.as_str(), Declared { name, ty });
                    }
                }
                Some(other) => report.error(kind, path.clone(), format!("alias must be a string, found {other}")),
            }
        }
        lookup.insert(name.as_str(), Declared { name, ty });
    }
    lookup
}

fn check_values(
    report: &mut ValidationReport,
    lookup: &IndexMap<&str, Declared<'_>>,
    path: &[String],
    values: &Map<String, Value>,
    undeclared: &mut FxHashSet<String>,
) {
    for (key, value) in values {
        match lookup.get(key.as_str()) {
            Some(Declared { name, ty: Some(ty) }) => {
                if !is_valid_data_type(value, *ty) {
                    let mut p = path.to_vec();
                    p.push((*name).to_string());
                    report.error(
                        IssueKind::Attribute,
                        p,
                        format!("value {value} of attribute {name:?} does not match declared type {ty}"),
                    );
                }
            }
            // Unknown declared type was already reported on the declaration.
            Some(Declared { ty: None, .. }) => {}
            None => {
                if undeclared.insert(key.clone()) {
                    let mut p = path.to_vec();
                    p.push(key.clone());
                    report.warning(IssueKind::Attribute, p, format!("attribute {key:?} is not declared"));
                }
            }
        }
    }
}

/// Checks declarations and every element/network attribute value against them.
pub fn check_attributes(doc: &Cx2Document) -> ValidationReport {
    let mut report = ValidationReport::new();
    let empty = Map::new();
    let declarations = doc.find_aspect(ATTRIBUTE_DECLARATIONS).and_then(|a| a.first());
    if let Some(first) = declarations {
        if !first.is_object() {
            report.error(
                IssueKind::Attribute,
                issue_path![ATTRIBUTE_DECLARATIONS, index_segment(0)],
                "attribute declarations must be an object",
            );
        }
    }
    let scope = |tag: &str| {
        declarations
            .and_then(|d| d.get(tag))
            .and_then(Value::as_object)
            .unwrap_or(&empty)
    };

    let network_decls = scope(NETWORK_ATTRIBUTES);
    let node_decls = scope(NODES);
    let edge_decls = scope(EDGES);
    let network = check_scope(&mut report, NETWORK_ATTRIBUTES, network_decls);
    let nodes = check_scope(&mut report, NODES, node_decls);
    let edges = check_scope(&mut report, EDGES, edge_decls);

    for (tag, lookup) in [(NETWORK_ATTRIBUTES, &network), (NODES, &nodes), (EDGES, &edges)] {
        let mut undeclared = FxHashSet::default();
        for (i, element) in doc.aspect_elements(tag).enumerate() {
            let values = if tag == NETWORK_ATTRIBUTES {
                element.as_object()
            } else {
                element.get("v").and_then(Value::as_object)
            };
            if let Some(values) = values {
                let path = issue_path![tag, index_segment(i)];
                check_values(&mut report, lookup, &path, values, &mut undeclared);
            }
        }
    }
    report
}
