//! Typed models → CX2 document.

use crate::cx2::{
    ATTRIBUTE_DECLARATIONS, AttributeDeclarations, CX_VERSION, EDGE_BYPASSES, EDGES, METADATA,
    NETWORK_ATTRIBUTES, NODE_BYPASSES, NODES, STATUS, VISUAL_EDITOR_PROPERTIES, VISUAL_PROPERTIES,
    translate_edge_id_to_cx, translate_node_id_to_cx,
};
use crate::store::NetworkBundle;
use crate::visual_style::cx2::{visual_style_to_cx, vp_value_to_cx};
use crate::visual_style::{VisualPropertyGroup, VisualStyle};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde_json::{Map, Value, json};

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to encode aspect element");
        Value::Null
    })
}

/// Internal id → CX2 numeric id. Ids that are not numeric, or whose number is already taken,
/// get fresh numbers past the largest one (wrapping to the lowest free number at `i64::MAX`).
fn cx_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    parse: fn(&str) -> Option<i64>,
) -> FxHashMap<&'a str, i64> {
    let mut used: FxHashSet<i64> = FxHashSet::default();
    let mut out = FxHashMap::default();
    let mut pending = Vec::new();
    for id in ids {
        if out.contains_key(id) {
            continue;
        }
        match parse(id) {
            Some(cx) if used.insert(cx) => {
                out.insert(id, cx);
            }
            _ => pending.push(id),
        }
    }

    let mut next = used.iter().max().and_then(|m| m.checked_add(1)).unwrap_or(0);
    for id in pending {
        while used.contains(&next) {
            next = next.checked_add(1).unwrap_or(0);
        }
        used.insert(next);
        out.insert(id, next);
    }
    out
}

/// Opaque aspects merged by tag, first occurrence order.
fn merged_opaque_aspects(opaque: &[(String, Vec<Value>)]) -> IndexMap<String, Vec<Value>> {
    let mut merged: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (tag, elements) in opaque {
        merged.entry(tag.clone()).or_default().extend(elements.iter().cloned());
    }
    merged
}

fn bypass_aspect(
    style: &VisualStyle,
    group: VisualPropertyGroup,
    cx_ids: &FxHashMap<&str, i64>,
) -> Vec<Value> {
    let mut by_element: IndexMap<i64, Map<String, Value>> = IndexMap::new();
    for vp in style.in_group(group) {
        for (element, value) in &vp.bypass_map {
            let Some(&cx) = cx_ids.get(element.as_str()) else {
                tracing::debug!(element = %element, property = %vp.name, "dropping bypass on missing element");
                continue;
            };
            by_element
                .entry(cx)
                .or_default()
                .insert(vp.name.cx_name().to_string(), vp_value_to_cx(value));
        }
    }
    by_element
        .into_iter()
        .map(|(id, v)| json!({"id": id, "v": v}))
        .collect()
}

/// Serializes a bundle into a CX2 document.
///
/// Never fails: missing optional parts become empty aspects or are left out, and `metaData`
/// reflects exactly the aspects emitted.
pub fn export_to_cx2(bundle: &NetworkBundle) -> Value {
    let network = &bundle.network;
    let node_ids = cx_ids(network.nodes().iter().map(|n| n.id.as_str()), translate_node_id_to_cx);
    let edge_ids = cx_ids(network.edges().iter().map(|e| e.id.as_str()), translate_edge_id_to_cx);

    let mut aspects: Vec<(String, Vec<Value>)> = Vec::new();

    let declarations = AttributeDeclarations {
        network_attributes: bundle.network_attributes.declarations(),
        nodes: bundle.node_table.declarations(),
        edges: bundle.edge_table.declarations(),
    };
    if declarations != AttributeDeclarations::default() {
        aspects.push((ATTRIBUTE_DECLARATIONS.into(), vec![to_json(&declarations)]));
    }
    if !bundle.network_attributes.values.is_empty() {
        aspects.push((
            NETWORK_ATTRIBUTES.into(),
            vec![Value::Object(bundle.network_attributes.to_cx())],
        ));
    }

    let nodes = network
        .nodes()
        .iter()
        .map(|node| {
            let mut obj = Map::new();
            obj.insert("id".into(), json!(node_ids[node.id.as_str()]));
            if let Some(v) = bundle.node_table.row_to_cx(&node.id) {
                obj.insert("v".into(), Value::Object(v));
            }
            let view = bundle.view.node_views.get(&node.id);
            obj.insert("x".into(), json!(view.map_or(0.0, |v| v.x)));
            obj.insert("y".into(), json!(view.map_or(0.0, |v| v.y)));
            if let Some(z) = view.and_then(|v| v.z) {
                obj.insert("z".into(), json!(z));
            }
            Value::Object(obj)
        })
        .collect();
    aspects.push((NODES.into(), nodes));

    let edges = network
        .edges()
        .iter()
        .map(|edge| {
            let mut obj = Map::new();
            obj.insert("id".into(), json!(edge_ids[edge.id.as_str()]));
            obj.insert("s".into(), json!(node_ids[edge.s.as_str()]));
            obj.insert("t".into(), json!(node_ids[edge.t.as_str()]));
            if let Some(v) = bundle.edge_table.row_to_cx(&edge.id) {
                obj.insert("v".into(), Value::Object(v));
            }
            Value::Object(obj)
        })
        .collect();
    aspects.push((EDGES.into(), edges));

    aspects.push((
        VISUAL_PROPERTIES.into(),
        vec![to_json(&visual_style_to_cx(&bundle.visual_style))],
    ));
    for (tag, group, ids) in [
        (NODE_BYPASSES, VisualPropertyGroup::Node, &node_ids),
        (EDGE_BYPASSES, VisualPropertyGroup::Edge, &edge_ids),
    ] {
        let bypasses = bypass_aspect(&bundle.visual_style, group, ids);
        if !bypasses.is_empty() {
            aspects.push((tag.into(), bypasses));
        }
    }
    aspects.push((
        VISUAL_EDITOR_PROPERTIES.into(),
        vec![to_json(&bundle.visual_editor_properties.to_cx())],
    ));
    aspects.extend(merged_opaque_aspects(&bundle.opaque_aspects));

    let metadata: Vec<Value> = aspects
        .iter()
        .map(|(tag, elements)| json!({"name": tag, "elementCount": elements.len()}))
        .collect();

    let mut doc = Vec::with_capacity(aspects.len() + 3);
    doc.push(json!({"CXVersion": CX_VERSION, "hasFragments": false}));
    doc.push(json!({ METADATA: metadata }));
    for (tag, elements) in aspects {
        let mut obj = Map::new();
        obj.insert(tag, Value::Array(elements));
        doc.push(Value::Object(obj));
    }
    doc.push(json!({ STATUS: [{"success": true}] }));
    Value::Array(doc)
}
