//! Render-ready view model: resolved visual property values per element.

use crate::Result;
use crate::cx2::Cx2VisualEditorProperties;
use crate::mapping::MappingError;
use crate::network::Network;
use crate::table::{Row, Table};
use crate::value::{MapKey, VisualPropertyValue};
use crate::visual_style::{VisualProperty, VisualPropertyGroup, VisualPropertyName, VisualStyle};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{Map, Value};

pub type ResolvedValues = IndexMap<VisualPropertyName, VisualPropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    pub values: ResolvedValues,
}

impl NodeView {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            z: None,
            values: ResolvedValues::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: String,
    pub values: ResolvedValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkView {
    pub id: String,
    pub node_views: IndexMap<String, NodeView>,
    pub edge_views: IndexMap<String, EdgeView>,
    pub selected_nodes: Vec<String>,
    pub selected_edges: Vec<String>,
    pub values: ResolvedValues,
}

impl NetworkView {
    pub fn set_node_position(&mut self, node_id: &str, x: f64, y: f64, z: Option<f64>) -> bool {
        match self.node_views.get_mut(node_id) {
            Some(view) => {
                view.x = x;
                view.y = y;
                view.z = z;
                true
            }
            None => false,
        }
    }

    /// Replaces the selection, ignoring ids that have no view.
    pub fn select(&mut self, nodes: &[String], edges: &[String]) {
        self.selected_nodes = nodes
            .iter()
            .filter(|id| self.node_views.contains_key(*id))
            .cloned()
            .collect();
        self.selected_edges = edges
            .iter()
            .filter(|id| self.edge_views.contains_key(*id))
            .cloned()
            .collect();
    }

    pub fn node_value(&self, node_id: &str, name: VisualPropertyName) -> Option<&VisualPropertyValue> {
        self.node_views.get(node_id)?.values.get(&name)
    }

    pub fn edge_value(&self, edge_id: &str, name: VisualPropertyName) -> Option<&VisualPropertyValue> {
        self.edge_views.get(edge_id)?.values.get(&name)
    }
}

const NODE_SIZE_LOCKED: &str = "nodeSizeLocked";
const ARROW_COLOR_MATCHES_EDGE: &str = "arrowColorMatchesEdge";

/// Editor-level switches carried in the CX2 `visualEditorProperties` aspect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEditorProperties {
    /// Resolved node height always equals resolved node width.
    pub node_size_locked: bool,
    /// Both arrow colors always equal the resolved edge line color.
    pub arrow_color_matches_edge: bool,
    /// Keys this crate does not interpret, kept for export.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl VisualEditorProperties {
    pub fn from_cx(cx: &Cx2VisualEditorProperties) -> Self {
        let mut other = cx.properties.clone();
        let mut flag = |key: &str| other.remove(key).and_then(|v| v.as_bool()).unwrap_or(false);
        let node_size_locked = flag(NODE_SIZE_LOCKED);
        let arrow_color_matches_edge = flag(ARROW_COLOR_MATCHES_EDGE);
        Self {
            node_size_locked,
            arrow_color_matches_edge,
            other,
        }
    }

    pub fn to_cx(&self) -> Cx2VisualEditorProperties {
        let mut properties = Map::new();
        properties.insert(NODE_SIZE_LOCKED.into(), Value::Bool(self.node_size_locked));
        properties.insert(
            ARROW_COLOR_MATCHES_EDGE.into(),
            Value::Bool(self.arrow_color_matches_edge),
        );
        properties.extend(self.other.iter().map(|(k, v)| (k.clone(), v.clone())));
        Cx2VisualEditorProperties { properties }
    }

    fn apply_to_node(&self, values: &mut ResolvedValues) {
        if !self.node_size_locked {
            return;
        }
        if let Some(width) = values.get(&VisualPropertyName::NodeWidth).cloned() {
            values.insert(VisualPropertyName::NodeHeight, width);
        }
    }

    fn apply_to_edge(&self, values: &mut ResolvedValues) {
        if !self.arrow_color_matches_edge {
            return;
        }
        if let Some(color) = values.get(&VisualPropertyName::EdgeLineColor).cloned() {
            values.insert(VisualPropertyName::EdgeSourceArrowColor, color.clone());
            values.insert(VisualPropertyName::EdgeTargetArrowColor, color);
        }
    }
}

/// Per-call memo of mapped values keyed by property and attribute value.
#[derive(Default)]
struct Resolver {
    memo: FxHashMap<(VisualPropertyName, MapKey), VisualPropertyValue>,
}

impl Resolver {
    /// Same precedence as [`crate::mapping::resolve_value`], with mapped results cached.
    fn resolve(
        &mut self,
        vp: &VisualProperty,
        element_id: &str,
        row: Option<&Row>,
    ) -> std::result::Result<VisualPropertyValue, MappingError> {
        if let Some(bypass) = vp.bypass_map.get(element_id) {
            return Ok(bypass.clone());
        }
        let Some(mapping) = &vp.mapping else {
            return Ok(vp.default_value.clone());
        };
        let Some(value) = row.and_then(|r| r.get(mapping.attribute())) else {
            return Ok(vp.default_value.clone());
        };
        let Some(key) = value.map_key() else {
            return mapping.apply(value, &vp.default_value);
        };
        if let Some(hit) = self.memo.get(&(vp.name, key.clone())) {
            return Ok(hit.clone());
        }
        let resolved = mapping.apply(value, &vp.default_value)?;
        self.memo.insert((vp.name, key), resolved.clone());
        Ok(resolved)
    }

    fn resolve_all<'a>(
        &mut self,
        properties: impl Iterator<Item = &'a VisualProperty>,
        element_id: &str,
        row: Option<&Row>,
        out: &mut ResolvedValues,
    ) -> std::result::Result<(), MappingError> {
        for vp in properties {
            out.insert(vp.name, self.resolve(vp, element_id, row)?);
        }
        Ok(())
    }
}

/// Builds a fresh view with every node at `(0, 0)` and no editor switches.
pub fn build_view(
    network: &Network,
    node_table: &Table,
    edge_table: &Table,
    style: &VisualStyle,
) -> Result<NetworkView> {
    build_view_with(
        network,
        node_table,
        edge_table,
        style,
        &VisualEditorProperties::default(),
    )
}

pub fn build_view_with(
    network: &Network,
    node_table: &Table,
    edge_table: &Table,
    style: &VisualStyle,
    editor: &VisualEditorProperties,
) -> Result<NetworkView> {
    let mut view = NetworkView {
        id: network.id.clone(),
        ..Default::default()
    };
    rebuild_values(&mut view, network, node_table, edge_table, style, editor)?;
    Ok(view)
}

/// Re-resolves every value into an existing view.
///
/// Views are added for new elements and dropped for deleted ones; positions and selection of
/// surviving elements are kept. Values are overwritten in full, so repeated calls with the same
/// inputs yield identical views.
pub fn rebuild_values(
    view: &mut NetworkView,
    network: &Network,
    node_table: &Table,
    edge_table: &Table,
    style: &VisualStyle,
    editor: &VisualEditorProperties,
) -> Result<()> {
    let mut resolver = Resolver::default();

    let mut node_views = IndexMap::with_capacity(network.node_count());
    for node in network.nodes() {
        let mut nv = view
            .node_views
            .shift_remove(&node.id)
            .unwrap_or_else(|| NodeView::new(&node.id));
        nv.values.clear();
        resolver.resolve_all(
            style.in_group(VisualPropertyGroup::Node),
            &node.id,
            node_table.row(&node.id),
            &mut nv.values,
        )?;
        editor.apply_to_node(&mut nv.values);
        node_views.insert(node.id.clone(), nv);
    }

    let mut edge_views = IndexMap::with_capacity(network.edge_count());
    for edge in network.edges() {
        let mut values = ResolvedValues::new();
        resolver.resolve_all(
            style.in_group(VisualPropertyGroup::Edge),
            &edge.id,
            edge_table.row(&edge.id),
            &mut values,
        )?;
        editor.apply_to_edge(&mut values);
        edge_views.insert(
            edge.id.clone(),
            EdgeView {
                id: edge.id.clone(),
                values,
            },
        );
    }

    view.id = network.id.clone();
    view.node_views = node_views;
    view.edge_views = edge_views;
    view.values = network_values(style);
    let (nodes, edges) = (view.selected_nodes.clone(), view.selected_edges.clone());
    view.select(&nodes, &edges);
    tracing::trace!(
        network = %network.id,
        nodes = view.node_views.len(),
        edges = view.edge_views.len(),
        "resolved view values"
    );
    Ok(())
}

// Network scope never has bypasses or mappings.
fn network_values(style: &VisualStyle) -> ResolvedValues {
    style
        .in_group(VisualPropertyGroup::Network)
        .map(|vp| (vp.name, vp.default_value.clone()))
        .collect()
}

/// Re-resolves one property across its group after a style edit.
pub fn refresh_property(
    view: &mut NetworkView,
    node_table: &Table,
    edge_table: &Table,
    style: &VisualStyle,
    editor: &VisualEditorProperties,
    name: VisualPropertyName,
) -> Result<()> {
    let vp = style.get(name);
    let mut resolver = Resolver::default();
    match vp.group {
        VisualPropertyGroup::Node => {
            for (id, nv) in view.node_views.iter_mut() {
                let value = resolver.resolve(vp, id, node_table.row(id))?;
                nv.values.insert(name, value);
                if matches!(name, VisualPropertyName::NodeWidth | VisualPropertyName::NodeHeight) {
                    editor.apply_to_node(&mut nv.values);
                }
            }
        }
        VisualPropertyGroup::Edge => {
            let arrow_colors = [
                VisualPropertyName::EdgeLineColor,
                VisualPropertyName::EdgeSourceArrowColor,
                VisualPropertyName::EdgeTargetArrowColor,
            ];
            for (id, ev) in view.edge_views.iter_mut() {
                let value = resolver.resolve(vp, id, edge_table.row(id))?;
                ev.values.insert(name, value);
                if arrow_colors.contains(&name) {
                    editor.apply_to_edge(&mut ev.values);
                }
            }
        }
        VisualPropertyGroup::Network => {
            view.values.insert(name, vp.default_value.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ContinuousMapping, ControlPoint, MappingFunction, PassthroughMapping};
    use crate::value::AttributeValue;

    fn fixture() -> (Network, Table, Table) {
        let mut network = Network::new("net");
        network.add_node("1");
        network.add_node("2");
        network.add_edge("e10", "1", "2").unwrap();
        let mut nodes = Table::new("net");
        nodes.set_value("1", "name", AttributeValue::String("A".into()));
        nodes.set_value("1", "score", AttributeValue::Double(0.0));
        nodes.set_value("2", "score", AttributeValue::Double(10.0));
        (network, nodes, Table::new("net"))
    }

    #[test]
    fn resolves_every_element_and_property() {
        let (network, nodes, edges) = fixture();
        let mut style = VisualStyle::default();
        style.set_mapping(
            VisualPropertyName::NodeLabel,
            MappingFunction::Passthrough(PassthroughMapping {
                attribute: "name".into(),
                attribute_type: None,
            }),
        );
        let view = build_view(&network, &nodes, &edges, &style).unwrap();

        assert_eq!(view.node_views.len(), 2);
        assert_eq!(
            view.node_views["1"].values.len(),
            VisualPropertyName::in_group(VisualPropertyGroup::Node).count()
        );
        assert_eq!(
            view.node_value("1", VisualPropertyName::NodeLabel),
            Some(&VisualPropertyValue::string("A"))
        );
        assert_eq!(
            view.node_value("2", VisualPropertyName::NodeLabel),
            Some(&VisualPropertyValue::string(""))
        );
        assert_eq!(view.values.len(), 1);
        assert_eq!(view.node_views["1"].x, 0.0);
    }

    #[test]
    fn rebuild_is_idempotent_and_keeps_positions() {
        let (network, nodes, edges) = fixture();
        let style = VisualStyle::default();
        let editor = VisualEditorProperties::default();
        let mut view = build_view(&network, &nodes, &edges, &style).unwrap();
        view.set_node_position("1", 5.0, 6.0, None);
        view.select(&["1".to_string(), "9".to_string()], &[]);

        let before = view.clone();
        rebuild_values(&mut view, &network, &nodes, &edges, &style, &editor).unwrap();
        assert_eq!(view, before);
        assert_eq!(view.selected_nodes, vec!["1".to_string()]);
    }

    #[test]
    fn editor_switches_post_process_values() {
        let (network, nodes, edges) = fixture();
        let mut style = VisualStyle::default();
        style
            .set_default(VisualPropertyName::NodeWidth, VisualPropertyValue::Number(40.0))
            .unwrap();
        style
            .set_default(VisualPropertyName::EdgeLineColor, VisualPropertyValue::string("#112233"))
            .unwrap();
        let editor = VisualEditorProperties {
            node_size_locked: true,
            arrow_color_matches_edge: true,
            ..Default::default()
        };
        let mut view = build_view_with(&network, &nodes, &edges, &style, &editor).unwrap();
        assert_eq!(
            view.node_value("1", VisualPropertyName::NodeHeight),
            Some(&VisualPropertyValue::Number(40.0))
        );
        assert_eq!(
            view.edge_value("e10", VisualPropertyName::EdgeTargetArrowColor),
            Some(&VisualPropertyValue::string("#112233"))
        );

        style
            .set_bypass(VisualPropertyName::NodeWidth, ["2"], VisualPropertyValue::Number(90.0))
            .unwrap();
        refresh_property(&mut view, &nodes, &edges, &style, &editor, VisualPropertyName::NodeWidth).unwrap();
        assert_eq!(
            view.node_value("2", VisualPropertyName::NodeHeight),
            Some(&VisualPropertyValue::Number(90.0))
        );
    }

    #[test]
    fn memoized_continuous_values_match_direct_resolution() {
        let (network, nodes, edges) = fixture();
        let mut style = VisualStyle::default();
        let mapping = ContinuousMapping::from_points(
            "score",
            vec![
                ControlPoint::new(0.0, VisualPropertyValue::Number(10.0)),
                ControlPoint::new(10.0, VisualPropertyValue::Number(20.0)),
            ],
        )
        .unwrap();
        style.set_mapping(VisualPropertyName::NodeWidth, MappingFunction::Continuous(mapping));
        let view = build_view(&network, &nodes, &edges, &style).unwrap();
        for node in ["1", "2"] {
            let direct = crate::mapping::resolve_value(
                style.get(VisualPropertyName::NodeWidth),
                node,
                nodes.row(node),
            )
            .unwrap();
            assert_eq!(view.node_value(node, VisualPropertyName::NodeWidth), Some(&direct));
        }
    }

    #[test]
    fn editor_properties_keep_unknown_keys() {
        let cx = Cx2VisualEditorProperties {
            properties: serde_json::json!({"nodeSizeLocked": true, "nodeCustomGraphicsSizeSync": true})
                .as_object()
                .cloned()
                .unwrap(),
        };
        let editor = VisualEditorProperties::from_cx(&cx);
        assert!(editor.node_size_locked);
        assert!(!editor.arrow_color_matches_edge);
        assert_eq!(editor.to_cx().properties["nodeCustomGraphicsSizeSync"], Value::Bool(true));
    }
}
