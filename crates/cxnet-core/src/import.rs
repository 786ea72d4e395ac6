//! CX2 document → typed models.

use crate::cx2::{Cx2Bypass, Cx2Document, translate_cx_edge_id, translate_cx_node_id};
use crate::network::Network;
use crate::store::NetworkBundle;
use crate::table::{NetworkAttributes, Table};
use crate::validate::{IssueKind, ValidateOptions, ValidationReport, validate};
use crate::view::{VisualEditorProperties, build_view_with};
use crate::visual_style::cx2::{visual_style_from_cx, vp_value_from_cx};
use crate::visual_style::{VisualPropertyGroup, VisualPropertyName, VisualStyle};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Import result: the models plus the validation report (warnings and non-blocking errors).
#[derive(Debug, Clone, Serialize)]
pub struct ImportedNetwork {
    pub report: ValidationReport,
    #[serde(flatten)]
    pub bundle: NetworkBundle,
}

/// Error kinds that make a document impossible to import faithfully.
const BLOCKING: &[IssueKind] = &[IssueKind::Structure, IssueKind::Element, IssueKind::Reference];

/// Imports a CX2 document under a freshly generated network id.
pub fn import_cx2(doc: &Value, options: &ValidateOptions) -> Result<ImportedNetwork> {
    import_cx2_with_id(doc, options, uuid::Uuid::new_v4().to_string())
}

/// Validates `doc` and builds every model from it.
///
/// Structural, element-id and referential errors refuse the import with
/// [`Error::InvalidDocument`]. Attribute type errors do not: the affected cells are marked
/// suspect in the tables.
pub fn import_cx2_with_id(
    doc: &Value,
    options: &ValidateOptions,
    network_id: impl Into<String>,
) -> Result<ImportedNetwork> {
    let network_id = network_id.into();
    let report = validate(doc, options);
    if BLOCKING.iter().any(|&kind| report.has_errors_of(kind)) {
        return Err(Error::InvalidDocument {
            report: Box::new(report),
        });
    }

    let parsed = Cx2Document::parse(doc)?;
    let cx_nodes = parsed.nodes();
    let cx_edges = parsed.edges();
    let network = Network::from_cx2(network_id.clone(), &cx_nodes, &cx_edges)?;

    let decls = parsed.attribute_declarations();
    let mut node_table = Table::from_declarations(network_id.clone(), &decls.nodes);
    for node in &cx_nodes {
        let id = translate_cx_node_id(node.id);
        if !node_table.rows.contains_key(&id) {
            node_table.insert_cx_row(&id, node.v.as_ref());
        }
    }
    let mut edge_table = Table::from_declarations(network_id.clone(), &decls.edges);
    for edge in &cx_edges {
        let id = translate_cx_edge_id(edge.id);
        if !edge_table.rows.contains_key(&id) {
            edge_table.insert_cx_row(&id, edge.v.as_ref());
        }
    }
    let network_attributes =
        NetworkAttributes::from_cx2(&decls.network_attributes, &parsed.network_attributes());

    let mut visual_style = visual_style_from_cx(&parsed.visual_properties())?;
    apply_bypasses(
        &mut visual_style,
        &parsed.node_bypasses(),
        VisualPropertyGroup::Node,
        translate_cx_node_id,
    );
    apply_bypasses(
        &mut visual_style,
        &parsed.edge_bypasses(),
        VisualPropertyGroup::Edge,
        translate_cx_edge_id,
    );

    let visual_editor_properties =
        VisualEditorProperties::from_cx(&parsed.visual_editor_properties());
    let mut view = build_view_with(
        &network,
        &node_table,
        &edge_table,
        &visual_style,
        &visual_editor_properties,
    )?;
    // First occurrence wins, matching the topology.
    for node in cx_nodes.iter().rev() {
        view.set_node_position(
            &translate_cx_node_id(node.id),
            node.x.unwrap_or(0.0),
            node.y.unwrap_or(0.0),
            node.z,
        );
    }

    tracing::debug!(
        network = %network_id,
        nodes = network.node_count(),
        edges = network.edge_count(),
        warnings = report.warnings.len(),
        "imported CX2 network"
    );

    Ok(ImportedNetwork {
        report,
        bundle: NetworkBundle {
            network,
            node_table,
            edge_table,
            network_attributes,
            visual_style,
            view,
            visual_editor_properties,
            opaque_aspects: parsed.opaque_aspects(),
        },
    })
}

fn apply_bypasses(
    style: &mut VisualStyle,
    bypasses: &[Cx2Bypass],
    group: VisualPropertyGroup,
    element_id: fn(i64) -> String,
) {
    for bypass in bypasses {
        let id = element_id(bypass.id);
        for (cx_name, raw) in &bypass.v {
            let Some(name) = VisualPropertyName::from_cx_name(cx_name).filter(|n| n.group() == group)
            else {
                tracing::debug!(element = %id, property = %cx_name, "ignoring bypass on unknown property");
                continue;
            };
            match vp_value_from_cx(name.value_type(), raw) {
                Some(value) => {
                    style.get_mut(name).bypass_map.insert(id.clone(), value);
                }
                None => tracing::warn!(element = %id, property = %cx_name, %raw, "ignoring invalid bypass value"),
            }
        }
    }
}
