//! In-memory registry of networks and everything derived from them.

use crate::mapping::MappingFunction;
use crate::network::Network;
use crate::table::{NetworkAttributes, Table};
use crate::value::VisualPropertyValue;
use crate::view::{NetworkView, VisualEditorProperties, build_view, refresh_property, rebuild_values};
use crate::visual_style::{VisualPropertyGroup, VisualPropertyName, VisualStyle};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Every model of one network. All parts share `network.id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkBundle {
    pub network: Network,
    pub node_table: Table,
    pub edge_table: Table,
    pub network_attributes: NetworkAttributes,
    pub visual_style: VisualStyle,
    pub view: NetworkView,
    pub visual_editor_properties: VisualEditorProperties,
    /// Aspects without a typed model, re-emitted verbatim on export.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opaque_aspects: Vec<(String, Vec<Value>)>,
}

impl NetworkBundle {
    /// An empty network with the default style.
    pub fn new(network_id: impl Into<String>) -> Self {
        let id = network_id.into();
        let view = NetworkView {
            id: id.clone(),
            values: VisualStyle::default()
                .in_group(VisualPropertyGroup::Network)
                .map(|vp| (vp.name, vp.default_value.clone()))
                .collect(),
            ..Default::default()
        };
        Self {
            network: Network::new(id.clone()),
            node_table: Table::new(id.clone()),
            edge_table: Table::new(id),
            network_attributes: NetworkAttributes::default(),
            visual_style: VisualStyle::default(),
            view,
            visual_editor_properties: VisualEditorProperties::default(),
            opaque_aspects: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.network.id
    }

    /// Re-resolves the whole view, keeping positions and selection.
    pub fn rebuild_view(&mut self) -> Result<()> {
        rebuild_values(
            &mut self.view,
            &self.network,
            &self.node_table,
            &self.edge_table,
            &self.visual_style,
            &self.visual_editor_properties,
        )
    }

    fn refresh(&mut self, name: VisualPropertyName) -> Result<()> {
        refresh_property(
            &mut self.view,
            &self.node_table,
            &self.edge_table,
            &self.visual_style,
            &self.visual_editor_properties,
            name,
        )
    }

    fn check_elements(&self, group: VisualPropertyGroup, ids: &[&str]) -> Result<()> {
        let (label, exists): (&'static str, fn(&Network, &str) -> bool) = match group {
            VisualPropertyGroup::Node => ("node", Network::has_node),
            VisualPropertyGroup::Edge => ("edge", Network::has_edge),
            VisualPropertyGroup::Network => ("network", |_, _| false),
        };
        match ids.iter().find(|id| !exists(&self.network, id)) {
            Some(missing) => Err(Error::UnknownElement {
                group: label,
                element_id: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn set_default(&mut self, name: VisualPropertyName, value: VisualPropertyValue) -> Result<()> {
        self.visual_style.set_default(name, value)?;
        self.refresh(name)
    }

    /// Bypasses only target existing elements of the property's group.
    pub fn set_bypass(
        &mut self,
        name: VisualPropertyName,
        element_ids: &[&str],
        value: VisualPropertyValue,
    ) -> Result<()> {
        self.check_elements(name.group(), element_ids)?;
        self.visual_style
            .set_bypass(name, element_ids.iter().copied(), value)?;
        self.refresh(name)
    }

    pub fn delete_bypass(&mut self, name: VisualPropertyName, element_ids: &[&str]) -> Result<()> {
        self.visual_style.delete_bypass(name, element_ids.iter().copied());
        self.refresh(name)
    }

    pub fn set_mapping(&mut self, name: VisualPropertyName, mapping: MappingFunction) -> Result<()> {
        self.visual_style.set_mapping(name, mapping);
        self.refresh(name)
    }

    pub fn remove_mapping(&mut self, name: VisualPropertyName) -> Result<Option<MappingFunction>> {
        let removed = self.visual_style.remove_mapping(name);
        self.refresh(name)?;
        Ok(removed)
    }

    /// Deletes nodes with their incident edges, rows, views, bypasses and selection entries.
    pub fn delete_nodes(&mut self, node_ids: &[String]) -> Result<()> {
        let (nodes, edges) = self.network.delete_nodes(node_ids);
        self.forget(VisualPropertyGroup::Node, &nodes);
        self.forget(VisualPropertyGroup::Edge, &edges);
        self.rebuild_view()
    }

    pub fn delete_edges(&mut self, edge_ids: &[String]) -> Result<()> {
        let edges = self.network.delete_edges(edge_ids);
        self.forget(VisualPropertyGroup::Edge, &edges);
        self.rebuild_view()
    }

    fn forget(&mut self, group: VisualPropertyGroup, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let table = match group {
            VisualPropertyGroup::Node => &mut self.node_table,
            _ => &mut self.edge_table,
        };
        table.delete_rows(ids);
        self.visual_style.forget_elements(group, ids);
    }
}

/// Networks by id, in insertion order.
#[derive(Debug, Default)]
pub struct NetworkStore {
    networks: IndexMap<String, NetworkBundle>,
}

impl NetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a bundle, replacing any bundle with the same id. Returns the id.
    pub fn insert(&mut self, bundle: NetworkBundle) -> String {
        let id = bundle.id().to_string();
        if self.networks.insert(id.clone(), bundle).is_some() {
            tracing::debug!(network = %id, "replaced stored network");
        }
        id
    }

    /// Creates and stores an empty network with a fresh view.
    pub fn create_empty(&mut self, network_id: impl Into<String>) -> Result<String> {
        let mut bundle = NetworkBundle::new(network_id);
        bundle.view = build_view(
            &bundle.network,
            &bundle.node_table,
            &bundle.edge_table,
            &bundle.visual_style,
        )?;
        Ok(self.insert(bundle))
    }

    pub fn get(&self, network_id: &str) -> Result<&NetworkBundle> {
        self.networks
            .get(network_id)
            .ok_or_else(|| Error::UnknownNetwork {
                network_id: network_id.to_string(),
            })
    }

    pub fn get_mut(&mut self, network_id: &str) -> Result<&mut NetworkBundle> {
        self.networks
            .get_mut(network_id)
            .ok_or_else(|| Error::UnknownNetwork {
                network_id: network_id.to_string(),
            })
    }

    /// Removes a network and all of its tables, style and view together.
    pub fn remove(&mut self, network_id: &str) -> Result<NetworkBundle> {
        self.networks
            .shift_remove(network_id)
            .ok_or_else(|| Error::UnknownNetwork {
                network_id: network_id.to_string(),
            })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn set_default(
        &mut self,
        network_id: &str,
        name: VisualPropertyName,
        value: VisualPropertyValue,
    ) -> Result<()> {
        self.get_mut(network_id)?.set_default(name, value)
    }

    pub fn set_bypass(
        &mut self,
        network_id: &str,
        name: VisualPropertyName,
        element_ids: &[&str],
        value: VisualPropertyValue,
    ) -> Result<()> {
        self.get_mut(network_id)?.set_bypass(name, element_ids, value)
    }

    pub fn delete_bypass(
        &mut self,
        network_id: &str,
        name: VisualPropertyName,
        element_ids: &[&str],
    ) -> Result<()> {
        self.get_mut(network_id)?.delete_bypass(name, element_ids)
    }

    pub fn set_mapping(
        &mut self,
        network_id: &str,
        name: VisualPropertyName,
        mapping: MappingFunction,
    ) -> Result<()> {
        self.get_mut(network_id)?.set_mapping(name, mapping)
    }

    pub fn remove_mapping(
        &mut self,
        network_id: &str,
        name: VisualPropertyName,
    ) -> Result<Option<MappingFunction>> {
        self.get_mut(network_id)?.remove_mapping(name)
    }

    pub fn delete_nodes(&mut self, network_id: &str, node_ids: &[String]) -> Result<()> {
        self.get_mut(network_id)?.delete_nodes(node_ids)
    }

    pub fn delete_edges(&mut self, network_id: &str, edge_ids: &[String]) -> Result<()> {
        self.get_mut(network_id)?.delete_edges(edge_ids)
    }
}
