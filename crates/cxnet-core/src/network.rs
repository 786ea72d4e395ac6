//! Network topology: nodes and edges with unique ids, nothing else.
//!
//! Attribute values live in [`crate::table`]; appearance lives in [`crate::visual_style`].

use crate::cx2::{Cx2Edge, Cx2Node, translate_cx_edge_id, translate_cx_node_id};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::Serialize;

pub type IdType = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: IdType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: IdType,
    pub s: IdType,
    pub t: IdType,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Network {
    pub id: IdType,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    node_index: FxHashMap<IdType, usize>,
    #[serde(skip)]
    edge_index: FxHashMap<IdType, usize>,
}

impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Network {
    pub fn new(id: impl Into<IdType>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builds topology from CX2 elements.
    ///
    /// Duplicate ids keep the first occurrence. An edge whose endpoint is missing is an error:
    /// dangling edges are never silently dropped.
    pub fn from_cx2(id: impl Into<IdType>, nodes: &[Cx2Node], edges: &[Cx2Edge]) -> Result<Self> {
        let mut network = Self::new(id);
        for node in nodes {
            if !network.add_node(translate_cx_node_id(node.id)) {
                tracing::warn!(node = node.id, "duplicate node id; keeping first occurrence");
            }
        }
        for edge in edges {
            let added = network.add_edge(
                translate_cx_edge_id(edge.id),
                translate_cx_node_id(edge.s),
                translate_cx_node_id(edge.t),
            )?;
            if !added {
                tracing::warn!(edge = edge.id, "duplicate edge id; keeping first occurrence");
            }
        }
        Ok(network)
    }

    /// Returns `false` if a node with this id already exists.
    pub fn add_node(&mut self, id: impl Into<IdType>) -> bool {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return false;
        }
        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node { id });
        true
    }

    /// Returns `Ok(false)` if an edge with this id already exists.
    pub fn add_edge(
        &mut self,
        id: impl Into<IdType>,
        s: impl Into<IdType>,
        t: impl Into<IdType>,
    ) -> Result<bool> {
        let (id, s, t) = (id.into(), s.into(), t.into());
        for endpoint in [&s, &t] {
            if !self.has_node(endpoint) {
                return Err(Error::DanglingEdge {
                    edge: id,
                    node: endpoint.clone(),
                });
            }
        }
        if self.edge_index.contains_key(&id) {
            return Ok(false);
        }
        self.edge_index.insert(id.clone(), self.edges.len());
        self.edges.push(Edge { id, s, t });
        Ok(true)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges with `node` as source or target.
    pub fn incident_edges<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.s == node || e.t == node)
    }

    pub fn neighbors<'a>(&'a self, node: &'a str) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = Vec::new();
        for e in self.incident_edges(node) {
            let other = if e.s == node { e.t.as_str() } else { e.s.as_str() };
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// Removes nodes and every incident edge. Returns `(removed nodes, removed edges)`.
    pub fn delete_nodes(&mut self, ids: &[IdType]) -> (Vec<IdType>, Vec<IdType>) {
        let removed_nodes: Vec<IdType> = ids.iter().filter(|id| self.has_node(id)).cloned().collect();
        if removed_nodes.is_empty() {
            return (Vec::new(), Vec::new());
        }
        let incident: Vec<IdType> = self
            .edges
            .iter()
            .filter(|e| removed_nodes.contains(&e.s) || removed_nodes.contains(&e.t))
            .map(|e| e.id.clone())
            .collect();

        self.nodes.retain(|n| !removed_nodes.contains(&n.id));
        self.reindex_nodes();
        let removed_edges = self.delete_edges(&incident);
        (removed_nodes, removed_edges)
    }

    /// Removes edges; returns the ids that existed.
    pub fn delete_edges(&mut self, ids: &[IdType]) -> Vec<IdType> {
        let removed: Vec<IdType> = ids.iter().filter(|id| self.has_edge(id)).cloned().collect();
        if !removed.is_empty() {
            self.edges.retain(|e| !removed.contains(&e.id));
            self.reindex_edges();
        }
        removed
    }

    fn reindex_nodes(&mut self) {
        self.node_index.clear();
        for (i, n) in self.nodes.iter().enumerate() {
            self.node_index.insert(n.id.clone(), i);
        }
    }

    fn reindex_edges(&mut self) {
        self.edge_index.clear();
        for (i, e) in self.edges.iter().enumerate() {
            self.edge_index.insert(e.id.clone(), i);
        }
    }
}
