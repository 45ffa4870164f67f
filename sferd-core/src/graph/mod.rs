//! Schema graph: objects as nodes, relationship fields as edges
//!
//! Built once from loaded [`ObjectNode`]s. Every edge in [`SchemaGraph::edges`]
//! references two nodes of the graph; references to objects that were not
//! loaded are kept apart in [`SchemaGraph::dangling`] so they can be reported.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use serde::Serialize;
use tracing::debug;

use crate::models::{ObjectNode, RelationshipEdge, RelationshipKind};

pub mod metrics;
pub mod selection;

pub use metrics::GraphStatistics;
pub use selection::{rank_objects, SelectionOptions};

/// petgraph view of a schema graph, node weights are object names
pub type RelationshipGraph = Graph<String, RelationshipKind, Directed>;

/// Objects keyed by API name plus the relationships between them
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaGraph {
    nodes: BTreeMap<String, ObjectNode>,
    edges: Vec<RelationshipEdge>,
    dangling: Vec<RelationshipEdge>,
}

impl SchemaGraph {
    /// Build the graph, deriving one edge per relationship field.
    pub fn build(objects: impl IntoIterator<Item = ObjectNode>) -> Self {
        let nodes: BTreeMap<String, ObjectNode> =
            objects.into_iter().map(|o| (o.name.clone(), o)).collect();

        let mut edges = Vec::new();
        let mut dangling = Vec::new();

        for object in nodes.values() {
            for field in object.fields.iter() {
                let (Some(kind), Some(target)) = (field.relationship_kind(), &field.reference_to)
                else {
                    continue;
                };

                let edge = RelationshipEdge::new(&object.name, target, kind, &field.name);
                if nodes.contains_key(target) {
                    edges.push(edge);
                } else {
                    debug!(
                        "Dangling reference {}.{} -> {} (object not loaded)",
                        object.name, field.name, target
                    );
                    dangling.push(edge);
                }
            }
        }

        debug!(
            "Found {} relationships ({} dangling)",
            edges.len(),
            dangling.len()
        );

        Self {
            nodes,
            edges,
            dangling,
        }
    }

    /// Objects in API name order
    pub fn nodes(&self) -> impl Iterator<Item = &ObjectNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ObjectNode> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Relationships whose endpoints are both in the graph
    #[must_use]
    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Relationships pointing at objects that were not loaded
    #[must_use]
    pub fn dangling(&self) -> &[RelationshipEdge] {
        &self.dangling
    }

    /// Incident edge count; a self reference counts for both ends.
    #[must_use]
    pub fn degree(&self, name: &str) -> usize {
        self.edges
            .iter()
            .map(|e| usize::from(e.source == name) + usize::from(e.target == name))
            .sum()
    }

    /// Degree of every node, including unconnected ones
    #[must_use]
    pub fn degrees(&self) -> BTreeMap<&str, usize> {
        let mut degrees: BTreeMap<&str, usize> =
            self.nodes.keys().map(|name| (name.as_str(), 0)).collect();
        for edge in &self.edges {
            *degrees.entry(edge.source.as_str()).or_default() += 1;
            *degrees.entry(edge.target.as_str()).or_default() += 1;
        }
        degrees
    }

    /// Induced subgraph over `names`; unknown names are ignored.
    ///
    /// Only edges with both endpoints in `names` survive. Dangling references
    /// of the kept objects carry over.
    #[must_use]
    pub fn subgraph(&self, names: &BTreeSet<String>) -> Self {
        let nodes: BTreeMap<String, ObjectNode> = self
            .nodes
            .iter()
            .filter(|(name, _)| names.contains(*name))
            .map(|(name, node)| (name.clone(), node.clone()))
            .collect();

        let edges = self
            .edges
            .iter()
            .filter(|e| nodes.contains_key(&e.source) && nodes.contains_key(&e.target))
            .cloned()
            .collect();

        let dangling = self
            .dangling
            .iter()
            .filter(|e| nodes.contains_key(&e.source))
            .cloned()
            .collect();

        Self {
            nodes,
            edges,
            dangling,
        }
    }

    /// petgraph copy of the graph plus the name -> index mapping
    #[must_use]
    pub fn to_petgraph(&self) -> (RelationshipGraph, HashMap<String, NodeIndex>) {
        let mut graph = RelationshipGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index = HashMap::with_capacity(self.nodes.len());

        for name in self.nodes.keys() {
            index.insert(name.clone(), graph.add_node(name.clone()));
        }
        for edge in &self.edges {
            graph.add_edge(index[&edge.source], index[&edge.target], edge.kind);
        }

        (graph, index)
    }
}
