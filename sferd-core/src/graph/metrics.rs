//! Summary statistics for a schema graph

use std::collections::BTreeMap;

use petgraph::algo::connected_components;
use serde::Serialize;

use super::{selection::rank_objects, SchemaGraph};
use crate::models::{ObjectCategory, RelationshipKind};

/// How many of the best-connected objects to list
const MOST_CONNECTED_LIMIT: usize = 5;

/// Counts and shape of a schema graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub object_count: usize,
    pub relationship_count: usize,
    pub master_detail_count: usize,
    pub lookup_count: usize,
    pub self_reference_count: usize,
    /// References to objects that were not loaded
    pub dangling_count: usize,
    pub category_counts: BTreeMap<ObjectCategory, usize>,
    /// edges / (n * (n - 1))
    pub density: f64,
    pub average_degree: f64,
    /// Weakly connected components
    pub connected_components: usize,
    /// Objects without any relationship, by name
    pub isolated_objects: Vec<String>,
    /// `(name, degree)` of the best-connected objects
    pub most_connected: Vec<(String, usize)>,
}

impl SchemaGraph {
    /// Compute [`GraphStatistics`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> GraphStatistics {
        let n = self.node_count();
        let e = self.edge_count();

        let mut category_counts: BTreeMap<ObjectCategory, usize> =
            ObjectCategory::all().into_iter().map(|c| (c, 0)).collect();
        for node in self.nodes() {
            *category_counts.entry(node.category).or_default() += 1;
        }

        let count_kind = |kind: RelationshipKind| self.edges().iter().filter(|r| r.kind == kind).count();

        let density = if n > 1 {
            e as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        let average_degree = if n > 0 { (2 * e) as f64 / n as f64 } else { 0.0 };

        let (pg, _) = self.to_petgraph();
        let ranked = rank_objects(self);

        GraphStatistics {
            object_count: n,
            relationship_count: e,
            master_detail_count: count_kind(RelationshipKind::MasterDetail),
            lookup_count: count_kind(RelationshipKind::Lookup),
            self_reference_count: self.edges().iter().filter(|r| r.is_self_reference()).count(),
            dangling_count: self.dangling().len(),
            category_counts,
            density,
            average_degree,
            connected_components: connected_components(&pg),
            isolated_objects: ranked
                .iter()
                .filter(|(_, degree)| *degree == 0)
                .map(|(name, _)| (*name).to_string())
                .collect(),
            most_connected: ranked
                .iter()
                .filter(|(_, degree)| *degree > 0)
                .take(MOST_CONNECTED_LIMIT)
                .map(|(name, degree)| ((*name).to_string(), *degree))
                .collect(),
        }
    }
}
