//! Top-N object selection
//!
//! Large orgs have hundreds of objects, far too many for one readable
//! diagram. Objects are ranked by incident edge count (ties by API name) and
//! the top `max_objects` are kept together with the edges between them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::SchemaGraph;

/// How many objects to keep and whether unconnected ones qualify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Upper bound on selected objects; `0` keeps everything
    pub max_objects: usize,
    /// Let objects without relationships fill leftover slots
    pub include_isolated: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            max_objects: 15,
            include_isolated: false,
        }
    }
}

impl SelectionOptions {
    #[must_use]
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    #[must_use]
    pub fn with_isolated(mut self, include_isolated: bool) -> Self {
        self.include_isolated = include_isolated;
        self
    }
}

/// All objects ordered by degree descending, then name ascending.
#[must_use]
pub fn rank_objects(graph: &SchemaGraph) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = graph.degrees().into_iter().collect();
    ranked.sort_by(|(a_name, a_deg), (b_name, b_deg)| b_deg.cmp(a_deg).then(a_name.cmp(b_name)));
    ranked
}

impl SchemaGraph {
    /// Names of the best-connected objects, best first.
    #[must_use]
    pub fn top_connected(&self, options: &SelectionOptions) -> Vec<String> {
        let limit = if options.max_objects == 0 {
            usize::MAX
        } else {
            options.max_objects
        };

        rank_objects(self)
            .into_iter()
            .filter(|(_, degree)| options.include_isolated || *degree > 0)
            .take(limit)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Induced subgraph over [`SchemaGraph::top_connected`].
    #[must_use]
    pub fn select(&self, options: &SelectionOptions) -> Self {
        let ranked = self.top_connected(options);

        let preview: Vec<&str> = ranked.iter().take(10).map(String::as_str).collect();
        info!(
            "Selected {} of {} objects: {}{}",
            ranked.len(),
            self.node_count(),
            preview.join(", "),
            if ranked.len() > preview.len() { ", ..." } else { "" }
        );

        let names: BTreeSet<String> = ranked.into_iter().collect();
        self.subgraph(&names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDef, ObjectNode};

    fn hub_and_spokes() -> SchemaGraph {
        // Account <- Contact, Opportunity, Case; Opportunity <- Quote
        let lookup = |name: &str, target: &str| FieldDef::new(name, "Lookup").referencing(target);
        SchemaGraph::build(vec![
            ObjectNode::new("Account", "Account", vec![]),
            ObjectNode::new("Case", "Case", vec![lookup("AccountId", "Account")]),
            ObjectNode::new("Contact", "Contact", vec![lookup("AccountId", "Account")]),
            ObjectNode::new("Opportunity", "Opportunity", vec![lookup("AccountId", "Account")]),
            ObjectNode::new("Quote", "Quote", vec![lookup("OpportunityId", "Opportunity")]),
            ObjectNode::new("Lonely__c", "Lonely", vec![]),
        ])
    }

    #[test]
    fn test_rank_by_degree_then_name() {
        let graph = hub_and_spokes();
        let ranked = rank_objects(&graph);
        assert_eq!(ranked[0], ("Account", 3));
        assert_eq!(ranked[1], ("Opportunity", 2));
        assert_eq!(ranked[2], ("Case", 1));
        assert_eq!(ranked[3], ("Contact", 1));
        assert_eq!(ranked[4], ("Quote", 1));
        assert_eq!(ranked[5], ("Lonely__c", 0));
    }

    #[test]
    fn test_top_connected_skips_isolated_by_default() {
        let graph = hub_and_spokes();
        let all = graph.top_connected(&SelectionOptions::default());
        assert_eq!(all.len(), 5);
        assert!(!all.contains(&"Lonely__c".to_string()));

        let with_isolated =
            graph.top_connected(&SelectionOptions::default().with_isolated(true));
        assert_eq!(with_isolated.last().map(String::as_str), Some("Lonely__c"));
    }

    #[test]
    fn test_select_keeps_only_internal_edges() {
        let graph = hub_and_spokes();
        let selected = graph.select(&SelectionOptions::default().with_max_objects(3));

        let names: Vec<_> = selected.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Account", "Case", "Opportunity"]);
        assert_eq!(selected.edge_count(), 2);
        assert!(selected.edges().iter().all(|e| e.source != "Quote"));
    }

    #[test]
    fn test_zero_means_unlimited() {
        let graph = hub_and_spokes();
        let selected = graph.select(&SelectionOptions::default().with_max_objects(0));
        assert_eq!(selected.node_count(), 5);
        assert_eq!(selected.edge_count(), graph.edge_count());
    }
}
