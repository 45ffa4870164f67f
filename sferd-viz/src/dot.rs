//! DOT format export for schema graphs
//!
//! Objects become `record` nodes: the first cell holds the object label and
//! each displayed field gets its own port-tagged cell, so relationship edges
//! leave from the exact field that holds the reference.

use std::fmt::Write as _;

use sferd_core::{DiagramFormat, DiagramOptions, RelationshipEdge, RelationshipKind, SchemaGraph};
use sferd_utils::{collapse_whitespace, safe_truncate};

use crate::entity::{category_color, EntityView};
use crate::DiagramExporter;

const FONT: &str = "Arial, sans-serif";

/// Graphviz DOT exporter
#[derive(Debug, Clone)]
pub struct DotExporter {
    /// Draw edges from the field port instead of the node border
    pub use_field_ports: bool,
    /// Put the field name on lookup/master-detail edges as a tooltip
    pub edge_tooltips: bool,
}

impl Default for DotExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DotExporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_field_ports: true,
            edge_tooltips: true,
        }
    }

    /// Builder pattern: enable/disable field ports
    #[must_use]
    pub const fn with_field_ports(mut self, enabled: bool) -> Self {
        self.use_field_ports = enabled;
        self
    }

    /// Builder pattern: enable/disable edge tooltips
    #[must_use]
    pub const fn with_edge_tooltips(mut self, enabled: bool) -> Self {
        self.edge_tooltips = enabled;
        self
    }

    fn write_header(dot: &mut String, options: &DiagramOptions) {
        let _ = writeln!(dot, "digraph G {{");
        let _ = writeln!(dot, "  label=\"{}\";", escape_quoted(&options.title));
        dot.push_str("  labelloc=t;\n");
        dot.push_str("  fontsize=24;\n");
        let _ = writeln!(dot, "  fontname=\"{FONT}\";");
        let _ = writeln!(dot, "  rankdir={};", options.direction.rankdir());
        dot.push_str("  splines=ortho;\n");
        dot.push_str("  nodesep=1.0;\n");
        dot.push_str("  ranksep=2.0;\n");
        dot.push_str("  overlap=false;\n");
        dot.push_str("  concentrate=false;\n");
        let _ = writeln!(
            dot,
            "  node [shape=record, style=filled, fontname=\"{FONT}\", fontsize=12, margin=0.1];"
        );
        let _ = writeln!(dot, "  edge [fontname=\"{FONT}\", fontsize=10, penwidth=1.5];");
        dot.push('\n');
    }

    fn node_label(view: &EntityView<'_>, options: &DiagramOptions) -> String {
        let title = safe_truncate(&collapse_whitespace(&view.object.label), options.max_label_length);
        let mut cells = vec![format!("*{}*", escape_record(&title))];

        for field in &view.fields {
            let name = if field.required {
                format!("*{}*", field.name)
            } else {
                field.name.clone()
            };
            cells.push(format!(
                "<{}> {} : {}",
                escape_record(&field.name),
                escape_record(&name),
                escape_record(&field.field_type)
            ));
        }

        if view.hidden > 0 {
            cells.push(format!("... {} more", view.hidden));
        }

        cells.join("|")
    }

    fn edge_style(kind: RelationshipKind) -> &'static str {
        match kind {
            RelationshipKind::MasterDetail => {
                "arrowhead=dot, arrowtail=dot, color=steelblue, penwidth=2.0"
            }
            RelationshipKind::Lookup => "arrowhead=open, arrowtail=none, color=gray, penwidth=1.5",
        }
    }

    fn write_edge(&self, dot: &mut String, edge: &RelationshipEdge, source_view: Option<&EntityView<'_>>) {
        let tail = if self.use_field_ports && source_view.is_some_and(|v| v.shows(&edge.field)) {
            format!("{}:{}", quote_id(&edge.source), quote_id(&edge.field))
        } else {
            quote_id(&edge.source)
        };

        let mut attrs = Self::edge_style(edge.kind).to_string();
        if self.edge_tooltips {
            let _ = write!(attrs, ", tooltip=\"{}\"", escape_quoted(&edge.label));
        }

        let _ = writeln!(dot, "  {tail} -> {} [{attrs}];", quote_id(&edge.target));
    }
}

impl DiagramExporter for DotExporter {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::Dot
    }

    fn export(&self, graph: &SchemaGraph, options: &DiagramOptions) -> String {
        let limit = options.field_limit(graph.node_count());
        let views: Vec<EntityView<'_>> = graph
            .nodes()
            .map(|object| EntityView::new(object, options, limit))
            .collect();

        let mut dot = String::new();
        Self::write_header(&mut dot, options);

        for view in &views {
            let _ = writeln!(
                dot,
                "  {} [label=\"{}\", fillcolor=\"{}\"];",
                quote_id(&view.object.name),
                Self::node_label(view, options),
                category_color(view.object.category)
            );
        }

        dot.push('\n');

        for edge in graph.edges() {
            let source_view = views.iter().find(|v| v.object.name == edge.source);
            self.write_edge(&mut dot, edge, source_view);
        }

        dot.push_str("}\n");
        dot
    }
}

/// Quote a node or port identifier
fn quote_id(id: &str) -> String {
    format!("\"{}\"", escape_quoted(id))
}

/// Escape text for a double-quoted DOT string
fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ")
}

/// Escape text inside a record label cell
fn escape_record(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '"' | '|' | '{' | '}' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sferd_core::{FieldDef, LayoutDirection, ObjectNode};

    fn graph() -> SchemaGraph {
        SchemaGraph::build(vec![
            ObjectNode::new("Account", "Account", vec![FieldDef::new("Industry", "Picklist")]),
            ObjectNode::new("Invoice__c", "Invoice", vec![
                FieldDef::new("Account__c", "MasterDetail").referencing("Account").required(true),
                FieldDef::new("Contact__c", "Lookup").referencing("Contact"),
            ]),
            ObjectNode::new("Contact", "Contact", vec![
                FieldDef::new("AccountId", "Lookup").referencing("Account"),
            ]),
        ])
    }

    #[test]
    fn test_header_and_footer() {
        let dot = DotExporter::new().export(&graph(), &DiagramOptions::default());
        assert!(dot.starts_with("digraph G {\n"));
        assert!(dot.contains("  label=\"Salesforce System ERD\";\n"));
        assert!(dot.contains("  rankdir=LR;\n"));
        assert!(dot.contains("  splines=ortho;\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_nodes_carry_category_color_and_ports() {
        let dot = DotExporter::new().export(&graph(), &DiagramOptions::default());
        assert!(dot.contains(
            "  \"Invoice__c\" [label=\"*Invoice*|<Account__c> *Account__c* : MasterDetail|<Contact__c> Contact__c : Lookup\", fillcolor=\"#FFF9C4\"];"
        ));
        assert!(dot.contains("  \"Account\" [label=\"*Account*\", fillcolor=\"#E1F5FE\"];"));
    }

    #[test]
    fn test_edge_styles() {
        let dot = DotExporter::new().export(&graph(), &DiagramOptions::default());
        assert!(dot.contains(
            "  \"Invoice__c\":\"Account__c\" -> \"Account\" [arrowhead=dot, arrowtail=dot, color=steelblue, penwidth=2.0, tooltip=\"Account__c\"];"
        ));
        assert!(dot.contains(
            "  \"Contact\":\"AccountId\" -> \"Account\" [arrowhead=open, arrowtail=none, color=gray, penwidth=1.5, tooltip=\"AccountId\"];"
        ));
        assert_eq!(dot.matches(" -> ").count(), 2);
    }

    #[test]
    fn test_hidden_fields_drop_ports() {
        let options = DiagramOptions {
            show_fields: false,
            ..DiagramOptions::default()
        };
        let dot = DotExporter::new().export(&graph(), &options);
        assert!(dot.contains("  \"Contact\" -> \"Account\" ["));
        assert!(!dot.contains("\"Contact\":\"AccountId\""));
    }

    #[test]
    fn test_edges_without_field_ports() {
        let dot = DotExporter::new().with_field_ports(false).export(&graph(), &DiagramOptions::default());
        assert!(dot.contains("  \"Invoice__c\" -> \"Account\" [arrowhead=dot"));
        assert!(!dot.contains("\"Invoice__c\":\"Account__c\""));
        // rows keep their port tags
        assert!(dot.contains("<Account__c> *Account__c* : MasterDetail"));
    }

    #[test]
    fn test_field_limit_adds_more_line() {
        let options = DiagramOptions {
            max_fields_per_entity: Some(1),
            ..DiagramOptions::default()
        };
        let dot = DotExporter::new().with_edge_tooltips(false).export(&graph(), &options);
        assert!(dot.contains("|... 1 more\""));
        assert!(dot.contains("  \"Invoice__c\":\"Account__c\" -> \"Account\" [arrowhead=dot, arrowtail=dot, color=steelblue, penwidth=2.0];"));
    }

    #[test]
    fn test_top_down_direction() {
        let options = DiagramOptions {
            direction: LayoutDirection::TopDown,
            ..DiagramOptions::default()
        };
        let dot = DotExporter::new().export(&graph(), &options);
        assert!(dot.contains("  rankdir=TB;\n"));
    }

    #[test]
    fn test_labels_are_escaped_and_truncated() {
        let graph = SchemaGraph::build(vec![ObjectNode::new(
            "Odd__c",
            "Quote \"Approval\" | {Step} <One>",
            vec![],
        )]);
        let dot = DotExporter::new().export(&graph, &DiagramOptions::default());
        assert!(dot.contains("[label=\"*Quote \\\"Approval\\\" \\| \\{St...*\""));
    }

    #[test]
    fn test_escape_record() {
        assert_eq!(escape_record("a|b"), "a\\|b");
        assert_eq!(escape_record("<x>"), "\\<x\\>");
        assert_eq!(escape_record("line\nbreak"), "line break");
    }
}
