//! Mermaid `erDiagram` export

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sferd_core::{
    DiagramFormat, DiagramOptions, LayoutDirection, ObjectCategory, RelationshipKind, SchemaGraph,
};
use sferd_utils::{collapse_whitespace, safe_truncate, sanitize_identifier};

use crate::entity::{category_color, EntityView};
use crate::DiagramExporter;

/// Mermaid ER diagram exporter
#[derive(Debug, Clone, Default)]
pub struct MermaidExporter {
    /// Emit `classDef`/`class` lines for category colors
    pub category_classes: bool,
}

impl MermaidExporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            category_classes: true,
        }
    }

    #[must_use]
    pub const fn with_category_classes(mut self, enabled: bool) -> Self {
        self.category_classes = enabled;
        self
    }

    const fn direction(direction: LayoutDirection) -> &'static str {
        match direction {
            LayoutDirection::Auto | LayoutDirection::LeftRight => "LR",
            LayoutDirection::TopDown => "TB",
        }
    }

    const fn connector(kind: RelationshipKind) -> &'static str {
        match kind {
            // identifying: the child cannot exist without its parent
            RelationshipKind::MasterDetail => "}o--||",
            RelationshipKind::Lookup => "}o..o|",
        }
    }

    fn write_entity(out: &mut String, view: &EntityView<'_>, options: &DiagramOptions) {
        let id = sanitize_identifier(&view.object.name);
        let label = safe_truncate(&collapse_whitespace(&view.object.label), options.max_label_length);

        let head = if label == view.object.name {
            id.clone()
        } else {
            format!("{id}[\"{}\"]", quote_text(&label))
        };

        if view.fields.is_empty() {
            let _ = writeln!(out, "    {head}");
        } else {
            let _ = writeln!(out, "    {head} {{");
            for field in &view.fields {
                let mut line = format!(
                    "{} {}",
                    sanitize_identifier(&field.field_type),
                    sanitize_identifier(&field.name)
                );
                if field.is_relationship() {
                    line.push_str(" FK");
                }
                if field.required {
                    line.push_str(" \"required\"");
                }
                let _ = writeln!(out, "        {line}");
            }
            out.push_str("    }\n");
        }

        if view.hidden > 0 {
            let _ = writeln!(out, "    %% {id}: ... {} more", view.hidden);
        }
    }

    fn write_classes(out: &mut String, graph: &SchemaGraph) {
        let mut members: BTreeMap<ObjectCategory, Vec<String>> = BTreeMap::new();
        for node in graph.nodes() {
            members
                .entry(node.category)
                .or_default()
                .push(sanitize_identifier(&node.name));
        }

        if members.is_empty() {
            return;
        }

        out.push('\n');
        for category in members.keys() {
            let _ = writeln!(out, "    classDef {category} fill:{}", category_color(*category));
        }
        for (category, ids) in &members {
            let _ = writeln!(out, "    class {} {category}", ids.join(","));
        }
    }
}

impl DiagramExporter for MermaidExporter {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::Mermaid
    }

    fn export(&self, graph: &SchemaGraph, options: &DiagramOptions) -> String {
        let limit = options.field_limit(graph.node_count());

        let mut out = String::new();
        let _ = writeln!(out, "---\ntitle: \"{}\"\n---", quote_text(&options.title));
        out.push_str("erDiagram\n");
        let _ = writeln!(out, "    direction {}", Self::direction(options.direction));

        for object in graph.nodes() {
            let view = EntityView::new(object, options, limit);
            Self::write_entity(&mut out, &view, options);
        }

        if !graph.edges().is_empty() {
            out.push('\n');
        }
        for edge in graph.edges() {
            let _ = writeln!(
                out,
                "    {} {} {} : \"{}\"",
                sanitize_identifier(&edge.source),
                Self::connector(edge.kind),
                sanitize_identifier(&edge.target),
                quote_text(&edge.label)
            );
        }

        if self.category_classes {
            Self::write_classes(&mut out, graph);
        }

        out
    }
}

/// Mermaid has no escape for `"` inside quoted text
fn quote_text(s: &str) -> String {
    collapse_whitespace(s).replace('"', "'")
}
