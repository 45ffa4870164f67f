//! sferd visualization - diagram emitters and external renderers
//!
//! Turns a [`SchemaGraph`] into DOT or Mermaid text and hands that text to
//! Graphviz or the Mermaid CLI for SVG/PNG/PDF output.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use sferd_core::{DiagramFormat, DiagramOptions, SchemaGraph};

pub mod dot;
pub mod entity;
pub mod mermaid;
pub mod render;

pub use dot::DotExporter;
pub use entity::{category_color, EntityView};
pub use mermaid::MermaidExporter;
pub use render::{
    parse_formats, render_all, renderer_for, GraphvizRenderer, LayoutEngine, MermaidCliRenderer,
    OutputFormat, RenderOutcome, Renderer,
};

/// Serializes a schema graph into a diagram description language
pub trait DiagramExporter {
    /// Language this exporter writes
    fn format(&self) -> DiagramFormat;

    /// Diagram source text for `graph`
    fn export(&self, graph: &SchemaGraph, options: &DiagramOptions) -> String;
}

/// Exporter for `format` with its default settings
#[must_use]
pub fn exporter_for(format: DiagramFormat) -> Box<dyn DiagramExporter> {
    match format {
        DiagramFormat::Dot => Box::new(DotExporter::new()),
        DiagramFormat::Mermaid => Box::new(MermaidExporter::new()),
    }
}

/// Export `graph` in the format named by `options.format`
#[must_use]
pub fn export(graph: &SchemaGraph, options: &DiagramOptions) -> String {
    exporter_for(options.format).export(graph, options)
}
