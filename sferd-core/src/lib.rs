//! sferd core - Salesforce metadata to schema graph
//!
//! This crate provides:
//! - the object/field/relationship data model
//! - the metadata loader for source-format and metadata-API object trees
//! - the schema graph with dangling reference tracking
//! - top-N selection and graph statistics
//! - run configuration shared by the CLI and the emitters

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;

pub mod config;
pub mod graph;
pub mod metadata;
pub mod models;

pub use config::{DiagramFormat, DiagramOptions, ErdConfig, FieldScope, LayoutDirection, RenderSettings};
pub use graph::{GraphStatistics, SchemaGraph, SelectionOptions};
pub use metadata::{LoadIssue, LoadReport, MetadataLoader};
pub use models::{FieldDef, ObjectCategory, ObjectNode, RelationshipEdge, RelationshipKind};

/// Result type used throughout sferd core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sferd core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The objects directory does not exist
    #[error("Objects path not found: {}", .0.display())]
    ObjectsPathNotFound(PathBuf),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A metadata document could not be parsed
    #[error("XML error in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] sferd_utils::UtilError),
}

/// Load the objects under `config.objects_path` and build the full graph.
///
/// Files that failed to parse are returned alongside the graph.
///
/// # Errors
///
/// [`Error::ObjectsPathNotFound`] when the directory is missing.
pub fn load_graph(config: &ErdConfig) -> Result<(SchemaGraph, Vec<LoadIssue>)> {
    let report = MetadataLoader::new(&config.objects_path)
        .with_filter(config.objects.iter().cloned())
        .load()?;
    Ok((SchemaGraph::build(report.objects), report.issues))
}
