//! Run configuration
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it wants to change. Files are loaded through [`sferd_utils::config`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::graph::SelectionOptions;

/// Diagram description language to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    /// Graphviz DOT
    Dot,
    /// Mermaid `erDiagram`
    Mermaid,
}

impl DiagramFormat {
    /// Extension of the diagram source file
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Mermaid => "mmd",
        }
    }
}

impl std::fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dot => write!(f, "dot"),
            Self::Mermaid => write!(f, "mermaid"),
        }
    }
}

impl std::str::FromStr for DiagramFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(Self::Dot),
            "mermaid" | "mmd" => Ok(Self::Mermaid),
            _ => Err(format!("Invalid diagram format: '{s}'. Valid options: dot, mermaid")),
        }
    }
}

/// Which fields appear inside an object box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FieldScope {
    /// Only lookup and master-detail fields
    Relationships,
    /// Every field
    All,
}

/// Overall flow direction of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    /// Left to right, the renderer default for ERDs
    Auto,
    LeftRight,
    TopDown,
}

impl LayoutDirection {
    /// Graphviz `rankdir` value
    #[must_use]
    pub const fn rankdir(self) -> &'static str {
        match self {
            Self::Auto | Self::LeftRight => "LR",
            Self::TopDown => "TB",
        }
    }
}

/// How the diagram text is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    pub format: DiagramFormat,
    pub title: String,
    pub show_fields: bool,
    pub field_scope: FieldScope,
    /// Explicit cap on fields per object
    pub max_fields_per_entity: Option<usize>,
    /// Derive a cap from the diagram size when no explicit one is set
    pub auto_limit_fields: bool,
    pub direction: LayoutDirection,
    /// Labels longer than this are cut and end in `...`
    pub max_label_length: usize,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            format: DiagramFormat::Dot,
            title: "Salesforce System ERD".to_string(),
            show_fields: true,
            field_scope: FieldScope::Relationships,
            max_fields_per_entity: None,
            auto_limit_fields: true,
            direction: LayoutDirection::Auto,
            max_label_length: 25,
        }
    }
}

impl DiagramOptions {
    /// Field cap for a diagram of `object_count` objects.
    ///
    /// An explicit cap always wins; otherwise bigger diagrams get fewer
    /// fields per object.
    #[must_use]
    pub fn field_limit(&self, object_count: usize) -> Option<usize> {
        if self.max_fields_per_entity.is_some() || !self.auto_limit_fields {
            return self.max_fields_per_entity;
        }
        match object_count {
            n if n >= 500 => Some(2),
            n if n >= 200 => Some(3),
            n if n >= 100 => Some(4),
            n if n >= 50 => Some(6),
            n if n >= 20 => Some(8),
            _ => None,
        }
    }
}

/// External rendering step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Run the external renderer at all
    pub enabled: bool,
    /// Image formats: `svg`, `png`, `pdf`
    pub formats: Vec<String>,
    /// Graphviz layout engine
    pub engine: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            formats: vec!["svg".to_string()],
            engine: "dot".to_string(),
        }
    }
}

/// Complete configuration for one ERD run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErdConfig {
    /// Directory holding one entry per object
    pub objects_path: PathBuf,
    pub output_dir: PathBuf,
    /// Base name of every output file
    pub filename: String,
    /// Only load these objects; empty loads all
    pub objects: Vec<String>,
    pub selection: SelectionOptions,
    pub diagram: DiagramOptions,
    pub render: RenderSettings,
}

impl Default for ErdConfig {
    fn default() -> Self {
        Self {
            objects_path: PathBuf::from("force-app/main/default/objects"),
            output_dir: PathBuf::from("output"),
            filename: "final_erd".to_string(),
            objects: Vec::new(),
            selection: SelectionOptions::default(),
            diagram: DiagramOptions::default(),
            render: RenderSettings::default(),
        }
    }
}

impl ErdConfig {
    /// Load from a TOML/JSON/YAML file, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Propagates file and parse errors from [`sferd_utils::load_config`].
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        Ok(sferd_utils::load_config(path)?)
    }

    /// Where the diagram source is written
    #[must_use]
    pub fn diagram_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.filename, self.diagram.format.extension()))
    }

    /// Directory rendered images go to
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }
}
