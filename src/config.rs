//! Export configuration

use std::path::PathBuf;

/// Default separator for [`LabelPolicy::Join`]
pub const DEFAULT_LABEL_SEPARATOR: &str = "|";

/// How a node carrying several labels is written to the `label` column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Keep the first label, drop the rest
    #[default]
    First,
    /// Concatenate all labels with the separator
    Join(String),
    /// Emit one row per label
    Explode,
}

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Graph to export
    pub graph: String,
    /// Directory receiving nodes.csv and edges.csv
    pub output_dir: PathBuf,
    /// Multi-label handling
    pub label_policy: LabelPolicy,
    /// Prefix for property columns (None = properties may overwrite
    /// reserved columns such as `id`)
    pub property_prefix: Option<String>,
}

impl ExportConfig {
    /// Configuration for `graph` with every other setting at its default
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            ..Self::default()
        }
    }

    /// Path of the node output file
    pub fn nodes_path(&self) -> PathBuf {
        self.output_dir.join("nodes.csv")
    }

    /// Path of the edge output file
    pub fn edges_path(&self) -> PathBuf {
        self.output_dir.join("edges.csv")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            graph: String::new(),
            output_dir: PathBuf::from("."),
            label_policy: LabelPolicy::First,
            property_prefix: None,
        }
    }
}
