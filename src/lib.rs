//! Falkor Export
//!
//! Dumps one named graph from a running FalkorDB server into two flat CSV
//! files, `nodes.csv` and `edges.csv`.
//!
//! Nodes and relationships carry arbitrary, non-uniform property maps. Each
//! entity becomes one [`FlatRecord`](export::FlatRecord) (fixed columns plus
//! its own properties) and the output column set is the union of keys over
//! the whole collection; rows lacking a key get an empty cell.
//!
//! # Example
//!
//! ```no_run
//! use falkor_export::{export_graph, ExportConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), falkor_export::ExportError> {
//!     let summary = export_graph(&ExportConfig::new("social")).await?;
//!     println!("{} nodes, {} edges", summary.nodes, summary.edges);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod protocol;

pub use client::{GraphHandle, GraphQuery};
pub use config::{ExportConfig, LabelPolicy, DEFAULT_LABEL_SEPARATOR};
pub use error::{ExportError, ExportResult};
pub use export::{export_from, export_graph, ExportSummary, FlatRecord, FlattenOptions, TableWriter};
pub use graph::{GraphValue, PropertyMap, QueryResult};
pub use protocol::{FalkorConnection, RespValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
