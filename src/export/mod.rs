//! Graph-to-table export
//!
//! The driver runs the pipeline strictly in sequence:
//!
//! 1. connect and bind the graph
//! 2. flatten nodes, write `nodes.csv`
//! 3. flatten edges, write `edges.csv`
//!
//! Any failure aborts the run. A `nodes.csv` written before a failing edge
//! stage is left on disk.

pub mod edges;
pub mod nodes;
pub mod record;
pub mod writer;

pub use edges::{flatten_edges, EDGE_COLUMNS, EDGE_QUERY};
pub use nodes::{flatten_nodes, NODE_COLUMNS, NODE_QUERY};
pub use record::FlatRecord;
pub use writer::TableWriter;

use std::path::PathBuf;
use tracing::info;

use crate::client::GraphQuery;
use crate::config::{ExportConfig, LabelPolicy};
use crate::error::ExportResult;
use crate::protocol::FalkorConnection;

/// Options shared by both flatteners
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    pub label_policy: LabelPolicy,
    pub property_prefix: Option<String>,
}

impl From<&ExportConfig> for FlattenOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            label_policy: config.label_policy.clone(),
            property_prefix: config.property_prefix.clone(),
        }
    }
}

/// Outcome of a successful export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Rows written to nodes.csv
    pub nodes: usize,
    /// Rows written to edges.csv
    pub edges: usize,
    pub nodes_path: PathBuf,
    pub edges_path: PathBuf,
}

/// Export the configured graph from a live server
pub async fn export_graph(config: &ExportConfig) -> ExportResult<ExportSummary> {
    let conn = FalkorConnection::connect(&config.host, config.port).await?;
    info!("Connected to {}, exporting graph '{}'", conn.addr(), config.graph);

    let mut graph = conn.select_graph(config.graph.clone());
    export_from(&mut graph, config).await
}

/// Export through an already-bound graph session
pub async fn export_from<G>(graph: &mut G, config: &ExportConfig) -> ExportResult<ExportSummary>
where
    G: GraphQuery + ?Sized,
{
    let options = FlattenOptions::from(config);
    let nodes_path = config.nodes_path();
    let edges_path = config.edges_path();

    let nodes = flatten_nodes(&mut *graph, &options).await?;
    let nodes = TableWriter::with_columns(NODE_COLUMNS).write(&nodes, &nodes_path)?;
    info!("Exported {} nodes to {}", nodes, nodes_path.display());

    let edges = flatten_edges(&mut *graph, &options).await?;
    let edges = TableWriter::with_columns(EDGE_COLUMNS).write(&edges, &edges_path)?;
    info!("Exported {} edges to {}", edges, edges_path.display());

    Ok(ExportSummary {
        nodes,
        edges,
        nodes_path,
        edges_path,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::client::GraphQuery;
    use crate::error::{ExportError, ExportResult};
    use crate::graph::{GraphValue, QueryResult};

    /// In-memory query endpoint with canned rows per query string.
    /// Queries without canned rows return an empty result.
    #[derive(Default)]
    pub struct StubGraph {
        results: HashMap<String, Vec<Vec<GraphValue>>>,
        failing: Option<String>,
        pub queries: Vec<String>,
    }

    impl StubGraph {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_result(mut self, query: &str, rows: Vec<Vec<GraphValue>>) -> Self {
            self.results.insert(query.to_string(), rows);
            self
        }

        pub fn failing_on(mut self, query: &str) -> Self {
            self.failing = Some(query.to_string());
            self
        }
    }

    #[async_trait]
    impl GraphQuery for StubGraph {
        fn graph_name(&self) -> &str {
            "stub"
        }

        async fn ro_query(&mut self, query: &str) -> ExportResult<QueryResult> {
            self.queries.push(query.to_string());
            if self.failing.as_deref() == Some(query) {
                return Err(ExportError::Query("stub failure".to_string()));
            }
            Ok(QueryResult {
                rows: self.results.get(query).cloned().unwrap_or_default(),
                ..QueryResult::default()
            })
        }
    }
}
