//! Graph session used by the exporters

use async_trait::async_trait;
use tracing::debug;

use crate::error::ExportResult;
use crate::graph::QueryResult;
use crate::protocol::{FalkorConnection, RespValue};

/// Read-only query interface the flatteners are written against.
///
/// Implemented by:
/// - `GraphHandle` — a live FalkorDB session bound to one graph
/// - in-memory stubs in tests
#[async_trait]
pub trait GraphQuery: Send {
    /// Name of the graph queries run against
    fn graph_name(&self) -> &str;

    /// Execute a read-only query
    async fn ro_query(&mut self, query: &str) -> ExportResult<QueryResult>;
}

/// A server session bound to one named graph. Lives for one export run.
pub struct GraphHandle {
    conn: FalkorConnection,
    name: String,
}

impl GraphHandle {
    pub(crate) fn new(conn: FalkorConnection, name: String) -> Self {
        Self { conn, name }
    }
}

#[async_trait]
impl GraphQuery for GraphHandle {
    fn graph_name(&self) -> &str {
        &self.name
    }

    async fn ro_query(&mut self, query: &str) -> ExportResult<QueryResult> {
        debug!("GRAPH.RO_QUERY {} \"{}\"", self.name, query);
        let command = RespValue::command(["GRAPH.RO_QUERY", self.name.as_str(), query, "--compact"]);
        let reply = self.conn.request(&command).await?;
        QueryResult::from_compact(reply)
    }
}
