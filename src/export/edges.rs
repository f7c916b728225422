//! Edge flattening
//!
//! One row per relationship: `id`, `type`, `from_id`, `to_id`, then every
//! property key of that relationship.

use tracing::debug;

use crate::client::GraphQuery;
use crate::error::{ExportError, ExportResult};
use crate::export::record::{property_map, FlatRecord};
use crate::export::FlattenOptions;

/// Enumerates every directed relationship with its endpoints and properties
pub const EDGE_QUERY: &str = "MATCH (a)-[e]->(b) RETURN ID(e), TYPE(e), ID(a), ID(b), properties(e)";

/// Fixed leading columns of edges.csv
pub const EDGE_COLUMNS: [&str; 4] = ["id", "type", "from_id", "to_id"];

/// Query all relationships of the graph and flatten them, in server order
pub async fn flatten_edges<G>(graph: &mut G, options: &FlattenOptions) -> ExportResult<Vec<FlatRecord>>
where
    G: GraphQuery + ?Sized,
{
    let result = graph.ro_query(EDGE_QUERY).await?;
    debug!("Edge query on '{}' returned {} rows", graph.graph_name(), result.len());

    result
        .rows
        .iter()
        .map(|row| -> ExportResult<FlatRecord> {
            let [id, edge_type, from_id, to_id, properties] = row.as_slice() else {
                return Err(ExportError::Protocol(format!(
                    "Edge row has {} columns, expected 5",
                    row.len()
                )));
            };

            let mut record = FlatRecord::seeded([
                ("id", id.clone()),
                ("type", edge_type.clone()),
                ("from_id", from_id.clone()),
                ("to_id", to_id.clone()),
            ]);
            record.overlay(&property_map(properties)?, options.property_prefix.as_deref());
            Ok(record)
        })
        .collect()
}
