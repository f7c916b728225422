//! Node flattening
//!
//! One row per node: `id`, `label`, then every property key of that node.

use tracing::debug;

use crate::client::GraphQuery;
use crate::config::LabelPolicy;
use crate::error::{ExportError, ExportResult};
use crate::export::record::{property_map, FlatRecord};
use crate::export::FlattenOptions;
use crate::graph::GraphValue;

/// Enumerates every node with its labels and properties
pub const NODE_QUERY: &str = "MATCH (n) RETURN ID(n), labels(n), properties(n)";

/// Fixed leading columns of nodes.csv
pub const NODE_COLUMNS: [&str; 2] = ["id", "label"];

/// Query all nodes of the graph and flatten them, in server order
pub async fn flatten_nodes<G>(graph: &mut G, options: &FlattenOptions) -> ExportResult<Vec<FlatRecord>>
where
    G: GraphQuery + ?Sized,
{
    let result = graph.ro_query(NODE_QUERY).await?;
    debug!("Node query on '{}' returned {} rows", graph.graph_name(), result.len());

    let mut records = Vec::with_capacity(result.len());
    for row in &result.rows {
        let [id, labels, properties] = row.as_slice() else {
            return Err(ExportError::Protocol(format!(
                "Node row has {} columns, expected 3",
                row.len()
            )));
        };

        let labels = label_list(labels)?;
        let properties = property_map(properties)?;

        for label in apply_label_policy(&labels, &options.label_policy) {
            let mut record = FlatRecord::seeded([("id", id.clone()), ("label", GraphValue::String(label))]);
            record.overlay(&properties, options.property_prefix.as_deref());
            records.push(record);
        }
    }

    Ok(records)
}

fn label_list(value: &GraphValue) -> ExportResult<Vec<&str>> {
    match value {
        GraphValue::Null => Ok(Vec::new()),
        GraphValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    ExportError::Protocol(format!("Label must be a string, got {}", item.type_name()))
                })
            })
            .collect(),
        other => Err(ExportError::Protocol(format!(
            "Expected label list, got {}",
            other.type_name()
        ))),
    }
}

/// Labels to emit for one node; always at least one entry, possibly empty
fn apply_label_policy(labels: &[&str], policy: &LabelPolicy) -> Vec<String> {
    match policy {
        LabelPolicy::First => vec![labels.first().copied().unwrap_or_default().to_string()],
        LabelPolicy::Join(separator) => vec![labels.join(separator.as_str())],
        LabelPolicy::Explode if labels.is_empty() => vec![String::new()],
        LabelPolicy::Explode => labels.iter().map(|l| l.to_string()).collect(),
    }
}
