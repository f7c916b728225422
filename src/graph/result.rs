//! Result sets of `GRAPH.RO_QUERY ... --compact`

use crate::error::{ExportError, ExportResult};
use crate::graph::value::GraphValue;
use crate::protocol::RespValue;

/// Result of executing a read-only query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Tabular result rows, one value per column
    pub rows: Vec<Vec<GraphValue>>,
    /// Server statistics lines (e.g. "Query internal execution time: ...")
    pub stats: Vec<String>,
}

impl QueryResult {
    /// Number of result rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode a compact reply: `[header, rows, stats]`, or `[stats]` for
    /// queries that return nothing.
    ///
    /// An error reply, or an error as the final element (runtime failure
    /// after the header was produced), becomes [`ExportError::Query`].
    pub fn from_compact(reply: RespValue) -> ExportResult<Self> {
        let items = match reply {
            RespValue::Error(msg) => return Err(ExportError::Query(msg)),
            RespValue::Array(items) => items,
            other => {
                return Err(ExportError::Protocol(format!(
                    "Expected query result array, got {:?}",
                    other
                )))
            }
        };

        if let Some(RespValue::Error(msg)) = items.last() {
            return Err(ExportError::Query(msg.clone()));
        }

        match items.as_slice() {
            [stats] => Ok(Self {
                stats: parse_stats(stats)?,
                ..Self::default()
            }),
            [header, rows, stats] => {
                let columns = parse_header(header)?;
                let rows = rows
                    .as_array()?
                    .iter()
                    .map(|row| parse_row(row, columns.len()))
                    .collect::<ExportResult<Vec<_>>>()?;
                Ok(Self {
                    columns,
                    rows,
                    stats: parse_stats(stats)?,
                })
            }
            other => Err(ExportError::Protocol(format!(
                "Query result has {} sections, expected 1 or 3",
                other.len()
            ))),
        }
    }
}

fn parse_header(header: &RespValue) -> ExportResult<Vec<String>> {
    header
        .as_array()?
        .iter()
        .map(|col| -> ExportResult<String> {
            // Compact headers are [column_type, name]
            let name = match col {
                RespValue::Array(pair) if pair.len() == 2 => pair[1].as_string()?,
                other => other.as_string()?,
            };
            name.ok_or_else(|| ExportError::Protocol("Null column name".to_string()))
        })
        .collect()
}

fn parse_row(row: &RespValue, width: usize) -> ExportResult<Vec<GraphValue>> {
    let cells = row.as_array()?;
    if cells.len() != width {
        return Err(ExportError::Protocol(format!(
            "Row has {} cells but header has {} columns",
            cells.len(),
            width
        )));
    }
    cells.iter().map(GraphValue::from_compact).collect()
}

fn parse_stats(stats: &RespValue) -> ExportResult<Vec<String>> {
    stats
        .as_array()?
        .iter()
        .map(|line| -> ExportResult<String> { Ok(line.as_string()?.unwrap_or_default()) })
        .collect()
}
