//! Flat records: one output row keyed by column name

use indexmap::IndexMap;

use crate::error::{ExportError, ExportResult};
use crate::graph::{GraphValue, PropertyMap};

/// One output row. Column order is insertion order; re-inserting an existing
/// column replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    cells: IndexMap<String, GraphValue>,
}

impl FlatRecord {
    /// Start a record from fixed leading columns
    pub fn seeded<I, K>(fixed: I) -> Self
    where
        I: IntoIterator<Item = (K, GraphValue)>,
        K: Into<String>,
    {
        Self {
            cells: fixed.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Overlay property values. Without a prefix, a property named like a
    /// fixed column overwrites it.
    pub fn overlay(&mut self, properties: &PropertyMap, prefix: Option<&str>) {
        for (key, value) in properties {
            let column = match prefix {
                Some(p) => format!("{}{}", p, key),
                None => key.clone(),
            };
            self.cells.insert(column, value.clone());
        }
    }

    /// Value of a column, if the record has it
    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.cells.get(column)
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Interpret a `properties(...)` cell. Null means no properties.
pub(crate) fn property_map(value: &GraphValue) -> ExportResult<PropertyMap> {
    match value {
        GraphValue::Null => Ok(PropertyMap::new()),
        GraphValue::Map(map) => Ok(map.clone()),
        other => Err(ExportError::Protocol(format!(
            "Expected property map, got {}",
            other.type_name()
        ))),
    }
}
