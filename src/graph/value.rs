//! Values returned by graph queries
//!
//! FalkorDB's compact reply encodes every cell as a `[type, value]` pair.
//! This module turns those pairs into [`GraphValue`] and renders values as
//! text for tabular output.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{ExportError, ExportResult};
use crate::protocol::RespValue;

/// Ordered property mapping, as returned by `properties(...)`
pub type PropertyMap = IndexMap<String, GraphValue>;

/// Scalar type codes used in compact replies
mod type_code {
    pub const NULL: i64 = 1;
    pub const STRING: i64 = 2;
    pub const INTEGER: i64 = 3;
    pub const BOOLEAN: i64 = 4;
    pub const DOUBLE: i64 = 5;
    pub const ARRAY: i64 = 6;
    pub const EDGE: i64 = 7;
    pub const NODE: i64 = 8;
    pub const PATH: i64 = 9;
    pub const MAP: i64 = 10;
    pub const POINT: i64 = 11;
    pub const VECTORF32: i64 = 12;
    pub const DATETIME: i64 = 13;
    pub const DATE: i64 = 14;
    pub const TIME: i64 = 15;
    pub const DURATION: i64 = 16;
}

/// A decoded query value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GraphValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<GraphValue>),
    Map(PropertyMap),
    Point { latitude: f64, longitude: f64 },
    /// Embedding vector (`vecf32`)
    Vector(Vec<f64>),
    /// Seconds since the Unix epoch, UTC
    DateTime(#[serde(serialize_with = "serialize_datetime")] i64),
    /// Midnight of the date, as seconds since the Unix epoch
    Date(#[serde(serialize_with = "serialize_date")] i64),
    /// Time of day, as seconds since the Unix epoch on 1970-01-01
    Time(#[serde(serialize_with = "serialize_time")] i64),
    /// Length in seconds
    Duration(i64),
}

impl GraphValue {
    /// Get string value if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the mapping if this is a map
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            GraphValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name
    pub fn type_name(&self) -> &'static str {
        match self {
            GraphValue::Null => "Null",
            GraphValue::Boolean(_) => "Boolean",
            GraphValue::Integer(_) => "Integer",
            GraphValue::Double(_) => "Double",
            GraphValue::String(_) => "String",
            GraphValue::Array(_) => "Array",
            GraphValue::Map(_) => "Map",
            GraphValue::Point { .. } => "Point",
            GraphValue::Vector(_) => "Vector",
            GraphValue::DateTime(_) => "DateTime",
            GraphValue::Date(_) => "Date",
            GraphValue::Time(_) => "Time",
            GraphValue::Duration(_) => "Duration",
        }
    }

    /// Decode one `[type, value]` cell from a compact reply
    pub fn from_compact(cell: &RespValue) -> ExportResult<Self> {
        let pair = cell.as_array()?;
        if pair.len() != 2 {
            return Err(ExportError::Protocol(format!(
                "Expected [type, value] cell, got {} elements",
                pair.len()
            )));
        }
        let code = pair[0].as_integer()?;
        let raw = &pair[1];

        match code {
            type_code::NULL => Ok(GraphValue::Null),
            type_code::STRING => Ok(GraphValue::String(required_string(raw)?)),
            type_code::INTEGER => Ok(GraphValue::Integer(raw.as_integer()?)),
            type_code::BOOLEAN => match required_string(raw)?.as_str() {
                "true" => Ok(GraphValue::Boolean(true)),
                "false" => Ok(GraphValue::Boolean(false)),
                other => Err(ExportError::Protocol(format!("Invalid boolean: {}", other))),
            },
            type_code::DOUBLE => Ok(GraphValue::Double(parse_double(raw)?)),
            type_code::ARRAY => raw
                .as_array()?
                .iter()
                .map(GraphValue::from_compact)
                .collect::<ExportResult<Vec<_>>>()
                .map(GraphValue::Array),
            type_code::MAP => {
                let flat = raw.as_array()?;
                if flat.len() % 2 != 0 {
                    return Err(ExportError::Protocol(
                        "Map reply has an odd number of elements".to_string(),
                    ));
                }
                let mut map = PropertyMap::with_capacity(flat.len() / 2);
                for kv in flat.chunks(2) {
                    map.insert(required_string(&kv[0])?, GraphValue::from_compact(&kv[1])?);
                }
                Ok(GraphValue::Map(map))
            }
            type_code::POINT => {
                let coords = raw.as_array()?;
                if coords.len() != 2 {
                    return Err(ExportError::Protocol("Point must have two coordinates".to_string()));
                }
                Ok(GraphValue::Point {
                    latitude: parse_double(&coords[0])?,
                    longitude: parse_double(&coords[1])?,
                })
            }
            type_code::VECTORF32 => raw
                .as_array()?
                .iter()
                .map(parse_number)
                .collect::<ExportResult<Vec<_>>>()
                .map(GraphValue::Vector),
            type_code::DATETIME => Ok(GraphValue::DateTime(parse_seconds(raw)?)),
            type_code::DATE => Ok(GraphValue::Date(parse_seconds(raw)?)),
            type_code::TIME => Ok(GraphValue::Time(parse_seconds(raw)?)),
            type_code::DURATION => Ok(GraphValue::Duration(parse_seconds(raw)?)),
            type_code::NODE | type_code::EDGE | type_code::PATH => Err(ExportError::Protocol(
                format!("Graph entity values (type {}) are not supported in tabular export", code),
            )),
            _ => Err(ExportError::Protocol(format!("Unknown value type {}", code))),
        }
    }

    /// Render as a single CSV cell. Null renders as an empty field;
    /// containers render as compact JSON.
    pub fn to_cell(&self) -> ExportResult<String> {
        Ok(match self {
            GraphValue::Null => String::new(),
            GraphValue::Boolean(b) => b.to_string(),
            GraphValue::Integer(i) | GraphValue::Duration(i) => i.to_string(),
            GraphValue::Double(f) => format_double(*f),
            GraphValue::String(s) => s.clone(),
            GraphValue::DateTime(secs) => format_timestamp(*secs, "%Y-%m-%dT%H:%M:%S"),
            GraphValue::Date(secs) => format_timestamp(*secs, "%Y-%m-%d"),
            GraphValue::Time(secs) => format_timestamp(*secs, "%H:%M:%S"),
            GraphValue::Array(_)
            | GraphValue::Map(_)
            | GraphValue::Point { .. }
            | GraphValue::Vector(_) => serde_json::to_string(self)?,
        })
    }
}

impl From<&str> for GraphValue {
    fn from(s: &str) -> Self {
        GraphValue::String(s.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(s: String) -> Self {
        GraphValue::String(s)
    }
}

impl From<i64> for GraphValue {
    fn from(i: i64) -> Self {
        GraphValue::Integer(i)
    }
}

impl From<f64> for GraphValue {
    fn from(f: f64) -> Self {
        GraphValue::Double(f)
    }
}

impl From<bool> for GraphValue {
    fn from(b: bool) -> Self {
        GraphValue::Boolean(b)
    }
}

fn required_string(raw: &RespValue) -> ExportResult<String> {
    raw.as_string()?
        .ok_or_else(|| ExportError::Protocol("Unexpected null string".to_string()))
}

fn parse_double(raw: &RespValue) -> ExportResult<f64> {
    let text = required_string(raw)?;
    text.trim()
        .parse::<f64>()
        .map_err(|e| ExportError::Protocol(format!("Invalid double '{}': {}", text, e)))
}

/// Vector components arrive as textual doubles; tolerate plain integers
fn parse_number(raw: &RespValue) -> ExportResult<f64> {
    match raw {
        RespValue::Integer(i) => Ok(*i as f64),
        other => parse_double(other),
    }
}

/// Temporal values are whole seconds, as an integer or its text
fn parse_seconds(raw: &RespValue) -> ExportResult<i64> {
    match raw {
        RespValue::Integer(i) => Ok(*i),
        other => {
            let text = required_string(other)?;
            text.trim()
                .parse::<i64>()
                .map_err(|e| ExportError::Protocol(format!("Invalid timestamp '{}': {}", text, e)))
        }
    }
}

/// Shortest round-trip form. Debug formatting keeps a `.0` or an exponent on
/// every finite value, so integral doubles read back as floats.
fn format_double(f: f64) -> String {
    format!("{:?}", f)
}

/// UTC rendering of epoch seconds; out-of-range values fall back to the raw
/// number.
fn format_timestamp(secs: i64, pattern: &str) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(ts) => ts.format(pattern).to_string(),
        None => secs.to_string(),
    }
}

fn serialize_datetime<S: Serializer>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*secs, "%Y-%m-%dT%H:%M:%S"))
}

fn serialize_date<S: Serializer>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*secs, "%Y-%m-%d"))
}

fn serialize_time<S: Serializer>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*secs, "%H:%M:%S"))
}
