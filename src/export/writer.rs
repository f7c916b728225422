//! Tabular writer: FlatRecords to CSV
//!
//! Two passes: the column set is the union of keys over every record, so it
//! is only known once the whole collection has been seen.

use csv::WriterBuilder;
use indexmap::IndexSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::error::ExportResult;
use crate::export::record::FlatRecord;

/// Writes a collection of records as one delimited table
#[derive(Debug, Clone, Default)]
pub struct TableWriter {
    leading_columns: Vec<String>,
}

impl TableWriter {
    /// Writer whose column set comes entirely from the records
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that always emits `columns` first, so an empty collection still
    /// yields a header row
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            leading_columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Union of leading columns and record keys, in first-seen order
    pub fn columns(&self, records: &[FlatRecord]) -> Vec<String> {
        let mut columns: IndexSet<&str> = self.leading_columns.iter().map(String::as_str).collect();
        for record in records {
            columns.extend(record.columns());
        }
        columns.into_iter().map(str::to_string).collect()
    }

    /// Write records to `destination`, creating or truncating it. Returns the
    /// number of data rows written.
    pub fn write(&self, records: &[FlatRecord], destination: &Path) -> ExportResult<usize> {
        debug!("Writing {} records to {}", records.len(), destination.display());
        let file = File::create(destination)?;
        self.write_to(records, file)
    }

    /// Write records to any sink
    pub fn write_to<W: io::Write>(&self, records: &[FlatRecord], sink: W) -> ExportResult<usize> {
        let columns = self.columns(records);
        let mut writer = WriterBuilder::new().from_writer(sink);

        if !columns.is_empty() {
            writer.write_record(&columns)?;
        }

        for record in records {
            let row = columns
                .iter()
                .map(|col| match record.get(col) {
                    Some(value) => value.to_cell(),
                    None => Ok(String::new()),
                })
                .collect::<ExportResult<Vec<_>>>()?;
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphValue, PropertyMap};

    fn node(id: i64, label: &str, props: &[(&str, GraphValue)]) -> FlatRecord {
        let mut record = FlatRecord::seeded([("id", GraphValue::Integer(id)), ("label", label.into())]);
        let map: PropertyMap = props.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        record.overlay(&map, None);
        record
    }

    fn render(writer: &TableWriter, records: &[FlatRecord]) -> String {
        let mut out = Vec::new();
        writer.write_to(records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_union_of_columns_with_missing_cells() {
        let records = vec![
            node(0, "Person", &[("name", "Alice".into()), ("age", GraphValue::Integer(30))]),
            node(2, "Company", &[("name", "TechCorp".into()), ("founded", GraphValue::Integer(2010))]),
        ];

        let csv = render(&TableWriter::new(), &records);
        assert_eq!(
            csv,
            "id,label,name,age,founded\n0,Person,Alice,30,\n2,Company,TechCorp,,2010\n"
        );
    }

    #[test]
    fn test_quoting_and_nulls() {
        let records = vec![node(
            1,
            "Note",
            &[("text", "hello, \"world\"".into()), ("deleted", GraphValue::Null)],
        )];

        let csv = render(&TableWriter::new(), &records);
        assert_eq!(csv, "id,label,text,deleted\n1,Note,\"hello, \"\"world\"\"\",\n");
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(render(&TableWriter::new(), &[]), "");
        assert_eq!(render(&TableWriter::with_columns(["id", "label"]), &[]), "id,label\n");
    }

    #[test]
    fn test_write_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");
        let records = vec![
            node(0, "Person", &[("score", GraphValue::Double(0.5)), ("active", true.into())]),
            node(1, "", &[]),
        ];

        let written = TableWriter::with_columns(["id", "label"]).write(&records, &path).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, vec!["id", "label", "score", "active"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "0.5");
        assert_eq!(&rows[0][3], "true");
        assert_eq!(&rows[1][1], "");
        assert_eq!(&rows[1][2], "");
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("edges.csv");
        assert!(TableWriter::new().write(&[], &path).is_err());
    }
}
