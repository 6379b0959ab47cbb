//! Legacy CSV input.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use reclaim_model::RawRecord;
use tracing::{debug, trace};

use crate::logging::redact_value;

/// Read every row of a headed CSV file. Rows are numbered from 1.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("open input {}", path.display()))?;
    let records = read_records_from(file).with_context(|| format!("read input {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "input loaded");
    Ok(records)
}

/// Empty cells stay present as empty strings; short rows leave the
/// missing columns absent.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("read header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("read row {}", index + 1))?;
        let number = u64::try_from(index + 1).unwrap_or(u64::MAX);
        let record = RawRecord::from_pairs(number, headers.iter().cloned().zip(row.iter()));
        if let Some((column, value)) = record.fields.first() {
            trace!(
                row = number,
                column = %column,
                value = redact_value(value.as_deref().unwrap_or_default()),
                "row read"
            );
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_columns_and_numbering() {
        let csv = "rec_id,client_name,unit\nA1003,\"Singh, Amar\",4 b\n1004,,\n";
        let records = read_records_from(csv.as_bytes()).expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].get("client_name"), Some("Singh, Amar"));
        assert_eq!(records[1].row, 2);
        assert_eq!(records[1].get("client_name"), Some(""));
    }

    #[test]
    fn short_rows_are_accepted() {
        let csv = "a,b,c\n1,2\n";
        let records = read_records_from(csv.as_bytes()).expect("records");
        assert_eq!(records[0].get("b"), Some("2"));
        assert_eq!(records[0].get("c"), None);
    }
}
