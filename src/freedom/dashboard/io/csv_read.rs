use std::path::Path;

use crate::freedom::dashboard::error::Result;
use crate::freedom::dashboard::io::split_header;
use crate::freedom::dashboard::model::{RawCell, RawTable};

/// Reads a comma-separated file. Every non-blank field is kept as text.
pub fn read_raw_table(path: &Path, header_row: Option<usize>) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let rows = read_rows(reader)?;
    split_header(rows, header_row, &path.display().to_string())
}

/// Parses text produced by [`to_delimited_text`](crate::export::to_delimited_text).
///
/// Blank input yields an empty table.
pub fn parse_delimited_text(text: &str) -> Result<RawTable> {
    if text.trim().is_empty() {
        return Ok(RawTable::default());
    }
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let rows = read_rows(reader)?;
    split_header(rows, Some(0), "delimited text")
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Vec<RawCell>>> {
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}
