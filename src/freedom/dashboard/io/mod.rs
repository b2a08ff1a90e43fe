//! Loaders that turn a source file into a [`RawTable`].
//!
//! Fetching the published workbook over the network is left to the caller;
//! everything here reads local files.

pub mod csv_read;
pub mod excel_read;
pub mod excel_write;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::model::{RawCell, RawTable};
use crate::freedom::dashboard::normalize::{ENTITY_NAME_CANDIDATES, canonical_header};

pub use csv_read::parse_delimited_text;

/// Published location of the Freedom in the World 2013-2024 workbook.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/VizualOptima/Freedom_Index/main/All_data_FIW_2013-2024.xlsx";

/// Number of leading rows searched for the header row when none is given.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Identifies a source dataset. Doubles as the cache key for the
/// normalized table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    /// Worksheet to read; workbooks only.
    pub sheet: Option<String>,
    /// Zero-based header row; detected when `None`.
    pub header_row: Option<usize>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
            header_row: None,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = Some(header_row);
        self
    }

    /// Human readable description used in errors and logs.
    pub fn origin(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{}#{sheet}", self.path.display()),
            None => self.path.display().to_string(),
        }
    }
}

/// Loads the raw table described by `source`, dispatching on file extension.
#[instrument(level = "info", skip_all, fields(origin = %source.origin()))]
pub fn load(source: &SourceSpec) -> Result<RawTable> {
    if !source.path.exists() {
        return Err(DashboardError::MissingInput(source.path.clone()));
    }

    let extension = source
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match extension.as_str() {
        "xlsx" | "xlsm" => {
            excel_read::read_raw_table(&source.path, source.sheet.as_deref(), source.header_row)?
        }
        "csv" => csv_read::read_raw_table(&source.path, source.header_row)?,
        other => return Err(DashboardError::UnsupportedFormat(format!(".{other}"))),
    };

    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded raw table"
    );
    Ok(table)
}

/// Splits loaded rows into header and data rows. Blank rows are skipped.
pub(crate) fn split_header(
    mut rows: Vec<Vec<RawCell>>,
    header_row: Option<usize>,
    origin: &str,
) -> Result<RawTable> {
    let header_index = match header_row {
        Some(index) => index,
        None => detect_header_row(&rows),
    };
    if header_index >= rows.len() {
        return Err(DashboardError::Load {
            origin: origin.to_string(),
            reason: format!(
                "header row {header_index} is out of bounds ({} rows)",
                rows.len()
            ),
        });
    }
    debug!(header_index, "selected header row");

    let data = rows.split_off(header_index + 1);
    let headers = rows
        .pop()
        .unwrap_or_default()
        .iter()
        .map(|cell| cell.to_text().unwrap_or_default())
        .collect();
    let data = data
        .into_iter()
        .filter(|row| row.iter().any(|cell| *cell != RawCell::Empty))
        .collect();

    Ok(RawTable::new(headers, data))
}

fn detect_header_row(rows: &[Vec<RawCell>]) -> usize {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            row.iter().any(|cell| {
                cell.to_text().is_some_and(|text| {
                    ENTITY_NAME_CANDIDATES.contains(&canonical_header(&text))
                })
            })
        })
        .unwrap_or(0)
}
