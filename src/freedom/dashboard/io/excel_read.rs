use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::io::split_header;
use crate::freedom::dashboard::model::{RawCell, RawTable};

/// Worksheet holding the 2013-2025 editions in the published workbook.
pub const DEFAULT_SHEET: &str = "FIW13-25";

/// Reads one worksheet of a workbook into a raw table.
///
/// Without an explicit `sheet`, [`DEFAULT_SHEET`] is used when present and
/// the first worksheet otherwise.
pub fn read_raw_table(
    path: &Path,
    sheet: Option<&str>,
    header_row: Option<usize>,
) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let origin = path.display().to_string();

    let sheet_name = resolve_sheet(&workbook.sheet_names(), sheet, &origin)?;
    debug!(sheet = %sheet_name, "reading worksheet");
    let range = read_required_sheet(&mut workbook, &sheet_name, &origin)?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(to_raw_cell).collect())
        .collect();
    split_header(rows, header_row, &origin)
}

fn resolve_sheet(names: &[String], requested: Option<&str>, origin: &str) -> Result<String> {
    let resolved = match requested {
        Some(name) => names.iter().find(|candidate| *candidate == name),
        None => names
            .iter()
            .find(|candidate| *candidate == DEFAULT_SHEET)
            .or_else(|| names.first()),
    };
    resolved.cloned().ok_or_else(|| DashboardError::Load {
        origin: origin.to_string(),
        reason: match requested {
            Some(name) => format!("missing sheet '{name}'"),
            None => "workbook has no worksheets".to_string(),
        },
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
    origin: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| DashboardError::Load {
            origin: origin.to_string(),
            reason: format!("missing sheet '{name}'"),
        })?;
    let range = range_result.map_err(DashboardError::from)?;
    Ok(range)
}

fn to_raw_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::String(value) if value.trim().is_empty() => RawCell::Empty,
        DataType::String(value) => RawCell::Text(value.clone()),
        DataType::Float(value) => RawCell::Number(*value),
        DataType::Int(value) => RawCell::Number(*value as f64),
        DataType::Bool(value) => RawCell::Bool(*value),
        DataType::Empty | DataType::Error(_) => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}
