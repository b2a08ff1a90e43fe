use std::path::Path;

use tracing::{info, instrument};

use crate::freedom::dashboard::error::{DashboardError, Result};
use crate::freedom::dashboard::filter::{FilterCriteria, FilteredView};
use crate::freedom::dashboard::io::excel_write;

/// Default download name when no single entity is selected.
pub const DEFAULT_EXPORT_FILENAME: &str = "filtered_freedom_data.csv";

/// Serializes a view as comma-separated text with a header row.
///
/// Every column of the underlying table is written; nulls become empty
/// fields. An empty view produces an empty string, not a lone header.
#[instrument(level = "debug", skip_all, fields(rows = view.len()))]
pub fn to_delimited_text(view: &FilteredView<'_>) -> Result<String> {
    if view.is_empty() {
        return Ok(String::new());
    }

    let columns = view.table().columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|column| column.header()))?;
    for record in view.records() {
        writer.write_record(columns.iter().map(|column| column.cell(record).to_field()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| DashboardError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| DashboardError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

/// Download name for the current selection.
pub fn suggested_filename(criteria: &FilterCriteria) -> String {
    match (&criteria.entity_name, criteria.year) {
        (Some(entity), Some(year)) => format!("{entity}_{year}_freedom_data.csv"),
        (Some(entity), None) => format!("{entity}_freedom_data.csv"),
        (None, _) => DEFAULT_EXPORT_FILENAME.to_string(),
    }
}

/// Writes the view to a single-sheet workbook at `path`.
///
/// Returns `false` without touching the filesystem when the view is empty.
#[instrument(level = "info", skip(view), fields(rows = view.len(), output = %path.display()))]
pub fn write_workbook(view: &FilteredView<'_>, path: &Path) -> Result<bool> {
    if view.is_empty() {
        info!("nothing to export");
        return Ok(false);
    }
    excel_write::write_view(path, view)?;
    Ok(true)
}
