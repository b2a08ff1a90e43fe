use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::freedom::dashboard::error::Result;
use crate::freedom::dashboard::filter::FilteredView;
use crate::freedom::dashboard::model::Cell;

/// Name of the worksheet written by [`write_view`].
pub const EXPORT_SHEET: &str = "Freedom Index";

/// Writes the view's columns and rows to a new workbook at `path`.
pub fn write_view(path: &Path, view: &FilteredView<'_>) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET)?;

    let columns = view.table().columns();
    for (col_idx, column) in columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, column.header())?;
    }

    for (row_idx, record) in view.records().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col_idx, column) in columns.iter().enumerate() {
            let col = col_idx as u16;
            match column.cell(record) {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row, col, value)?;
                }
                Cell::Integer(value) => {
                    worksheet.write_number(row, col, value as f64)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, value)?;
                }
            }
        }
    }

    let col_end = (columns.len() as u16).saturating_sub(1);
    worksheet.autofilter(0, 0, view.len() as u32, col_end)?;
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}
