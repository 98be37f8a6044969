use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::error::{Result, SyncError};
use crate::model::SheetData;

/// Reads the named worksheet as a header row followed by data rows.
///
/// The first row becomes the shared header; every later row is returned as
/// plain cell text with absent cells as empty strings. A workbook without
/// the requested sheet is an error; a sheet with no rows at all comes back
/// empty and is treated upstream as a no-op run.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<SheetData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range_result = workbook
        .worksheet_range(sheet_name)
        .ok_or_else(|| SyncError::MissingSheet(sheet_name.to_string()))?;
    let range = range_result.map_err(SyncError::from)?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };

    let data = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(SheetData { header, rows: data })
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}
