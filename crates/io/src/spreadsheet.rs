// Spreadsheet import (xlsx, xls, xlsb, ods) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use stockmatch_matcher::RawTable;

/// Read one worksheet as a table whose first row is the header.
///
/// Uses `sheet` when given, otherwise the first worksheet in the file.
pub fn import(name: &str, path: &Path, sheet: Option<&str>) -> Result<RawTable, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet {}: {e}", path.display()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "{}: no sheet named '{wanted}' (available: {})",
                    path.display(),
                    sheet_names.join(", ")
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| format!("{}: spreadsheet contains no sheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{sheet_name}': {e}"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => Vec::new(),
    };

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = records.len(),
        "worksheet read"
    );
    Ok(RawTable::new(name, headers, records))
}

/// Render a cell the way it would appear in a CSV export of the sheet.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        // Not a number: the cell is reported downstream as a coercion failure
        Data::Error(e) => format!("#{e:?}"),
        // Serial number, 1900 date system
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
