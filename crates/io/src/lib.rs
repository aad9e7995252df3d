// File I/O operations

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use stockmatch_matcher::RawTable;

pub mod csv;
pub mod json;
pub mod spreadsheet;
pub mod store;

/// Load one input table, picking the reader from the file extension.
///
/// `sheet` only applies to spreadsheet inputs; the first worksheet is used
/// when it is `None`.
pub fn load_table(name: &str, path: &Path, sheet: Option<&str>) -> Result<RawTable, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" | "txt" => csv::import(name, path)?,
        "tsv" => csv::import_with_delimiter(name, path, b'\t')?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => spreadsheet::import(name, path, sheet)?,
        "" => return Err(format!("{}: file has no extension", path.display())),
        other => return Err(format!("{}: unsupported file type '.{other}'", path.display())),
    };

    tracing::debug!(
        table = name,
        path = %path.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "table loaded"
    );
    Ok(table)
}

/// Check that `path` can be replaced without writing to it.
///
/// Creates and removes the same sibling temporary file [`write_replacing`]
/// uses, and opens an existing target for appending without changing it.
pub fn check_writable(path: &Path) -> Result<(), String> {
    if path.is_dir() {
        return Err(format!("{}: is a directory", path.display()));
    }
    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| format!("{}: {e}", path.display()))?;
    }

    let tmp = temp_sibling(path);
    File::create(&tmp).map_err(|e| format!("{}: {e}", tmp.display()))?;
    std::fs::remove_file(&tmp).map_err(|e| format!("{}: {e}", tmp.display()))
}

/// Write through a sibling temporary file, then rename over `path`.
///
/// A failed write leaves any existing file at `path` untouched.
pub(crate) fn write_replacing<F>(path: &Path, write: F) -> Result<(), String>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), String>,
{
    let tmp = temp_sibling(path);
    let result = (|| {
        let file = File::create(&tmp).map_err(|e| format!("{}: {e}", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(|e| e.to_string())?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        format!("{}: {e}", path.display())
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
