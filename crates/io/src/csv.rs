// CSV/TSV import and recommendation export

use std::io::{Read, Write};
use std::path::Path;

use stockmatch_matcher::{RawTable, Recommendation};

/// Column order of every recommendation export.
pub const RECOMMENDATION_HEADERS: [&str; 9] = [
    "buyer_id",
    "supplier_source",
    "grade",
    "finish",
    "thickness_mm",
    "width_mm",
    "weight_kg",
    "quantity",
    "match_reason",
];

pub fn import(name: &str, path: &Path) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(name, &content, delimiter)
}

pub fn import_with_delimiter(name: &str, path: &Path, delimiter: u8) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(name, &content, delimiter)
}

/// Delimiters tried by [`sniff_delimiter`], in preference order on a tie.
const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Guess the field separator of a stock or preference export.
///
/// The header line decides how many columns a candidate yields; a candidate
/// scores by how many of the first ten lines agree with that width, weighted
/// by the width itself. Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(10).collect();

    DELIMITER_CANDIDATES
        .iter()
        .filter_map(|&delim| {
            let widths: Vec<usize> = sample.iter().map(|line| fields_per_line(line, delim)).collect();
            let header_width = *widths.first().filter(|&&w| w > 1)?;
            let agreeing = widths.iter().filter(|&&w| w == header_width).count();
            Some((delim, agreeing * header_width))
        })
        // Strictly greater keeps the earlier candidate on equal scores
        .fold(None, |best: Option<(u8, usize)>, (delim, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((delim, score)),
        })
        .map_or(b',', |(delim, _)| delim)
}

/// Quote-aware field count of a single line.
fn fields_per_line(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read an input file as text, decoding non-UTF-8 bytes as Windows-1252.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel on Windows exports "geglüht" and friends as Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            tracing::debug!(path = %path.display(), "decoded input as Windows-1252");
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<RawTable, String> {
    RawTable::from_delimited(name, content, delimiter).map_err(|e| e.to_string())
}

/// Write the presented recommendation rows as CSV, replacing `path` only on success.
pub fn export_recommendations<'a, I>(rows: I, path: &Path) -> Result<(), String>
where
    I: IntoIterator<Item = &'a Recommendation>,
{
    crate::write_replacing(path, |w| write_recommendations(rows, w))
}

/// Write the presented recommendation rows as CSV to any writer.
pub fn write_recommendations<'a, I, W>(rows: I, out: W) -> Result<(), String>
where
    I: IntoIterator<Item = &'a Recommendation>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(RECOMMENDATION_HEADERS)
        .map_err(|e| e.to_string())?;

    for r in rows {
        writer
            .write_record([
                r.buyer_id.clone(),
                r.supplier_source.clone(),
                r.grade.clone(),
                r.finish.clone().unwrap_or_default(),
                optional_number(r.thickness_mm),
                optional_number(r.width_mm),
                r.weight_kg.to_string(),
                r.quantity.to_string(),
                r.match_reason.clone(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

fn optional_number(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}
