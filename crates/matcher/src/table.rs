//! Raw tabular input: a header row plus string cells.
//!
//! Readers for CSV and spreadsheet files live in `stockmatch-io`; the engine
//! only ever sees this shape.

use crate::error::MatchError;

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One data row, borrowed from its table.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    /// 0-based data row index (header excluded).
    pub index: usize,
    cells: &'a [String],
}

impl<'a> RawRow<'a> {
    /// Trimmed cell text. Empty cells read as `None`.
    pub fn get(&self, col: usize) -> Option<&'a str> {
        self.cells
            .get(col)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    /// Row number as a spreadsheet user sees it: header is row 1.
    pub fn line(&self) -> usize {
        self.index + 2
    }
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut headers = headers;
        if let Some(first) = headers.first_mut() {
            // Excel-exported CSVs often carry a BOM on the first header
            *first = first.trim_start_matches('\u{feff}').to_string();
        }
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Parse delimited text whose first record is the header row.
    pub fn from_delimited(name: &str, content: &str, delimiter: u8) -> Result<Self, MatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| MatchError::Io(format!("{name}: {e}")))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| MatchError::Io(format!("{name}: {e}")))?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self::new(name, headers, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| RawRow { index, cells })
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize, MatchError> {
        self.find_column(name).ok_or_else(|| MatchError::MissingColumn {
            table: self.name.clone(),
            column: name.into(),
        })
    }

    /// Index of a column that may be absent.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }
}
