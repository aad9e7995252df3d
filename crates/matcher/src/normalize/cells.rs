// Typed cell reads shared by the normalizers

use crate::model::{Diagnostic, DiagnosticKind};
use crate::table::RawRow;

/// Why a single field could not be read.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellError {
    Missing { field: &'static str },
    NotNumeric { field: &'static str, value: String },
    Negative { field: &'static str, value: i64 },
}

impl CellError {
    pub(crate) fn into_diagnostic(self, table: &str, row: &RawRow<'_>) -> Diagnostic {
        match self {
            Self::Missing { field } => Diagnostic {
                table: table.to_string(),
                row: row.line(),
                kind: DiagnosticKind::MalformedRecord,
                message: format!("missing required field '{field}'"),
            },
            Self::NotNumeric { field, value } => Diagnostic {
                table: table.to_string(),
                row: row.line(),
                kind: DiagnosticKind::TypeCoercion,
                message: format!("field '{field}': cannot parse '{value}' as a number"),
            },
            Self::Negative { field, value } => Diagnostic {
                table: table.to_string(),
                row: row.line(),
                kind: DiagnosticKind::MalformedRecord,
                message: format!("field '{field}' must not be negative, got {value}"),
            },
        }
    }
}

pub(crate) fn text(row: &RawRow<'_>, col: Option<usize>) -> Option<String> {
    col.and_then(|c| row.get(c)).map(str::to_string)
}

pub(crate) fn required_text(
    row: &RawRow<'_>,
    col: usize,
    field: &'static str,
) -> Result<String, CellError> {
    row.get(col)
        .map(str::to_string)
        .ok_or(CellError::Missing { field })
}

pub(crate) fn float(
    row: &RawRow<'_>,
    col: Option<usize>,
    field: &'static str,
) -> Result<Option<f64>, CellError> {
    match col.and_then(|c| row.get(c)) {
        None => Ok(None),
        Some(raw) => parse_float(raw).map(Some).ok_or_else(|| CellError::NotNumeric {
            field,
            value: raw.to_string(),
        }),
    }
}

pub(crate) fn required_float(
    row: &RawRow<'_>,
    col: usize,
    field: &'static str,
) -> Result<f64, CellError> {
    float(row, Some(col), field)?.ok_or(CellError::Missing { field })
}

pub(crate) fn int(
    row: &RawRow<'_>,
    col: Option<usize>,
    field: &'static str,
) -> Result<Option<i64>, CellError> {
    match col.and_then(|c| row.get(c)) {
        None => Ok(None),
        Some(raw) => parse_int(raw).map(Some).ok_or_else(|| CellError::NotNumeric {
            field,
            value: raw.to_string(),
        }),
    }
}

pub(crate) fn required_int(
    row: &RawRow<'_>,
    col: usize,
    field: &'static str,
) -> Result<i64, CellError> {
    int(row, Some(col), field)?.ok_or(CellError::Missing { field })
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers accept float-valued text ("50.0"), rounded half away from zero.
fn parse_int(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        parse_float(raw)
            .filter(|v| v.abs() < 9.0e15)
            .map(|v| v.round() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn table(cells: &[&str]) -> RawTable {
        let headers = (0..cells.len()).map(|i| format!("c{i}")).collect();
        RawTable::new("t", headers, vec![cells.iter().map(|c| c.to_string()).collect()])
    }

    #[test]
    fn numbers_parse() {
        assert_eq!(parse_float("2.5"), Some(2.5));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_int("50"), Some(50));
        assert_eq!(parse_int("50.0"), Some(50));
        assert_eq!(parse_int("12.5"), Some(13));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("ten"), None);
    }

    #[test]
    fn empty_cells_are_missing() {
        let t = table(&["", "  ", "abc", "7"]);
        let row = t.rows().next().unwrap();
        assert_eq!(float(&row, Some(0), "x"), Ok(None));
        assert_eq!(int(&row, Some(1), "x"), Ok(None));
        assert_eq!(float(&row, None, "x"), Ok(None));
        assert_eq!(required_int(&row, 3, "q"), Ok(7));
        assert_eq!(
            required_float(&row, 0, "weight"),
            Err(CellError::Missing { field: "weight" })
        );
        assert_eq!(
            float(&row, Some(2), "thickness"),
            Err(CellError::NotNumeric { field: "thickness", value: "abc".into() })
        );
    }

    #[test]
    fn diagnostics_carry_row_and_kind() {
        let t = table(&["abc"]);
        let row = t.rows().next().unwrap();
        let diag = float(&row, Some(0), "width")
            .unwrap_err()
            .into_diagnostic("supplier_1", &row);
        assert_eq!(diag.row, 2);
        assert_eq!(diag.kind, DiagnosticKind::TypeCoercion);
        assert!(diag.message.contains("'abc'"));
    }
}
