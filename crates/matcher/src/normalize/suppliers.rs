//! Supplier schema normalization.
//!
//! Each [`SupplierLayout`] has exactly one row mapping function. A mapping
//! either yields an item, reports that the source's inclusion filter excluded
//! the row, or drops the row with a diagnostic.

use serde::Serialize;

use super::cells::{self, CellError};
use crate::config::{DescribedOptions, DimensionalOptions, SupplierConfig, SupplierLayout};
use crate::error::MatchError;
use crate::model::{Diagnostic, SupplierItem};
use crate::table::{RawRow, RawTable};

/// Unified supplier set plus per-source bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSuppliers {
    pub items: Vec<SupplierItem>,
    pub sources: Vec<SourceSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub source: String,
    pub layout: SupplierLayout,
    pub rows: usize,
    pub loaded: usize,
    pub filtered: usize,
    pub dropped: usize,
}

enum RowOutcome {
    Item(SupplierItem),
    Filtered,
    Dropped(CellError),
}

impl From<Result<Option<SupplierItem>, CellError>> for RowOutcome {
    fn from(r: Result<Option<SupplierItem>, CellError>) -> Self {
        match r {
            Ok(Some(item)) => Self::Item(item),
            Ok(None) => Self::Filtered,
            Err(e) => Self::Dropped(e),
        }
    }
}

/// Normalize every supplier table, in the given order, into one sequence.
///
/// Ordinals are assigned across the whole sequence so that an item's
/// identity does not depend on which source it came from.
pub fn normalize_suppliers(
    sources: &[(&SupplierConfig, &RawTable)],
) -> Result<NormalizedSuppliers, MatchError> {
    let mut out = NormalizedSuppliers::default();

    for (config, table) in sources {
        let mut summary = SourceSummary {
            source: config.source.clone(),
            layout: config.layout,
            rows: table.len(),
            loaded: 0,
            filtered: 0,
            dropped: 0,
        };

        let outcomes = match config.layout {
            SupplierLayout::Dimensional => {
                map_dimensional(&config.source, &config.dimensional_options(), table)?
            }
            SupplierLayout::Described => {
                map_described(&config.source, &config.described_options(), table)?
            }
        };

        for (row, outcome) in outcomes {
            match outcome {
                RowOutcome::Item(mut item) => {
                    item.ordinal = out.items.len();
                    out.items.push(item);
                    summary.loaded += 1;
                }
                RowOutcome::Filtered => summary.filtered += 1,
                RowOutcome::Dropped(err) => {
                    let diag = err.into_diagnostic(&config.source, &row);
                    tracing::warn!(
                        source = %config.source,
                        row = diag.row,
                        kind = %diag.kind,
                        "dropping supplier record: {}",
                        diag.message
                    );
                    out.diagnostics.push(diag);
                    summary.dropped += 1;
                }
            }
        }

        tracing::debug!(
            source = %summary.source,
            layout = %summary.layout,
            rows = summary.rows,
            loaded = summary.loaded,
            filtered = summary.filtered,
            dropped = summary.dropped,
            "supplier source normalized"
        );
        out.sources.push(summary);
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Dimensional layout
// ---------------------------------------------------------------------------

struct DimensionalIndex {
    quality: Option<usize>,
    grade: usize,
    finish: Option<usize>,
    thickness: Option<usize>,
    width: Option<usize>,
    description: Option<usize>,
    weight: usize,
    quantity: usize,
}

fn map_dimensional<'t>(
    source: &str,
    options: &DimensionalOptions,
    table: &'t RawTable,
) -> Result<Vec<(RawRow<'t>, RowOutcome)>, MatchError> {
    let col = &options.columns;
    let idx = DimensionalIndex {
        quality: table.find_column(&col.quality),
        grade: table.column(&col.grade)?,
        finish: table.find_column(&col.finish),
        thickness: table.find_column(&col.thickness),
        width: table.find_column(&col.width),
        description: table.find_column(&col.description),
        weight: table.column(&col.weight)?,
        quantity: table.column(&col.quantity)?,
    };

    Ok(table
        .rows()
        .map(|row| (row, dimensional_row(source, &idx, &row).into()))
        .collect())
}

/// Numeric fields pass through; only rows with positive quantity are kept.
fn dimensional_row(
    source: &str,
    idx: &DimensionalIndex,
    row: &RawRow<'_>,
) -> Result<Option<SupplierItem>, CellError> {
    let quantity = cells::required_int(row, idx.quantity, "quantity")?;
    if quantity <= 0 {
        return Ok(None);
    }

    Ok(Some(SupplierItem {
        ordinal: 0,
        source: source.to_string(),
        quality: cells::text(row, idx.quality).unwrap_or_default(),
        grade: cells::required_text(row, idx.grade, "grade")?,
        finish: cells::text(row, idx.finish),
        thickness_mm: cells::float(row, idx.thickness, "thickness")?,
        width_mm: cells::float(row, idx.width, "width")?,
        description: cells::text(row, idx.description).unwrap_or_default(),
        weight_kg: cells::required_float(row, idx.weight, "weight")?,
        quantity,
    }))
}

// ---------------------------------------------------------------------------
// Described layout
// ---------------------------------------------------------------------------

struct DescribedIndex {
    grade: usize,
    description: Option<usize>,
    weight: usize,
    quantity: usize,
    reserved: Option<usize>,
}

fn map_described<'t>(
    source: &str,
    options: &DescribedOptions,
    table: &'t RawTable,
) -> Result<Vec<(RawRow<'t>, RowOutcome)>, MatchError> {
    let col = &options.columns;
    let idx = DescribedIndex {
        grade: table.column(&col.grade)?,
        description: table.find_column(&col.description),
        weight: table.column(&col.weight)?,
        quantity: table.column(&col.quantity)?,
        reserved: if options.reserved_markers.is_empty() {
            table.find_column(&col.reserved)
        } else {
            Some(table.column(&col.reserved)?)
        },
    };

    Ok(table
        .rows()
        .map(|row| (row, described_row(source, options, &idx, &row).into()))
        .collect())
}

/// No dimensions; the finish is recovered from the description text.
fn described_row(
    source: &str,
    options: &DescribedOptions,
    idx: &DescribedIndex,
    row: &RawRow<'_>,
) -> Result<Option<SupplierItem>, CellError> {
    // An empty reservation cell keeps the row, unlike a SQL `!=` against NULL.
    if let Some(reserved) = idx.reserved.and_then(|c| row.get(c)) {
        if options.reserved_markers.iter().any(|m| m == reserved) {
            return Ok(None);
        }
    }

    let description = cells::text(row, idx.description);
    let finish = description
        .as_deref()
        .map(|d| finish_from_description(d, &options.finish_prefix));

    let quantity = cells::required_int(row, idx.quantity, "quantity")?;
    if quantity < 0 {
        return Err(CellError::Negative { field: "quantity", value: quantity });
    }

    Ok(Some(SupplierItem {
        ordinal: 0,
        source: source.to_string(),
        quality: options.quality.clone(),
        grade: cells::required_text(row, idx.grade, "grade")?,
        finish,
        thickness_mm: None,
        width_mm: None,
        description: description.unwrap_or_default(),
        weight_kg: cells::required_float(row, idx.weight, "weight")?,
        quantity,
    }))
}

/// Remove the first occurrence of `prefix` and lower-case the rest.
fn finish_from_description(description: &str, prefix: &str) -> String {
    let stripped = if prefix.is_empty() {
        description.to_string()
    } else {
        description.replacen(prefix, "", 1)
    };
    stripped.to_lowercase()
}
