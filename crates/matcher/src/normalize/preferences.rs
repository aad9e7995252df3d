//! Buyer preference normalization.

use std::collections::HashMap;

use super::cells::{self, CellError};
use crate::config::{BuyerConfig, DuplicatePolicy};
use crate::error::MatchError;
use crate::model::{BuyerPreference, Diagnostic, DiagnosticKind};
use crate::table::{RawRow, RawTable};
use crate::vocabulary::translate_finish;

#[derive(Debug, Clone, Default)]
pub struct NormalizedBuyers {
    pub buyers: Vec<BuyerPreference>,
    pub diagnostics: Vec<Diagnostic>,
}

struct BuyerIndex {
    buyer_id: usize,
    grade: usize,
    finish: Option<usize>,
    thickness: Option<usize>,
    width: Option<usize>,
    max_weight: Option<usize>,
    min_quantity: Option<usize>,
}

/// Map raw preference rows to [`BuyerPreference`]s.
///
/// Absent optional constraints become `None` ("no constraint"), never zero.
/// A repeated buyer id either aborts the run or replaces the earlier row,
/// depending on the configured [`DuplicatePolicy`].
pub fn normalize_preferences(
    config: &BuyerConfig,
    table: &RawTable,
) -> Result<NormalizedBuyers, MatchError> {
    let col = &config.columns;
    let idx = BuyerIndex {
        buyer_id: table.column(&col.buyer_id)?,
        grade: table.column(&col.grade)?,
        finish: table.find_column(&col.finish),
        thickness: table.find_column(&col.thickness),
        width: table.find_column(&col.width),
        max_weight: table.find_column(&col.max_weight),
        min_quantity: table.find_column(&col.min_quantity),
    };

    let mut out = NormalizedBuyers::default();
    // buyer_id -> (position in out.buyers, row it came from)
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();

    for row in table.rows() {
        let buyer = match buyer_row(&idx, &row) {
            Ok(b) => b,
            Err(err) => {
                let diag = err.into_diagnostic(table.name(), &row);
                tracing::warn!(
                    table = table.name(),
                    row = diag.row,
                    kind = %diag.kind,
                    "dropping buyer record: {}",
                    diag.message
                );
                out.diagnostics.push(diag);
                continue;
            }
        };

        match seen.get(&buyer.buyer_id).copied() {
            None => {
                seen.insert(buyer.buyer_id.clone(), (out.buyers.len(), row.line()));
                out.buyers.push(buyer);
            }
            Some((pos, first_row)) => match config.on_duplicate {
                DuplicatePolicy::Error => {
                    return Err(MatchError::DuplicateBuyer {
                        buyer_id: buyer.buyer_id,
                        first_row,
                        row: row.line(),
                    });
                }
                DuplicatePolicy::LastWins => {
                    let diag = Diagnostic {
                        table: table.name().to_string(),
                        row: row.line(),
                        kind: DiagnosticKind::DuplicateKey,
                        message: format!(
                            "buyer '{}' repeated; replaces row {first_row}",
                            buyer.buyer_id
                        ),
                    };
                    tracing::warn!(table = table.name(), row = diag.row, "{}", diag.message);
                    out.diagnostics.push(diag);
                    seen.insert(buyer.buyer_id.clone(), (pos, row.line()));
                    out.buyers[pos] = buyer;
                }
            },
        }
    }

    Ok(out)
}

fn buyer_row(idx: &BuyerIndex, row: &RawRow<'_>) -> Result<BuyerPreference, CellError> {
    let preferred_finish = cells::text(row, idx.finish);
    let preferred_finish_translated = preferred_finish
        .as_deref()
        .map(|f| translate_finish(f).to_string());

    Ok(BuyerPreference {
        buyer_id: cells::required_text(row, idx.buyer_id, "buyer_id")?,
        preferred_grade: cells::required_text(row, idx.grade, "preferred_grade")?,
        preferred_finish,
        preferred_finish_translated,
        preferred_thickness_mm: cells::float(row, idx.thickness, "preferred_thickness")?,
        preferred_width_mm: cells::float(row, idx.width, "preferred_width")?,
        max_weight_kg: cells::float(row, idx.max_weight, "max_weight")?,
        min_quantity: cells::int(row, idx.min_quantity, "min_quantity")?,
    })
}
