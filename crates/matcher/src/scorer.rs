//! Match scoring.
//!
//! | Criterion | Condition                          | Points |
//! |-----------|------------------------------------|--------|
//! | Grade     | exact equality                     | 100    |
//! | Finish    | exact equality                     | 50     |
//! | Thickness | diff < 0.5 mm / < 1.0 mm           | 50 / 25|
//! | Width     | diff < 10 mm / < 20 mm             | 30 / 15|
//!
//! A supplier dimension that is missing counts as [`MISSING_DIMENSION_MM`],
//! not as unknown. Items without dimensions therefore land in the widest
//! difference bucket for any realistic preference.

use serde::Serialize;

use crate::config::FinishVocabulary;
use crate::model::{BuyerPreference, MatchCandidate, SupplierItem};

pub const GRADE_POINTS: u32 = 100;
pub const FINISH_POINTS: u32 = 50;
pub const MAX_SCORE: u32 = 230;

/// Value substituted for a supplier thickness or width that was not given.
pub const MISSING_DIMENSION_MM: f64 = 0.0;

/// (strict upper bound on |diff|, points), tightest band first.
const THICKNESS_BANDS: [(f64, u32); 2] = [(0.5, 50), (1.0, 25)];
const WIDTH_BANDS: [(f64, u32); 2] = [(10.0, 30), (20.0, 15)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub grade: u32,
    pub finish: u32,
    pub thickness: u32,
    pub width: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.grade + self.finish + self.thickness + self.width
    }
}

/// Every per-criterion observation for one pair. Score and reason are both
/// derived from this, so they can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairEvaluation {
    pub grade_match: bool,
    pub finish_match: bool,
    /// `None` only when the buyer gave no preferred thickness.
    pub thickness_diff_mm: Option<f64>,
    pub width_diff_mm: Option<f64>,
    pub breakdown: ScoreBreakdown,
}

impl PairEvaluation {
    pub fn score(&self) -> u32 {
        self.breakdown.total()
    }

    pub fn reason(&self) -> String {
        format!(
            "Grade match: {}, Finish match: {}, Thickness diff: {}, Width diff: {}",
            yes_no(self.grade_match),
            yes_no(self.finish_match),
            format_diff(self.thickness_diff_mm),
            format_diff(self.width_diff_mm),
        )
    }
}

pub fn evaluate(
    buyer: &BuyerPreference,
    item: &SupplierItem,
    vocabulary: FinishVocabulary,
) -> PairEvaluation {
    let grade_match = item.grade == buyer.preferred_grade;
    let finish_match = match (item.finish.as_deref(), buyer.finish_for(vocabulary)) {
        (Some(f), Some(p)) => f == p,
        _ => false,
    };
    let thickness_diff_mm = dimension_diff(buyer.preferred_thickness_mm, item.thickness_mm);
    let width_diff_mm = dimension_diff(buyer.preferred_width_mm, item.width_mm);

    PairEvaluation {
        grade_match,
        finish_match,
        thickness_diff_mm,
        width_diff_mm,
        breakdown: ScoreBreakdown {
            grade: if grade_match { GRADE_POINTS } else { 0 },
            finish: if finish_match { FINISH_POINTS } else { 0 },
            thickness: band_points(thickness_diff_mm, &THICKNESS_BANDS),
            width: band_points(width_diff_mm, &WIDTH_BANDS),
        },
    }
}

/// Score an eligible pair into a candidate.
pub fn score_candidate<'a>(
    buyer: &'a BuyerPreference,
    item: &'a SupplierItem,
    vocabulary: FinishVocabulary,
) -> MatchCandidate<'a> {
    let eval = evaluate(buyer, item, vocabulary);
    MatchCandidate {
        buyer,
        item,
        breakdown: eval.breakdown,
        match_score: eval.score(),
        match_reason: eval.reason(),
    }
}

fn dimension_diff(preferred: Option<f64>, actual: Option<f64>) -> Option<f64> {
    preferred.map(|p| (actual.unwrap_or(MISSING_DIMENSION_MM) - p).abs())
}

fn band_points(diff: Option<f64>, bands: &[(f64, u32)]) -> u32 {
    let Some(diff) = diff else { return 0 };
    bands
        .iter()
        .find(|(below, _)| diff < *below)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

/// Round to 2 decimals; always show at least one decimal digit.
fn format_diff(diff: Option<f64>) -> String {
    match diff {
        None => "n/a".to_string(),
        Some(d) => {
            let rounded = (d * 100.0).round() / 100.0;
            if rounded.fract() == 0.0 {
                format!("{rounded:.1} mm")
            } else {
                format!("{rounded} mm")
            }
        }
    }
}
