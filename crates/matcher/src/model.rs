use serde::Serialize;

use crate::config::FinishVocabulary;
use crate::scorer::ScoreBreakdown;
use crate::summary::RunSummary;

// ---------------------------------------------------------------------------
// Input records (unified)
// ---------------------------------------------------------------------------

/// A supplier stock line after its source's mapping function has run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierItem {
    /// Position in the unified sequence. Stable identity for tie-breaking.
    pub ordinal: usize,
    pub source: String,
    pub quality: String,
    pub grade: String,
    pub finish: Option<String>,
    pub thickness_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub description: String,
    pub weight_kg: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyerPreference {
    pub buyer_id: String,
    pub preferred_grade: String,
    pub preferred_finish: Option<String>,
    pub preferred_finish_translated: Option<String>,
    pub preferred_thickness_mm: Option<f64>,
    pub preferred_width_mm: Option<f64>,
    /// `None` means no weight ceiling.
    pub max_weight_kg: Option<f64>,
    /// `None` means no quantity floor.
    pub min_quantity: Option<i64>,
}

impl BuyerPreference {
    /// The finish to compare supplier finishes against.
    pub fn finish_for(&self, vocabulary: FinishVocabulary) -> Option<&str> {
        match vocabulary {
            FinishVocabulary::Original => self.preferred_finish.as_deref(),
            FinishVocabulary::Translated => self.preferred_finish_translated.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// An eligible (buyer, item) pair with its score. Lives only inside a run.
#[derive(Debug, Clone)]
pub struct MatchCandidate<'a> {
    pub buyer: &'a BuyerPreference,
    pub item: &'a SupplierItem,
    pub breakdown: ScoreBreakdown,
    pub match_score: u32,
    pub match_reason: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One row of the presented recommendation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub buyer_id: String,
    pub supplier_source: String,
    pub grade: String,
    pub finish: Option<String>,
    pub thickness_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub weight_kg: f64,
    pub quantity: i64,
    pub match_reason: String,
}

/// A recommendation plus the ranking data that selected it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecommendation {
    /// 1-based position within the buyer's group.
    pub rank: usize,
    pub match_score: u32,
    pub item_ordinal: usize,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required field was empty.
    MalformedRecord,
    /// A numeric field held text that is not a number.
    TypeCoercion,
    /// A buyer id was repeated and the later row kept.
    DuplicateKey,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord => write!(f, "malformed_record"),
            Self::TypeCoercion => write!(f, "type_coercion"),
            Self::DuplicateKey => write!(f, "duplicate_key"),
        }
    }
}

/// A per-record problem. The record is skipped; the run continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub table: String,
    /// Row number with the header as row 1.
    pub row: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub recommendations: Vec<RankedRecommendation>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub items: Vec<SupplierItem>,
}

impl MatchResult {
    /// Recommendation rows as presented, without ranking data.
    pub fn presented(&self) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter().map(|r| &r.recommendation)
    }

    /// Ranked rows for a single buyer, best first.
    pub fn for_buyer<'a>(&'a self, buyer_id: &'a str) -> impl Iterator<Item = &'a RankedRecommendation> {
        self.recommendations
            .iter()
            .filter(move |r| r.recommendation.buyer_id == buyer_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub top_k: usize,
    pub finish_vocabulary: FinishVocabulary,
}
