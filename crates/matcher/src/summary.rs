use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::Rejection;
use crate::model::RankedRecommendation;
use crate::normalize::suppliers::SourceSummary;

/// Per-predicate rejection counts. A pair is counted under the first
/// predicate it failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub grade: usize,
    pub finish: usize,
    pub weight: usize,
    pub quantity: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Grade => self.grade += 1,
            Rejection::Finish => self.finish += 1,
            Rejection::Weight => self.weight += 1,
            Rejection::Quantity => self.quantity += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.grade + self.finish + self.weight + self.quantity
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub sources: Vec<SourceSummary>,
    pub supplier_items: usize,
    pub buyers: usize,
    /// Buyers left with zero recommendations, in ascending id order.
    pub buyers_without_candidates: Vec<String>,
    pub pairs_evaluated: usize,
    pub eligible_pairs: usize,
    pub rejected: RejectionCounts,
    pub recommendations: usize,
    pub diagnostics: usize,
}

/// Buyers from `buyer_ids` that have no row in `ranked`, sorted.
pub fn buyers_without_candidates<'a>(
    buyer_ids: impl IntoIterator<Item = &'a str>,
    ranked: &[RankedRecommendation],
) -> Vec<String> {
    let served: BTreeSet<&str> = ranked
        .iter()
        .map(|r| r.recommendation.buyer_id.as_str())
        .collect();
    let unserved: BTreeSet<&str> = buyer_ids
        .into_iter()
        .filter(|id| !served.contains(id))
        .collect();
    unserved.into_iter().map(String::from).collect()
}
