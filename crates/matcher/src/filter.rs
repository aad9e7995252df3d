//! Candidate eligibility.
//!
//! A pair that fails any predicate is excluded outright. It is never scored.

use serde::Serialize;

use crate::config::FinishVocabulary;
use crate::model::{BuyerPreference, SupplierItem};

/// The first predicate a pair failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Grade,
    Finish,
    Weight,
    Quantity,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grade => write!(f, "grade"),
            Self::Finish => write!(f, "finish"),
            Self::Weight => write!(f, "weight"),
            Self::Quantity => write!(f, "quantity"),
        }
    }
}

/// Check every hard predicate for a (buyer, item) pair.
pub fn check_eligibility(
    buyer: &BuyerPreference,
    item: &SupplierItem,
    vocabulary: FinishVocabulary,
) -> Result<(), Rejection> {
    if !grade_compatible(&buyer.preferred_grade, &item.grade) {
        return Err(Rejection::Grade);
    }
    if !finish_compatible(buyer.finish_for(vocabulary), item.finish.as_deref()) {
        return Err(Rejection::Finish);
    }
    if let Some(max) = buyer.max_weight_kg {
        if item.weight_kg > max {
            return Err(Rejection::Weight);
        }
    }
    if let Some(min) = buyer.min_quantity {
        if item.quantity < min {
            return Err(Rejection::Quantity);
        }
    }
    Ok(())
}

pub fn is_eligible(
    buyer: &BuyerPreference,
    item: &SupplierItem,
    vocabulary: FinishVocabulary,
) -> bool {
    check_eligibility(buyer, item, vocabulary).is_ok()
}

/// Exact match, or the supplier grade contains the preferred grade.
fn grade_compatible(preferred: &str, grade: &str) -> bool {
    grade == preferred || grade.contains(preferred)
}

/// Exact match, substring match, or either side unset.
fn finish_compatible(preferred: Option<&str>, finish: Option<&str>) -> bool {
    match (preferred, finish) {
        (Some(p), Some(f)) => f == p || f.contains(p),
        _ => true,
    }
}
