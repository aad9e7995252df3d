use std::collections::HashMap;

use serde::Serialize;

use crate::config::{FinishVocabulary, MatchConfig};
use crate::error::MatchError;
use crate::filter::{check_eligibility, Rejection};
use crate::model::{BuyerPreference, MatchResult, RunMeta, SupplierItem};
use crate::normalize::{normalize_preferences, normalize_suppliers};
use crate::ranker::rank_top_k;
use crate::scorer::{evaluate, score_candidate, PairEvaluation};
use crate::summary::{buyers_without_candidates, RejectionCounts, RunSummary};
use crate::table::RawTable;

/// Pre-loaded tables for one run.
#[derive(Debug, Clone)]
pub struct MatchInput {
    /// Supplier tables keyed by source tag.
    pub suppliers: HashMap<String, RawTable>,
    pub buyers: RawTable,
}

/// Run the matching pipeline per config: normalize, filter, score, rank.
pub fn run(config: &MatchConfig, input: &MatchInput) -> Result<MatchResult, MatchError> {
    let mut sources = Vec::with_capacity(config.suppliers.len());
    for supplier in &config.suppliers {
        let table = input
            .suppliers
            .get(&supplier.source)
            .ok_or_else(|| MatchError::UnknownSource(supplier.source.clone()))?;
        sources.push((supplier, table));
    }

    if input.buyers.is_empty() {
        return Err(MatchError::EmptyDataset(input.buyers.name().to_string()));
    }
    if sources.iter().all(|(_, t)| t.is_empty()) {
        let names: Vec<_> = sources.iter().map(|(_, t)| t.name()).collect();
        return Err(MatchError::EmptyDataset(names.join(", ")));
    }

    let suppliers = normalize_suppliers(&sources)?;
    let buyers = normalize_preferences(&config.buyers, &input.buyers)?;
    tracing::debug!(
        items = suppliers.items.len(),
        buyers = buyers.buyers.len(),
        "inputs normalized"
    );

    let vocabulary = config.matching.finish_vocabulary;
    let mut rejected = RejectionCounts::default();
    let mut candidates = Vec::new();
    let mut pairs_evaluated = 0;

    for buyer in &buyers.buyers {
        for item in &suppliers.items {
            pairs_evaluated += 1;
            match check_eligibility(buyer, item, vocabulary) {
                Ok(()) => candidates.push(score_candidate(buyer, item, vocabulary)),
                Err(rejection) => rejected.record(rejection),
            }
        }
    }
    let eligible_pairs = candidates.len();
    tracing::debug!(pairs_evaluated, eligible_pairs, "candidates filtered and scored");

    let recommendations = rank_top_k(candidates, config.matching.top_k);

    let mut diagnostics = suppliers.diagnostics;
    diagnostics.extend(buyers.diagnostics);

    let summary = RunSummary {
        sources: suppliers.sources,
        supplier_items: suppliers.items.len(),
        buyers: buyers.buyers.len(),
        buyers_without_candidates: buyers_without_candidates(
            buyers.buyers.iter().map(|b| b.buyer_id.as_str()),
            &recommendations,
        ),
        pairs_evaluated,
        eligible_pairs,
        rejected,
        recommendations: recommendations.len(),
        diagnostics: diagnostics.len(),
    };

    tracing::info!(
        config = %config.name,
        supplier_items = summary.supplier_items,
        buyers = summary.buyers,
        eligible_pairs = summary.eligible_pairs,
        recommendations = summary.recommendations,
        diagnostics = summary.diagnostics,
        "matching run complete"
    );

    Ok(MatchResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            top_k: config.matching.top_k,
            finish_vocabulary: vocabulary,
        },
        summary,
        recommendations,
        diagnostics,
        items: suppliers.items,
    })
}

/// Outcome of evaluating a single pair outside a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    /// First predicate the pair failed, if any.
    pub rejection: Option<Rejection>,
    pub evaluation: PairEvaluation,
}

impl PairReport {
    pub fn is_eligible(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Evaluate one (buyer, item) pair. The score is computed even for an
/// ineligible pair so the breakdown can be inspected.
pub fn explain_pair(
    buyer: &BuyerPreference,
    item: &SupplierItem,
    vocabulary: FinishVocabulary,
) -> PairReport {
    PairReport {
        rejection: check_eligibility(buyer, item, vocabulary).err(),
        evaluation: evaluate(buyer, item, vocabulary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name = "engine-test"

[[suppliers]]
source = "supplier_1"
layout = "dimensional"
file = "s1.csv"

[[suppliers]]
source = "supplier_2"
layout = "described"
file = "s2.csv"

[buyers]
file = "buyers.csv"
"#;

    const S1: &str = "Quality/Choice,Grade,Finish,Thickness (mm),Width (mm),Description,Gross weight (kg),Quantity\n";
    const S2: &str = "Material,Description,Weight (kg),Quantity,Reserved\n";
    const BUYERS: &str = "Buyer ID,Preferred Grade,Preferred Finish,Preferred Thickness (mm),Preferred Width (mm),Max Weight (kg),Min Quantity\n";

    fn table(name: &str, header: &str, body: &str) -> RawTable {
        RawTable::from_delimited(name, &format!("{header}{body}"), b',').unwrap()
    }

    fn input(s1: &str, s2: &str, buyers: &str) -> MatchInput {
        let mut suppliers = HashMap::new();
        suppliers.insert("supplier_1".to_string(), table("supplier_1", S1, s1));
        suppliers.insert("supplier_2".to_string(), table("supplier_2", S2, s2));
        MatchInput {
            suppliers,
            buyers: table("buyer_preferences", BUYERS, buyers),
        }
    }

    fn config() -> MatchConfig {
        MatchConfig::from_toml(CONFIG).unwrap()
    }

    #[test]
    fn perfect_match() {
        let input = input(
            "3rd,A36,pickled,2.0,1000,Coil,3000,50\n",
            "",
            "B001,A36,pickled,2.0,1000,5000,10\n",
        );
        let result = run(&config(), &input).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        let top = &result.recommendations[0];
        assert_eq!(top.match_score, 230);
        assert_eq!(
            top.recommendation.match_reason,
            "Grade match: Yes, Finish match: Yes, Thickness diff: 0.0 mm, Width diff: 0.0 mm"
        );
        assert_eq!(result.meta.top_k, 5);
        assert_eq!(result.meta.config_name, "engine-test");
    }

    #[test]
    fn described_items_score_without_dimensions() {
        let input = input(
            "",
            "A36,Material is Pickled,3000,50,NO\n",
            "B001,A36,pickled,2.0,1000,5000,10\n",
        );
        let result = run(&config(), &input).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        let top = &result.recommendations[0];
        assert_eq!(top.match_score, 150);
        assert_eq!(top.recommendation.supplier_source, "supplier_2");
        assert_eq!(top.recommendation.thickness_mm, None);
    }

    #[test]
    fn quantity_floor_excludes() {
        let input = input(
            "3rd,A36,pickled,2.0,1000,Coil,3000,50\n",
            "",
            "B001,A36,pickled,2.0,1000,5000,100\n",
        );
        let result = run(&config(), &input).unwrap();
        assert!(result.recommendations.is_empty());
        assert_eq!(result.summary.rejected.quantity, 1);
        assert_eq!(result.summary.buyers_without_candidates, vec!["B001".to_string()]);
    }

    #[test]
    fn no_matching_items_is_not_an_error() {
        let input = input(
            "3rd,S355,pickled,2.0,1000,Coil,3000,50\n",
            "",
            "B001,A36,pickled,2.0,1000,5000,10\n",
        );
        let result = run(&config(), &input).unwrap();
        assert!(result.recommendations.is_empty());
        assert_eq!(result.summary.pairs_evaluated, 1);
        assert_eq!(result.summary.rejected.grade, 1);
    }

    #[test]
    fn top_k_from_config() {
        let mut cfg = config();
        cfg.matching.top_k = 2;
        let body = "3rd,A36,pickled,2.0,1000,Coil,1000,50\n".repeat(4);
        let input = input(&body, "", "B001,A36,pickled,2.0,1000,5000,10\n");
        let result = run(&cfg, &input).unwrap();
        assert_eq!(result.recommendations.len(), 2);
        let ordinals: Vec<_> = result.recommendations.iter().map(|r| r.item_ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);
    }

    #[test]
    fn missing_source_table() {
        let mut input = input("", "", "B001,A36,pickled,2.0,1000,,\n");
        input.suppliers.remove("supplier_2");
        let err = run(&config(), &input).unwrap_err();
        assert!(matches!(err, MatchError::UnknownSource(ref s) if s == "supplier_2"));
    }

    #[test]
    fn empty_buyers_is_systemic() {
        let input = input("3rd,A36,pickled,2.0,1000,Coil,3000,50\n", "", "");
        let err = run(&config(), &input).unwrap_err();
        assert!(matches!(err, MatchError::EmptyDataset(ref t) if t == "buyer_preferences"));
    }

    #[test]
    fn all_suppliers_empty_is_systemic() {
        let input = input("", "", "B001,A36,pickled,2.0,1000,,\n");
        let err = run(&config(), &input).unwrap_err();
        assert!(matches!(err, MatchError::EmptyDataset(_)));
    }

    #[test]
    fn diagnostics_collected_from_both_sides() {
        let input = input(
            "3rd,,pickled,2.0,1000,Coil,3000,50\n3rd,A36,pickled,2.0,1000,Coil,3000,50\n",
            "",
            "B001,A36,pickled,2.0,1000,heavy,10\nB002,A36,pickled,2.0,1000,,\n",
        );
        let result = run(&config(), &input).unwrap();
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.diagnostics[0].table, "supplier_1");
        assert_eq!(result.diagnostics[1].table, "buyer_preferences");
        assert_eq!(result.summary.diagnostics, 2);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn explain_reports_rejection_and_score() {
        let buyer = BuyerPreference {
            buyer_id: "B001".into(),
            preferred_grade: "A36".into(),
            preferred_finish: Some("pickled".into()),
            preferred_finish_translated: Some("pickled".into()),
            preferred_thickness_mm: Some(2.0),
            preferred_width_mm: Some(1000.0),
            max_weight_kg: Some(1000.0),
            min_quantity: None,
        };
        let item = SupplierItem {
            ordinal: 0,
            source: "cli".into(),
            quality: "NA".into(),
            grade: "A36".into(),
            finish: Some("pickled".into()),
            thickness_mm: Some(2.0),
            width_mm: Some(1000.0),
            description: String::new(),
            weight_kg: 3000.0,
            quantity: 5,
        };
        let report = explain_pair(&buyer, &item, FinishVocabulary::Original);
        assert!(!report.is_eligible());
        assert_eq!(report.rejection, Some(Rejection::Weight));
        assert_eq!(report.evaluation.score(), 230);
    }
}
