use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{MatchCandidate, RankedRecommendation, Recommendation};

pub const DEFAULT_TOP_K: usize = 5;

/// Order used inside one buyer's group: score descending, then supplier
/// source ascending, then the item's ordinal ascending.
pub fn candidate_order(a: &MatchCandidate<'_>, b: &MatchCandidate<'_>) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| a.item.source.cmp(&b.item.source))
        .then_with(|| a.item.ordinal.cmp(&b.item.ordinal))
}

/// Partition candidates by buyer, order each partition, keep the first `k`.
///
/// Buyer groups come out in ascending `buyer_id` order. The input order of
/// `candidates` has no effect on the output.
pub fn rank_top_k<'a, I>(candidates: I, k: usize) -> Vec<RankedRecommendation>
where
    I: IntoIterator<Item = MatchCandidate<'a>>,
{
    let mut partitions: BTreeMap<&'a str, Vec<MatchCandidate<'a>>> = BTreeMap::new();
    for c in candidates {
        partitions.entry(c.buyer.buyer_id.as_str()).or_default().push(c);
    }

    let mut ranked = Vec::new();
    for (_, mut group) in partitions {
        group.sort_by(candidate_order);
        group.truncate(k);
        ranked.extend(
            group
                .into_iter()
                .enumerate()
                .map(|(i, c)| to_ranked(i + 1, c)),
        );
    }
    ranked
}

fn to_ranked(rank: usize, c: MatchCandidate<'_>) -> RankedRecommendation {
    RankedRecommendation {
        rank,
        match_score: c.match_score,
        item_ordinal: c.item.ordinal,
        recommendation: Recommendation {
            buyer_id: c.buyer.buyer_id.clone(),
            supplier_source: c.item.source.clone(),
            grade: c.item.grade.clone(),
            finish: c.item.finish.clone(),
            thickness_mm: c.item.thickness_mm,
            width_mm: c.item.width_mm,
            weight_kg: c.item.weight_kg,
            quantity: c.item.quantity,
            match_reason: c.match_reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuyerPreference, SupplierItem};
    use crate::scorer::ScoreBreakdown;

    fn buyer(id: &str) -> BuyerPreference {
        BuyerPreference {
            buyer_id: id.into(),
            preferred_grade: "A36".into(),
            preferred_finish: None,
            preferred_finish_translated: None,
            preferred_thickness_mm: None,
            preferred_width_mm: None,
            max_weight_kg: None,
            min_quantity: None,
        }
    }

    fn item(ordinal: usize, source: &str) -> SupplierItem {
        SupplierItem {
            ordinal,
            source: source.into(),
            quality: "NA".into(),
            grade: "A36".into(),
            finish: None,
            thickness_mm: None,
            width_mm: None,
            description: String::new(),
            weight_kg: 1000.0,
            quantity: 1,
        }
    }

    fn cand<'a>(b: &'a BuyerPreference, i: &'a SupplierItem, score: u32) -> MatchCandidate<'a> {
        MatchCandidate {
            buyer: b,
            item: i,
            breakdown: ScoreBreakdown::default(),
            match_score: score,
            match_reason: format!("score {score}"),
        }
    }

    #[test]
    fn truncates_to_k_per_buyer() {
        let b = buyer("B001");
        let items: Vec<_> = (0..8).map(|n| item(n, "supplier_1")).collect();
        let cands = items.iter().enumerate().map(|(n, i)| cand(&b, i, n as u32 * 10));
        let ranked = rank_top_k(cands, 5);
        assert_eq!(ranked.len(), 5);
        let scores: Vec<_> = ranked.iter().map(|r| r.match_score).collect();
        assert_eq!(scores, vec![70, 60, 50, 40, 30]);
        let ranks: Vec<_> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn fewer_than_k_kept_whole() {
        let b = buyer("B001");
        let i = item(0, "supplier_1");
        let ranked = rank_top_k(vec![cand(&b, &i, 100)], 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].recommendation.match_reason, "score 100");
    }

    #[test]
    fn ties_break_on_source_then_ordinal() {
        let b = buyer("B001");
        let i0 = item(0, "supplier_2");
        let i1 = item(1, "supplier_1");
        let i2 = item(2, "supplier_1");
        let i3 = item(3, "supplier_1");
        let cands = vec![
            cand(&b, &i0, 150),
            cand(&b, &i3, 150),
            cand(&b, &i2, 150),
            cand(&b, &i1, 200),
        ];
        let ranked = rank_top_k(cands, 5);
        let ordinals: Vec<_> = ranked.iter().map(|r| r.item_ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 0]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let b = buyer("B001");
        let items: Vec<_> = (0..6).map(|n| item(n, if n % 2 == 0 { "a" } else { "b" })).collect();
        let forward: Vec<_> = items.iter().map(|i| cand(&b, i, 50)).collect();
        let backward: Vec<_> = items.iter().rev().map(|i| cand(&b, i, 50)).collect();
        assert_eq!(rank_top_k(forward, 5), rank_top_k(backward, 5));
    }

    #[test]
    fn groups_ordered_by_buyer_id() {
        let b2 = buyer("B002");
        let b1 = buyer("B001");
        let i = item(0, "supplier_1");
        let ranked = rank_top_k(vec![cand(&b2, &i, 10), cand(&b1, &i, 10)], 5);
        let ids: Vec<_> = ranked.iter().map(|r| r.recommendation.buyer_id.as_str()).collect();
        assert_eq!(ids, vec!["B001", "B002"]);
        assert!(ranked.iter().all(|r| r.rank == 1));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let ranked = rank_top_k(Vec::<MatchCandidate<'_>>::new(), 5);
        assert!(ranked.is_empty());
    }
}
