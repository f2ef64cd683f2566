//! Ranking and tier map reports.

use crate::domain::{Decimal, FanId, TierSummary};
use crate::engine::{calculate, rank_results, FanScoreResult, RankedResult, TierLadder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::{MonthWindow, ScoringSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingScope {
    Monthly(MonthWindow),
    Cumulative,
}

/// One ranking row: the ranked score plus all-time tier context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    #[serde(flatten)]
    pub ranked: RankedResult,
    pub cumulative_total_score: f64,
    /// Merch plus donation spend over the records in scope.
    pub sales_amount: Decimal,
    pub tier: Option<TierSummary>,
}

/// Rank every fan with records in scope.
///
/// Tiers always come from the all-time score, so a fan's tier does not
/// change between the monthly and cumulative views.
pub fn build_ranking(snapshot: &ScoringSnapshot, scope: RankingScope) -> Vec<RankingEntry> {
    let settings = &snapshot.settings;
    let table = &snapshot.multipliers;

    let (in_scope, scores, cumulative) = match scope {
        RankingScope::Cumulative => {
            let scores = calculate(&snapshot.records, &snapshot.fans, settings, table);
            let cumulative = totals_by_fan(&scores);
            (snapshot.records.clone(), scores, cumulative)
        }
        RankingScope::Monthly(window) => {
            let records = snapshot.records_in(&window);
            let scores = calculate(&records, &snapshot.fans, settings, table);
            let all_time = calculate(&snapshot.records, &snapshot.fans, settings, table);
            (records, scores, totals_by_fan(&all_time))
        }
    };

    let mut sales: HashMap<&FanId, Decimal> = HashMap::new();
    for record in &in_scope {
        let total = sales.entry(&record.fan_id).or_insert_with(Decimal::zero);
        *total = *total + record.sales_amount();
    }

    let ladder = TierLadder::new(&snapshot.tiers);
    rank_results(scores)
        .into_iter()
        .map(|ranked| {
            let cumulative_total_score = cumulative
                .get(&ranked.result.fan_id)
                .copied()
                .unwrap_or(0.0);
            let sales_amount = sales
                .get(&ranked.result.fan_id)
                .copied()
                .unwrap_or_default();
            let tier = ladder
                .determine(cumulative_total_score)
                .map(TierSummary::from);
            RankingEntry {
                ranked,
                cumulative_total_score,
                sales_amount,
                tier,
            }
        })
        .collect()
}

/// All-time tier of every fan with at least one record.
pub fn build_fan_tiers(snapshot: &ScoringSnapshot) -> BTreeMap<FanId, Option<TierSummary>> {
    let scores = calculate(
        &snapshot.records,
        &snapshot.fans,
        &snapshot.settings,
        &snapshot.multipliers,
    );
    let ladder = TierLadder::new(&snapshot.tiers);
    scores
        .into_iter()
        .map(|s| {
            let tier = ladder.determine(s.total_score).map(TierSummary::from);
            (s.fan_id, tier)
        })
        .collect()
}

fn totals_by_fan(scores: &[FanScoreResult]) -> HashMap<FanId, f64> {
    scores
        .iter()
        .map(|s| (s.fan_id.clone(), s.total_score))
        .collect()
}
