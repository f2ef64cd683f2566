//! Per-fan score report: all-time and monthly breakdowns, tier standing, stats.

use crate::domain::{
    AreaMultiplierTable, Decimal, EventRecord, EventType, Fan, ScoringSettings, TierDefinition,
};
use crate::engine::{calculate, FanScoreResult, TierLadder};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::MonthWindow;

/// Score components without per-event detail.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total_score: f64,
    pub action_score: f64,
    pub money_score: f64,
    pub travel_contribution: f64,
}

impl From<&FanScoreResult> for ScoreBreakdown {
    fn from(result: &FanScoreResult) -> Self {
        Self {
            total_score: result.total_score,
            action_score: result.action_score,
            money_score: result.money_score,
            travel_contribution: result.travel_contribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyScore {
    /// `YYYY-MM`.
    pub month: String,
    #[serde(flatten)]
    pub score: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanStats {
    pub total_events: usize,
    pub total_merch_spent: Decimal,
    pub total_donation_spent: Decimal,
    pub first_event_date: Option<NaiveDate>,
    pub last_event_date: Option<NaiveDate>,
    pub event_type_breakdown: BTreeMap<EventType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanScoreReport {
    pub fan: Fan,
    pub cumulative_score: ScoreBreakdown,
    pub current_month_score: ScoreBreakdown,
    pub current_tier: Option<TierDefinition>,
    pub next_tier: Option<TierDefinition>,
    pub tier_progress: f64,
    pub monthly_history: Vec<MonthlyScore>,
    /// Newest first.
    pub recent_logs: Vec<EventRecord>,
    pub stats: FanStats,
}

/// Reporting horizon for [`build_fan_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanScoreWindow {
    pub today: NaiveDate,
    pub history_months: usize,
    pub recent_logs_limit: usize,
}

/// Build the score report for one fan from that fan's records in
/// chronological order.
///
/// Every month is scored with its own engine call, so diminishing returns
/// restart per month while the cumulative score decays across all history.
pub fn build_fan_score(
    fan: &Fan,
    records: &[EventRecord],
    settings: &ScoringSettings,
    table: &AreaMultiplierTable,
    tiers: &[TierDefinition],
    window: FanScoreWindow,
) -> FanScoreReport {
    let score_of = |subset: &[EventRecord]| -> ScoreBreakdown {
        calculate(subset, std::slice::from_ref(fan), settings, table)
            .first()
            .map(ScoreBreakdown::from)
            .unwrap_or_default()
    };

    let in_month = |month: &MonthWindow| -> Vec<EventRecord> {
        records
            .iter()
            .filter(|r| month.contains(r.date))
            .cloned()
            .collect()
    };

    let cumulative_score = score_of(records);
    let this_month = MonthWindow::containing(window.today);
    let current_month_score = score_of(&in_month(&this_month));

    let standing = TierLadder::new(tiers).standing(cumulative_score.total_score);

    let monthly_history = this_month
        .trailing(window.history_months)
        .iter()
        .map(|month| {
            let subset = in_month(month);
            MonthlyScore {
                month: month.label(),
                score: if subset.is_empty() {
                    ScoreBreakdown::default()
                } else {
                    score_of(&subset)
                },
            }
        })
        .collect();

    let recent_logs = records
        .iter()
        .rev()
        .take(window.recent_logs_limit)
        .cloned()
        .collect();

    FanScoreReport {
        fan: fan.clone(),
        cumulative_score,
        current_month_score,
        current_tier: standing.current.cloned(),
        next_tier: standing.next.cloned(),
        tier_progress: standing.progress,
        monthly_history,
        recent_logs,
        stats: fan_stats(records),
    }
}

fn fan_stats(records: &[EventRecord]) -> FanStats {
    let mut event_type_breakdown = BTreeMap::new();
    for record in records {
        *event_type_breakdown.entry(record.event_type).or_insert(0) += 1;
    }
    FanStats {
        total_events: records.len(),
        total_merch_spent: records.iter().map(|r| r.merch_amount).sum(),
        total_donation_spent: records.iter().map(|r| r.donation_amount).sum(),
        first_event_date: records.iter().map(|r| r.date).min(),
        last_event_date: records.iter().map(|r| r.date).max(),
        event_type_breakdown,
    }
}
