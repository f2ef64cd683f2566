use crate::domain::{
    sort_records_chronological, AreaMultiplierTable, EventRecord, Fan, FanId, ScoringSettings,
};
use std::collections::HashMap;

use super::diminishing::DiminishingReturnsTracker;
use super::distance::resolve_distance_multiplier;
use super::money;
use super::{EventScoreDetail, FanScoreResult};

/// Score a batch of records into one decomposed result per fan.
///
/// Results follow the order in which each fan first appears in `records`.
/// Each fan's records are processed oldest first; diminishing returns restart
/// on every call, so the batch passed in defines the decay window.
/// Records for fans missing from `fans` are skipped.
pub fn calculate(
    records: &[EventRecord],
    fans: &[Fan],
    settings: &ScoringSettings,
    table: &AreaMultiplierTable,
) -> Vec<FanScoreResult> {
    let fans_by_id: HashMap<&FanId, &Fan> = fans.iter().map(|f| (&f.id, f)).collect();

    let mut groups: Vec<(&FanId, Vec<&EventRecord>)> = Vec::new();
    let mut group_index: HashMap<&FanId, usize> = HashMap::new();
    for record in records {
        let idx = *group_index.entry(&record.fan_id).or_insert_with(|| {
            groups.push((&record.fan_id, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(record);
    }

    let mut results = Vec::with_capacity(groups.len());
    for (fan_id, mut fan_records) in groups {
        let Some(fan) = fans_by_id.get(fan_id) else {
            tracing::debug!(
                fan_id = %fan_id,
                records = fan_records.len(),
                "Skipping records for unknown fan"
            );
            continue;
        };

        sort_records_chronological(&mut fan_records);
        results.push(score_fan(fan, &fan_records, settings, table));
    }

    results
}

fn score_fan(
    fan: &Fan,
    records: &[&EventRecord],
    settings: &ScoringSettings,
    table: &AreaMultiplierTable,
) -> FanScoreResult {
    let mut tracker = DiminishingReturnsTracker::new();
    let mut action_score = 0.0;
    let mut money_score = 0.0;
    let mut travel_contribution = 0.0;
    let mut details = Vec::with_capacity(records.len());

    let coeff = &settings.money_coefficients;

    for record in records {
        let base_point = settings.base_points.get(record.event_type);
        let distance_multiplier =
            resolve_distance_multiplier(fan.residence_area, record.venue_area, table);
        let diminish_multiplier =
            tracker.next_multiplier(&settings.diminishing_returns, record.event_type);

        let attend = record.attend_count as f64;
        let action_point = attend * base_point * distance_multiplier * diminish_multiplier;

        let merch = money::transform(record.merch_amount.to_f64(), settings.money_mode);
        let merch_point = merch * coeff.merch_coeff * distance_multiplier;

        // Donations are channel-agnostic: no travel multiplier.
        let donation = money::transform(record.donation_amount.to_f64(), settings.money_mode);
        let donation_point = donation * coeff.donation_coeff;

        let without_travel = attend * base_point * diminish_multiplier + merch * coeff.merch_coeff;
        let travel_delta = (action_point + merch_point) - without_travel;

        action_score += action_point;
        money_score += merch_point + donation_point;
        travel_contribution += travel_delta;

        details.push(EventScoreDetail {
            record_id: record.id.clone(),
            date: record.date,
            event_type: record.event_type,
            action_point,
            merch_point,
            donation_point,
            distance_multiplier,
            diminish_multiplier,
            travel_delta,
        });
    }

    FanScoreResult::new(fan, action_score, money_score, travel_contribution, details)
}
