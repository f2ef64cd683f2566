//! Pure scoring engine: scores, tiers and ranks.
//!
//! Everything here is synchronous and side-effect free. Callers hand in a
//! consistent snapshot of records, fans, settings and multipliers; the engine
//! never reads or writes storage.

use crate::domain::{Area, EventType, Fan, FanId};
use chrono::NaiveDate;
use serde::Serialize;

pub mod diminishing;
pub mod distance;
pub mod money;
pub mod rank;
pub mod score;
pub mod tier;

pub use diminishing::DiminishingReturnsTracker;
pub use distance::resolve_distance_multiplier;
pub use rank::{assign_ranks, rank_results, sort_by_total_desc};
pub use score::calculate;
pub use tier::{calculate_tier_progress, determine_tier, get_next_tier, TierLadder, TierStanding};

/// How a single record contributed to a fan's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScoreDetail {
    pub record_id: String,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub action_point: f64,
    pub merch_point: f64,
    pub donation_point: f64,
    pub distance_multiplier: f64,
    pub diminish_multiplier: f64,
    /// Part of `action_point + merch_point` owed to the distance multiplier.
    pub travel_delta: f64,
}

/// Decomposed score for one fan over one batch of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanScoreResult {
    pub fan_id: FanId,
    pub display_name: String,
    pub residence_area: Area,
    pub action_score: f64,
    pub money_score: f64,
    pub travel_contribution: f64,
    /// Always `action_score + money_score`.
    pub total_score: f64,
    #[serde(rename = "perEventDetail")]
    pub details: Vec<EventScoreDetail>,
}

impl FanScoreResult {
    pub fn new(
        fan: &Fan,
        action_score: f64,
        money_score: f64,
        travel_contribution: f64,
        details: Vec<EventScoreDetail>,
    ) -> Self {
        Self {
            fan_id: fan.id.clone(),
            display_name: fan.display_name.clone(),
            residence_area: fan.residence_area,
            action_score,
            money_score,
            travel_contribution,
            total_score: action_score + money_score,
            details,
        }
    }
}

/// A scored fan with its competition rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub rank: u32,
    #[serde(flatten)]
    pub result: FanScoreResult,
}
