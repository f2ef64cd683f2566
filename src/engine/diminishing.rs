use crate::domain::{DiminishingReturns, EventType};
use std::collections::HashMap;

/// Per-fan occurrence counter driving diminishing returns.
///
/// Counts are keyed by occurrence order within the batch being scored. A new
/// tracker starts every sequence at exponent 0, so each scoring call restarts
/// decay for the records it was given.
#[derive(Debug, Default)]
pub struct DiminishingReturnsTracker {
    seen: HashMap<EventType, u32>,
}

impl DiminishingReturnsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `event_type` and return its 1-based ordinal.
    ///
    /// Counts every type, whether or not decay applies to it.
    pub fn observe(&mut self, event_type: EventType) -> u32 {
        let count = self.seen.entry(event_type).or_insert(0);
        *count += 1;
        *count
    }

    /// Multiplier for the `occurrence`-th record of `event_type`: `rate^(n-1)`,
    /// or 1 when decay is disabled or does not cover this type.
    pub fn multiplier(config: &DiminishingReturns, event_type: EventType, occurrence: u32) -> f64 {
        if !config.applies(event_type) {
            return 1.0;
        }
        let exponent = occurrence.saturating_sub(1);
        config.rate.powf(f64::from(exponent))
    }

    /// Observe and return the multiplier in one step.
    pub fn next_multiplier(&mut self, config: &DiminishingReturns, event_type: EventType) -> f64 {
        let n = self.observe(event_type);
        Self::multiplier(config, event_type, n)
    }
}
