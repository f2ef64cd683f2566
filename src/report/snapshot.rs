use crate::domain::{AreaMultiplierTable, EventRecord, Fan, ScoringSettings, TierDefinition};

use super::MonthWindow;

/// Everything one report needs, read at a single point in time.
///
/// Records are in `(date, insertion)` order.
#[derive(Debug, Clone, Default)]
pub struct ScoringSnapshot {
    pub fans: Vec<Fan>,
    pub records: Vec<EventRecord>,
    pub settings: ScoringSettings,
    pub multipliers: AreaMultiplierTable,
    pub tiers: Vec<TierDefinition>,
}

impl ScoringSnapshot {
    pub fn records_in(&self, window: &MonthWindow) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| window.contains(r.date))
            .cloned()
            .collect()
    }
}
