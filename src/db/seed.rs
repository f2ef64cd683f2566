//! Boot-time seeding of default settings and the area multiplier table.

use crate::domain::multiplier::default_pairs;
use crate::domain::settings::SETTINGS_KEYS;
use crate::domain::ScoringSettings;
use tracing::info;

use super::Repository;

/// Counts of rows added by [`seed_defaults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub settings: usize,
    pub multipliers: usize,
}

/// Store the default settings sections and multiplier pairs that are missing.
///
/// Existing rows are never overwritten, so operator edits survive restarts.
pub async fn seed_defaults(repo: &Repository) -> Result<SeedReport, sqlx::Error> {
    let defaults = ScoringSettings::default();
    let sections: Vec<(&str, serde_json::Value)> = SETTINGS_KEYS
        .iter()
        .filter_map(|key| defaults.section_value(key).map(|v| (*key, v)))
        .collect();

    let report = SeedReport {
        settings: repo.insert_missing_settings(&sections).await?,
        multipliers: repo.insert_missing_multipliers(&default_pairs()).await?,
    };

    info!(
        settings = report.settings,
        multipliers = report.multipliers,
        "Seeded default scoring data"
    );
    Ok(report)
}
