//! Scoring settings storage. Each section is one JSON value under its key.

use crate::domain::settings::{
    KEY_DIMINISHING_RETURNS, KEY_MONEY_COEFF, KEY_MONEY_MODE, KEY_POINTS_BASE,
};
use crate::domain::ScoringSettings;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use tracing::warn;

use super::Repository;

impl Repository {
    /// Typed settings with defaults for every absent or undecodable section.
    pub async fn load_settings(&self) -> Result<ScoringSettings, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_settings(&mut *conn).await
    }

    /// Store one section's JSON value, replacing any previous value.
    pub async fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
            "#,
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store sections that are not already present. Returns how many were added.
    pub async fn insert_missing_settings(
        &self,
        sections: &[(&str, serde_json::Value)],
    ) -> Result<usize, sqlx::Error> {
        let mut inserted = 0;
        for (key, value) in sections {
            let result = sqlx::query(
                "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO NOTHING",
            )
            .bind(*key)
            .bind(value.to_string())
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        Ok(inserted)
    }
}

pub(super) async fn fetch_settings(conn: &mut SqliteConnection) -> Result<ScoringSettings, sqlx::Error> {
    let rows = sqlx::query("SELECT key, value FROM settings")
        .fetch_all(&mut *conn)
        .await?;

    let mut settings = ScoringSettings::default();
    for row in rows {
        let key: String = row.get("key");
        let raw: String = row.get("value");
        match key.as_str() {
            KEY_POINTS_BASE => decode_section(&key, &raw, &mut settings.base_points),
            KEY_MONEY_COEFF => decode_section(&key, &raw, &mut settings.money_coefficients),
            KEY_MONEY_MODE => decode_section(&key, &raw, &mut settings.money_mode),
            KEY_DIMINISHING_RETURNS => {
                decode_section(&key, &raw, &mut settings.diminishing_returns)
            }
            _ => {}
        }
    }
    Ok(settings)
}

fn decode_section<T: DeserializeOwned>(key: &str, raw: &str, target: &mut T) {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => *target = value,
        Err(e) => warn!(key, value = %raw, error = %e, "Failed to decode setting, using default"),
    }
}
