//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `events.rs` - Participation log operations
//! - `settings.rs` - Scoring settings (key → JSON)
//! - `multipliers.rs` - Area multiplier table
//! - `tiers.rs` - Tiers and their benefits

mod events;
mod multipliers;
mod settings;
mod tiers;

pub use events::EventLogRow;

use crate::domain::{Area, Fan, FanId};
use crate::report::ScoringSnapshot;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;

const SELECT_FANS: &str = "SELECT id, display_name, residence_area, memo, created_at FROM fans";

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

/// Whether an error is a UNIQUE constraint violation (duplicate slug, area pair).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap round trip used by the readiness check.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Load everything a scoring report needs inside one read transaction,
    /// so writes committed meanwhile are either fully visible or not at all.
    ///
    /// # Errors
    /// Returns an error if any of the underlying queries fails.
    pub async fn load_snapshot(&self) -> Result<ScoringSnapshot, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let fans = fetch_fans(&mut *tx, None).await?;
        let records = events::fetch_records(&mut *tx).await?;
        let settings = settings::fetch_settings(&mut *tx).await?;
        let multipliers = multipliers::fetch_multipliers(&mut *tx).await?;
        let tiers = tiers::fetch_tiers(&mut *tx).await?;

        tx.commit().await?;

        Ok(ScoringSnapshot {
            fans,
            records,
            settings,
            multipliers: multipliers.iter().collect(),
            tiers,
        })
    }

    /// One fan plus the scoring inputs for their report, read in one
    /// transaction. `records` holds only this fan's records.
    ///
    /// Returns `None` when the fan does not exist.
    pub async fn load_fan_snapshot(
        &self,
        id: &FanId,
    ) -> Result<Option<(Fan, ScoringSnapshot)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(fan) = fetch_fan(&mut *tx, id).await? else {
            return Ok(None);
        };
        let records = events::fetch_records_for_fan(&mut *tx, id).await?;
        let settings = settings::fetch_settings(&mut *tx).await?;
        let multipliers = multipliers::fetch_multipliers(&mut *tx).await?;
        let tiers = tiers::fetch_tiers(&mut *tx).await?;

        tx.commit().await?;

        let snapshot = ScoringSnapshot {
            fans: vec![fan.clone()],
            records,
            settings,
            multipliers: multipliers.iter().collect(),
            tiers,
        };
        Ok(Some((fan, snapshot)))
    }

    // =========================================================================
    // Fan operations
    // =========================================================================

    /// List fans ordered by display name, optionally filtered by a
    /// case-insensitive substring of the name.
    pub async fn list_fans(&self, search: Option<&str>) -> Result<Vec<Fan>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_fans(&mut *conn, search).await
    }

    pub async fn get_fan(&self, id: &FanId) -> Result<Option<Fan>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_fan(&mut *conn, id).await
    }

    /// Insert a fan.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_fan(&self, fan: &Fan) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO fans (id, display_name, residence_area, memo) VALUES (?, ?, ?, ?)",
        )
        .bind(fan.id.as_str())
        .bind(&fan.display_name)
        .bind(fan.residence_area.as_str())
        .bind(fan.memo.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert fans in a single transaction. Nothing is written if any insert fails.
    pub async fn insert_fans(&self, fans: &[Fan]) -> Result<usize, sqlx::Error> {
        if fans.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for fan in fans {
            sqlx::query(
                "INSERT INTO fans (id, display_name, residence_area, memo) VALUES (?, ?, ?, ?)",
            )
            .bind(fan.id.as_str())
            .bind(&fan.display_name)
            .bind(fan.residence_area.as_str())
            .bind(fan.memo.as_deref())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(fans.len())
    }

    /// Replace a fan's fields. Returns false when no such fan exists.
    pub async fn update_fan(&self, fan: &Fan) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fans SET display_name = ?, residence_area = ?, memo = ? WHERE id = ?",
        )
        .bind(&fan.display_name)
        .bind(fan.residence_area.as_str())
        .bind(fan.memo.as_deref())
        .bind(fan.id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a fan and, through the foreign key, all of their logs.
    pub async fn delete_fan(&self, id: &FanId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fans WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn fetch_fans(
    conn: &mut SqliteConnection,
    search: Option<&str>,
) -> Result<Vec<Fan>, sqlx::Error> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let rows = sqlx::query(&format!(
        "{SELECT_FANS} \
         WHERE ?1 IS NULL OR instr(lower(display_name), lower(?1)) > 0 \
         ORDER BY display_name ASC, rowid ASC"
    ))
    .bind(search)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(fan_from_row).collect())
}

async fn fetch_fan(conn: &mut SqliteConnection, id: &FanId) -> Result<Option<Fan>, sqlx::Error> {
    let row = sqlx::query(&format!("{SELECT_FANS} WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(fan_from_row))
}

fn fan_from_row(row: &SqliteRow) -> Fan {
    let id: String = row.get("id");
    let area_str: String = row.get("residence_area");
    let residence_area = area_str.parse::<Area>().unwrap_or_else(|e| {
        warn!(fan_id = %id, area = %area_str, error = %e, "Failed to parse residence area, using OTHER");
        Area::Other
    });

    Fan {
        id: FanId::new(id),
        display_name: row.get("display_name"),
        residence_area,
        memo: row.get("memo"),
        created_at: row.get("created_at"),
    }
}
