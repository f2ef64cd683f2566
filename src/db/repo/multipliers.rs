//! Area multiplier table operations for the repository.

use crate::domain::{Area, AreaMultiplier};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use tracing::warn;

use super::Repository;

impl Repository {
    /// All rows ordered by `(from_area, to_area)`.
    pub async fn list_multipliers(&self) -> Result<Vec<AreaMultiplier>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_multipliers(&mut *conn).await
    }

    pub async fn get_multiplier(&self, id: &str) -> Result<Option<AreaMultiplier>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, from_area, to_area, multiplier FROM area_multipliers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().and_then(multiplier_from_row))
    }

    /// Insert or overwrite the multiplier for a directed pair and return the stored row.
    pub async fn upsert_multiplier(
        &self,
        from: Area,
        to: Area,
        multiplier: f64,
    ) -> Result<AreaMultiplier, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO area_multipliers (id, from_area, to_area, multiplier)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(from_area, to_area) DO UPDATE SET multiplier = excluded.multiplier
            RETURNING id
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(multiplier)
        .fetch_one(&self.pool)
        .await?;

        Ok(AreaMultiplier {
            id: row.get("id"),
            from_area: from,
            to_area: to,
            multiplier,
        })
    }

    /// Seed pairs without touching existing ones. Returns how many were added.
    pub async fn insert_missing_multipliers(
        &self,
        pairs: &[(Area, Area, f64)],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for (from, to, multiplier) in pairs {
            let result = sqlx::query(
                r#"
                INSERT INTO area_multipliers (id, from_area, to_area, multiplier)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(from_area, to_area) DO NOTHING
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(*multiplier)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Replace a row by id. Returns false when no such row exists.
    ///
    /// # Errors
    /// Fails with a unique violation if the new pair already has its own row.
    pub async fn update_multiplier(&self, entry: &AreaMultiplier) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE area_multipliers SET from_area = ?, to_area = ?, multiplier = ? WHERE id = ?",
        )
        .bind(entry.from_area.as_str())
        .bind(entry.to_area.as_str())
        .bind(entry.multiplier)
        .bind(&entry.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_multiplier(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM area_multipliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub(super) async fn fetch_multipliers(
    conn: &mut SqliteConnection,
) -> Result<Vec<AreaMultiplier>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, from_area, to_area, multiplier FROM area_multipliers ORDER BY from_area ASC, to_area ASC",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().filter_map(multiplier_from_row).collect())
}

fn multiplier_from_row(row: &SqliteRow) -> Option<AreaMultiplier> {
    let id: String = row.get("id");
    let from_str: String = row.get("from_area");
    let to_str: String = row.get("to_area");
    match (from_str.parse::<Area>(), to_str.parse::<Area>()) {
        (Ok(from_area), Ok(to_area)) => Some(AreaMultiplier {
            id,
            from_area,
            to_area,
            multiplier: row.get("multiplier"),
        }),
        _ => {
            warn!(id = %id, from = %from_str, to = %to_str, "Skipping multiplier with unknown area");
            None
        }
    }
}
