//! Participation log operations for the repository.

use crate::domain::{Area, Decimal, EventRecord, EventType, FanId};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use tracing::warn;

use super::Repository;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_LOGS: &str = r#"
    SELECT l.id, l.date, l.fan_id, l.event_type, l.venue_area, l.attend_count,
           l.merch_amount, l.donation_amount, l.note, f.display_name AS fan_name
    FROM event_logs l
    JOIN fans f ON f.id = l.fan_id
"#;

/// A log with its fan's display name, as listed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogRow {
    #[serde(flatten)]
    pub record: EventRecord,
    pub fan_name: String,
}

impl Repository {
    /// All records, oldest first, insertion order within a day.
    pub async fn list_records(&self) -> Result<Vec<EventRecord>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_records(&mut *conn).await
    }

    /// Logs dated within `[from, to]`, newest first, optionally for one fan.
    pub async fn list_logs_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        fan_id: Option<&FanId>,
    ) -> Result<Vec<EventLogRow>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "{SELECT_LOGS} WHERE l.date >= ?1 AND l.date <= ?2 AND (?3 IS NULL OR l.fan_id = ?3) \
             ORDER BY l.date DESC, l.rowid DESC"
        ))
        .bind(from.format(DATE_FORMAT).to_string())
        .bind(to.format(DATE_FORMAT).to_string())
        .bind(fan_id.map(FanId::as_str))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().filter_map(log_row_from_row).collect())
    }

    pub async fn get_log(&self, id: &str) -> Result<Option<EventLogRow>, sqlx::Error> {
        let row = sqlx::query(&format!("{SELECT_LOGS} WHERE l.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().and_then(log_row_from_row))
    }

    /// Insert a record.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including an unknown fan).
    pub async fn insert_record(&self, record: &EventRecord) -> Result<(), sqlx::Error> {
        bind_record(
            sqlx::query(
                r#"
                INSERT INTO event_logs (
                    date, fan_id, event_type, venue_area, attend_count,
                    merch_amount, donation_amount, note, id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            ),
            record,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert records in a single transaction. Nothing is written if any insert fails.
    pub async fn insert_records(&self, records: &[EventRecord]) -> Result<usize, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            bind_record(
                sqlx::query(
                    r#"
                    INSERT INTO event_logs (
                        date, fan_id, event_type, venue_area, attend_count,
                        merch_amount, donation_amount, note, id
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                ),
                record,
            )
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }

    /// Replace a record's fields. Returns false when no such record exists.
    pub async fn update_record(&self, record: &EventRecord) -> Result<bool, sqlx::Error> {
        let result = bind_record(
            sqlx::query(
                r#"
                UPDATE event_logs SET
                    date = ?, fan_id = ?, event_type = ?, venue_area = ?, attend_count = ?,
                    merch_amount = ?, donation_amount = ?, note = ?
                WHERE id = ?
                "#,
            ),
            record,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_record(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Binds every column in statement order, with `id` last.
pub(super) async fn fetch_records(conn: &mut SqliteConnection) -> Result<Vec<EventRecord>, sqlx::Error> {
    let rows = sqlx::query(&format!("{SELECT_LOGS} ORDER BY l.date ASC, l.rowid ASC"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.iter().filter_map(record_from_row).collect())
}

pub(super) async fn fetch_records_for_fan(
    conn: &mut SqliteConnection,
    fan_id: &FanId,
) -> Result<Vec<EventRecord>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "{SELECT_LOGS} WHERE l.fan_id = ? ORDER BY l.date ASC, l.rowid ASC"
    ))
    .bind(fan_id.as_str())
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().filter_map(record_from_row).collect())
}

fn bind_record<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    record: &'q EventRecord,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(record.date.format(DATE_FORMAT).to_string())
        .bind(record.fan_id.as_str())
        .bind(record.event_type.as_str())
        .bind(record.venue_area.as_str())
        .bind(record.attend_count)
        .bind(record.merch_amount.to_canonical_string())
        .bind(record.donation_amount.to_canonical_string())
        .bind(record.note.as_deref())
        .bind(record.id.as_str())
}

fn record_from_row(row: &SqliteRow) -> Option<EventRecord> {
    let id: String = row.get("id");

    let date_str: String = row.get("date");
    let date = match NaiveDate::parse_from_str(&date_str, DATE_FORMAT) {
        Ok(date) => date,
        Err(e) => {
            warn!(log_id = %id, date = %date_str, error = %e, "Failed to parse log date, skipping row");
            return None;
        }
    };

    let event_type_str: String = row.get("event_type");
    let event_type = EventType::from_label(&event_type_str);
    if event_type == EventType::Unrecognized {
        warn!(log_id = %id, event_type = %event_type_str, "Unrecognized event type, scoring as zero");
    }

    let venue_str: String = row.get("venue_area");
    let venue_area = venue_str.parse::<Area>().unwrap_or_else(|e| {
        warn!(log_id = %id, venue_area = %venue_str, error = %e, "Failed to parse venue area, using OTHER");
        Area::Other
    });

    let merch_amount = parse_amount(&id, "merch_amount", row.get("merch_amount"));
    let donation_amount = parse_amount(&id, "donation_amount", row.get("donation_amount"));

    Some(EventRecord {
        id,
        date,
        fan_id: FanId::new(row.get::<String, _>("fan_id")),
        event_type,
        venue_area,
        attend_count: row.get("attend_count"),
        merch_amount,
        donation_amount,
        note: row.get("note"),
    })
}

fn log_row_from_row(row: &SqliteRow) -> Option<EventLogRow> {
    Some(EventLogRow {
        record: record_from_row(row)?,
        fan_name: row.get("fan_name"),
    })
}

fn parse_amount(log_id: &str, column: &str, raw: String) -> Decimal {
    Decimal::from_str_canonical(&raw).unwrap_or_else(|e| {
        warn!(log_id = %log_id, column, amount = %raw, error = %e, "Failed to parse amount decimal, using default");
        Decimal::default()
    })
}
