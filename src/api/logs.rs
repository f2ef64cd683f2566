use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::{deleted, parse_area, AppState};
use crate::domain::{effective_venue, Area, Decimal, EventRecord, EventType, FanId};
use crate::db::EventLogRow;
use crate::error::AppError;
use crate::report::MonthWindow;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub month: Option<String>,
    pub fan_id: Option<String>,
}

/// Create and update body. Every field is optional so that a partial update
/// can reuse it; create enforces the required ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRequest {
    pub date: Option<String>,
    pub fan_id: Option<String>,
    pub event_type: Option<String>,
    pub venue_area: Option<String>,
    pub attend_count: Option<i64>,
    #[serde(alias = "merchAmountJPY")]
    pub merch_amount: Option<Decimal>,
    #[serde(alias = "superchatAmount", alias = "superchatAmountJPY")]
    pub donation_amount: Option<Decimal>,
    pub note: Option<String>,
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {value}")))
}

fn parse_event_type(value: &str) -> Result<EventType, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid eventType: {value}")))
}

fn check_amount(field: &str, amount: Decimal) -> Result<Decimal, AppError> {
    if amount.is_negative() {
        return Err(AppError::BadRequest(format!("{field} must be >= 0")));
    }
    Ok(amount)
}

fn check_attend_count(count: i64) -> Result<i64, AppError> {
    if count < 1 {
        return Err(AppError::BadRequest("attendCount must be >= 1".to_string()));
    }
    Ok(count)
}

/// Venue for a record: online types need none, everything else must name one.
fn resolve_venue(event_type: EventType, venue: Option<&str>) -> Result<Area, AppError> {
    if event_type.is_online() {
        return Ok(Area::Online);
    }
    parse_area("venueArea", venue)
}

async fn require_fan(state: &AppState, fan_id: &FanId) -> Result<(), AppError> {
    match state.repo.get_fan(fan_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("fan not found".to_string())),
    }
}

async fn load_log(state: &AppState, id: &str) -> Result<EventLogRow, AppError> {
    state
        .repo
        .get_log(id)
        .await?
        .ok_or_else(|| AppError::NotFound("log not found".to_string()))
}

pub async fn list_logs(
    Query(params): Query<LogsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventLogRow>>, AppError> {
    let window = match params.month.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(month) => month.parse::<MonthWindow>()?,
        None => MonthWindow::current(),
    };
    let fan_id = params
        .fan_id
        .filter(|s| !s.trim().is_empty())
        .map(FanId::new);

    let logs = state
        .repo
        .list_logs_between(window.start(), window.end(), fan_id.as_ref())
        .await?;
    Ok(Json(logs))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(body): Json<LogRequest>,
) -> Result<(StatusCode, Json<EventLogRow>), AppError> {
    let date = parse_date(
        body.date
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("date is required".to_string()))?,
    )?;
    let fan_id = body
        .fan_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FanId::new)
        .ok_or_else(|| AppError::BadRequest("fanId is required".to_string()))?;
    let event_type = parse_event_type(
        body.event_type
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("eventType is required".to_string()))?,
    )?;
    let venue_area = resolve_venue(event_type, body.venue_area.as_deref())?;
    let attend_count = check_attend_count(body.attend_count.unwrap_or(1))?;
    let merch_amount = check_amount("merchAmount", body.merch_amount.unwrap_or_default())?;
    let donation_amount = check_amount("donationAmount", body.donation_amount.unwrap_or_default())?;

    require_fan(&state, &fan_id).await?;

    let mut record = EventRecord::new(
        date,
        fan_id,
        event_type,
        venue_area,
        attend_count,
        merch_amount,
        donation_amount,
    );
    record.note = body.note.filter(|s| !s.trim().is_empty());

    state.repo.insert_record(&record).await?;
    tracing::info!(log_id = %record.id, fan_id = %record.fan_id, "Log created");

    let created = load_log(&state, &record.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_log(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EventLogRow>, AppError> {
    load_log(&state, &id).await.map(Json)
}

pub async fn update_log(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<LogRequest>,
) -> Result<Json<EventLogRow>, AppError> {
    let mut record = load_log(&state, &id).await?.record;

    if let Some(date) = body.date.as_deref() {
        record.date = parse_date(date)?;
    }
    if let Some(fan_id) = body.fan_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let fan_id = FanId::new(fan_id);
        if fan_id != record.fan_id {
            require_fan(&state, &fan_id).await?;
            record.fan_id = fan_id;
        }
    }
    if let Some(event_type) = body.event_type.as_deref() {
        record.event_type = parse_event_type(event_type)?;
    }
    if let Some(venue) = body.venue_area.as_deref() {
        record.venue_area = parse_area("venueArea", Some(venue))?;
    }
    // Switching from an online type back to a live one needs a real venue.
    if !record.event_type.is_online() && !record.venue_area.is_physical() {
        return Err(AppError::BadRequest("venueArea is required".to_string()));
    }
    record.venue_area = effective_venue(record.event_type, record.venue_area);

    if let Some(count) = body.attend_count {
        record.attend_count = check_attend_count(count)?;
    }
    if let Some(amount) = body.merch_amount {
        record.merch_amount = check_amount("merchAmount", amount)?;
    }
    if let Some(amount) = body.donation_amount {
        record.donation_amount = check_amount("donationAmount", amount)?;
    }
    if let Some(note) = body.note {
        record.note = Some(note).filter(|s| !s.trim().is_empty());
    }

    if !state.repo.update_record(&record).await? {
        return Err(AppError::NotFound("log not found".to_string()));
    }
    load_log(&state, &id).await.map(Json)
}

pub async fn delete_log(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_record(&id).await? {
        return Err(AppError::NotFound("log not found".to_string()));
    }
    Ok(deleted())
}
