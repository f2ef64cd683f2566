use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::{deleted, parse_area, unique_or_internal, AppState};
use crate::domain::AreaMultiplier;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplierRequest {
    pub from_area: Option<String>,
    pub to_area: Option<String>,
    pub multiplier: Option<f64>,
}

fn check_multiplier(value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::BadRequest("multiplier must be > 0".to_string()));
    }
    Ok(value)
}

pub async fn list_multipliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<AreaMultiplier>>, AppError> {
    let rows = state.repo.list_multipliers().await?;
    Ok(Json(rows))
}

/// Insert or overwrite the multiplier for a directed pair.
pub async fn upsert_multiplier(
    State(state): State<AppState>,
    Json(body): Json<MultiplierRequest>,
) -> Result<(StatusCode, Json<AreaMultiplier>), AppError> {
    let from = parse_area("fromArea", body.from_area.as_deref())?;
    let to = parse_area("toArea", body.to_area.as_deref())?;
    let multiplier = check_multiplier(
        body.multiplier
            .ok_or_else(|| AppError::BadRequest("multiplier is required".to_string()))?,
    )?;

    let entry = state.repo.upsert_multiplier(from, to, multiplier).await?;
    tracing::info!(from = %from, to = %to, multiplier, "Area multiplier saved");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_multiplier(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<MultiplierRequest>,
) -> Result<Json<AreaMultiplier>, AppError> {
    let mut entry = state
        .repo
        .get_multiplier(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("area multiplier not found".to_string()))?;

    if body.from_area.is_some() {
        entry.from_area = parse_area("fromArea", body.from_area.as_deref())?;
    }
    if body.to_area.is_some() {
        entry.to_area = parse_area("toArea", body.to_area.as_deref())?;
    }
    if let Some(value) = body.multiplier {
        entry.multiplier = check_multiplier(value)?;
    }

    let updated = state
        .repo
        .update_multiplier(&entry)
        .await
        .map_err(|e| unique_or_internal(e, "an entry for this area pair already exists"))?;
    if !updated {
        return Err(AppError::NotFound("area multiplier not found".to_string()));
    }
    Ok(Json(entry))
}

pub async fn delete_multiplier(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_multiplier(&id).await? {
        return Err(AppError::NotFound("area multiplier not found".to_string()));
    }
    Ok(deleted())
}
