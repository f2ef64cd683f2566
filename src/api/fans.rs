use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::Deserialize;

use crate::api::{deleted, parse_area, AppState};
use crate::domain::{Area, Fan, FanId};
use crate::error::AppError;
use crate::report::{build_fan_score, FanScoreReport, FanScoreWindow};

#[derive(Debug, Deserialize)]
pub struct FansQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanRequest {
    pub display_name: Option<String>,
    pub residence_area: Option<String>,
    pub memo: Option<String>,
}

impl FanRequest {
    /// Validated `(display_name, residence_area, memo)`.
    fn validate(self) -> Result<(String, Area, Option<String>), AppError> {
        let display_name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest("displayName is required".to_string()))?
            .to_string();

        let residence_area = parse_area("residenceArea", self.residence_area.as_deref())?;
        if !residence_area.is_physical() {
            return Err(AppError::BadRequest(
                "residenceArea must be a physical area".to_string(),
            ));
        }

        Ok((display_name, residence_area, self.memo))
    }
}

/// Read back a fan just written so the response carries `createdAt`.
async fn reload_fan(state: &AppState, id: &FanId) -> Result<Fan, AppError> {
    state
        .repo
        .get_fan(id)
        .await?
        .ok_or_else(|| AppError::NotFound("fan not found".to_string()))
}

pub async fn list_fans(
    Query(params): Query<FansQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Fan>>, AppError> {
    let fans = state.repo.list_fans(params.search.as_deref()).await?;
    Ok(Json(fans))
}

pub async fn create_fan(
    State(state): State<AppState>,
    Json(body): Json<FanRequest>,
) -> Result<(StatusCode, Json<Fan>), AppError> {
    let (display_name, residence_area, memo) = body.validate()?;
    let fan = Fan::new(display_name, residence_area).with_memo(memo);
    state.repo.insert_fan(&fan).await?;
    tracing::info!(fan_id = %fan.id, "Fan created");
    let stored = reload_fan(&state, &fan.id).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn get_fan(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Fan>, AppError> {
    state
        .repo
        .get_fan(&FanId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("fan not found".to_string()))
}

pub async fn update_fan(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<FanRequest>,
) -> Result<Json<Fan>, AppError> {
    let (display_name, residence_area, memo) = body.validate()?;
    let fan = Fan::new(display_name, residence_area)
        .with_id(FanId::new(id))
        .with_memo(memo);

    if !state.repo.update_fan(&fan).await? {
        return Err(AppError::NotFound("fan not found".to_string()));
    }
    Ok(Json(reload_fan(&state, &fan.id).await?))
}

pub async fn delete_fan(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_fan(&FanId::new(id)).await? {
        return Err(AppError::NotFound("fan not found".to_string()));
    }
    Ok(deleted())
}

pub async fn get_fan_score(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FanScoreReport>, AppError> {
    let fan_id = FanId::new(id);
    let (fan, snapshot) = state
        .repo
        .load_fan_snapshot(&fan_id)
        .await
        .map_err(|e| {
            tracing::error!(fan_id = %fan_id, error = %e, "Failed to load fan score inputs");
            AppError::Internal("Failed to load fan score".to_string())
        })?
        .ok_or_else(|| AppError::NotFound("fan not found".to_string()))?;

    let window = FanScoreWindow {
        today: Local::now().date_naive(),
        history_months: state.config.history_months,
        recent_logs_limit: state.config.recent_logs_limit,
    };

    Ok(Json(build_fan_score(
        &fan,
        &snapshot.records,
        &snapshot.settings,
        &snapshot.multipliers,
        &snapshot.tiers,
        window,
    )))
}
