use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::domain::ScoringSettings;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SettingUpdate {
    pub key: Option<String>,
    pub value: Option<serde_json::Value>,
}

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<ScoringSettings>, AppError> {
    let settings = state.repo.load_settings().await?;
    Ok(Json(settings))
}

/// Replace one settings section. The new value is validated against the
/// typed settings before anything is written.
pub async fn put_setting(
    State(state): State<AppState>,
    Json(body): Json<SettingUpdate>,
) -> Result<Json<ScoringSettings>, AppError> {
    let key = body
        .key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("key is required".to_string()))?;
    let value = body
        .value
        .ok_or_else(|| AppError::BadRequest("value is required".to_string()))?;

    let mut settings = state.repo.load_settings().await?;
    settings.apply_update(key, &value)?;

    // Store the normalized section rather than the raw request value.
    let stored = settings.section_value(key).ok_or_else(|| {
        tracing::error!(key, "Validated settings section has no stored form");
        AppError::Internal("Failed to save setting".to_string())
    })?;
    state.repo.save_setting(key, &stored).await?;
    tracing::info!(key, "Setting updated");

    Ok(Json(settings))
}
