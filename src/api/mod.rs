pub mod fans;
pub mod health;
pub mod import;
pub mod logs;
pub mod multipliers;
pub mod ranking;
pub mod settings;
pub mod tiers;

use crate::config::Config;
use crate::db::{is_unique_violation, Repository};
use crate::domain::Area;
use crate::error::AppError;
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/ranking", get(ranking::get_ranking))
        .route("/api/fan-tiers", get(ranking::get_fan_tiers))
        .route("/api/fans", get(fans::list_fans).post(fans::create_fan))
        .route(
            "/api/fans/:id",
            get(fans::get_fan)
                .put(fans::update_fan)
                .delete(fans::delete_fan),
        )
        .route("/api/fans/:id/score", get(fans::get_fan_score))
        .route("/api/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/api/logs/:id",
            get(logs::get_log)
                .put(logs::update_log)
                .delete(logs::delete_log),
        )
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::put_setting),
        )
        .route(
            "/api/area-multipliers",
            get(multipliers::list_multipliers).post(multipliers::upsert_multiplier),
        )
        .route(
            "/api/area-multipliers/:id",
            put(multipliers::update_multiplier).delete(multipliers::delete_multiplier),
        )
        .route("/api/tiers", get(tiers::list_tiers).post(tiers::create_tier))
        .route(
            "/api/tiers/:id",
            get(tiers::get_tier)
                .put(tiers::update_tier)
                .delete(tiers::delete_tier),
        )
        .route(
            "/api/tiers/:id/benefits",
            get(tiers::list_benefits).post(tiers::create_benefit),
        )
        .route(
            "/api/tiers/:id/benefits/:benefit_id",
            put(tiers::update_benefit).delete(tiers::delete_benefit),
        )
        .route("/api/import/fans", post(import::import_fans))
        .route("/api/import/logs", post(import::import_logs))
        .layer(cors)
        .with_state(state)
}

/// Body returned by successful deletes.
pub(crate) fn deleted() -> Json<serde_json::Value> {
    Json(serde_json::json!({"success": true}))
}

/// Parse an area code from a request body field.
pub(crate) fn parse_area(field: &str, value: Option<&str>) -> Result<Area, AppError> {
    let value = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))?;
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {field}: {value}")))
}

/// Map a write failure, turning UNIQUE violations into a 400 with `message`.
pub(crate) fn unique_or_internal(err: sqlx::Error, message: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::BadRequest(message.to_string())
    } else {
        AppError::from(err)
    }
}
