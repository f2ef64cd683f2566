use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{FanId, TierSummary};
use crate::error::AppError;
use crate::report::{build_fan_tiers, build_ranking, MonthWindow, RankingEntry, RankingScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankingMode {
    Monthly,
    Cumulative,
}

impl FromStr for RankingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(RankingMode::Monthly),
            "cumulative" => Ok(RankingMode::Cumulative),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQuery {
    pub mode: Option<String>,
    pub month: Option<String>,
}

pub async fn get_ranking(
    Query(params): Query<RankingQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    let mode = match params.mode.as_deref() {
        None => RankingMode::Monthly,
        Some(s) => RankingMode::from_str(s).map_err(|_| {
            AppError::BadRequest("mode must be one of: monthly, cumulative".to_string())
        })?,
    };

    let scope = match mode {
        RankingMode::Cumulative => RankingScope::Cumulative,
        RankingMode::Monthly => {
            let window = match params.month.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(month) => month.parse::<MonthWindow>()?,
                None => MonthWindow::current(),
            };
            RankingScope::Monthly(window)
        }
    };

    let snapshot = state.repo.load_snapshot().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load scoring snapshot");
        AppError::Internal("Failed to load ranking".to_string())
    })?;

    Ok(Json(build_ranking(&snapshot, scope)))
}

pub async fn get_fan_tiers(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<FanId, Option<TierSummary>>>, AppError> {
    let snapshot = state.repo.load_snapshot().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load scoring snapshot");
        AppError::Internal("Failed to load fan tiers".to_string())
    })?;

    Ok(Json(build_fan_tiers(&snapshot)))
}
