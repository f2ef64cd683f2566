use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::{deleted, unique_or_internal, AppState};
use crate::domain::{TierBenefit, TierDefinition};
use crate::error::AppError;

const SLUG_TAKEN: &str = "a tier with this slug already exists";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub min_score: Option<f64>,
    pub sort_order: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

fn check_min_score(value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::BadRequest("minScore must be >= 0".to_string()));
    }
    Ok(value)
}

async fn load_tier(state: &AppState, id: &str) -> Result<TierDefinition, AppError> {
    state
        .repo
        .get_tier(id)
        .await?
        .ok_or_else(|| AppError::NotFound("tier not found".to_string()))
}

// =============================================================================
// Tiers
// =============================================================================

pub async fn list_tiers(State(state): State<AppState>) -> Result<Json<Vec<TierDefinition>>, AppError> {
    let tiers = state.repo.list_tiers().await?;
    Ok(Json(tiers))
}

pub async fn create_tier(
    State(state): State<AppState>,
    Json(body): Json<TierRequest>,
) -> Result<(StatusCode, Json<TierDefinition>), AppError> {
    let tier = TierDefinition {
        id: uuid::Uuid::new_v4().to_string(),
        name: required_text("name", body.name)?,
        slug: required_text("slug", body.slug)?,
        color: required_text("color", body.color)?,
        icon: required_text("icon", body.icon)?,
        min_score: check_min_score(
            body.min_score
                .ok_or_else(|| AppError::BadRequest("minScore is required".to_string()))?,
        )?,
        sort_order: body
            .sort_order
            .ok_or_else(|| AppError::BadRequest("sortOrder is required".to_string()))?,
        description: body.description,
        benefits: Vec::new(),
    };

    state
        .repo
        .insert_tier(&tier)
        .await
        .map_err(|e| unique_or_internal(e, SLUG_TAKEN))?;
    tracing::info!(tier_id = %tier.id, slug = %tier.slug, "Tier created");
    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn get_tier(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TierDefinition>, AppError> {
    load_tier(&state, &id).await.map(Json)
}

pub async fn update_tier(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<TierRequest>,
) -> Result<Json<TierDefinition>, AppError> {
    let mut tier = load_tier(&state, &id).await?;

    if body.name.is_some() {
        tier.name = required_text("name", body.name)?;
    }
    if body.slug.is_some() {
        tier.slug = required_text("slug", body.slug)?;
    }
    if body.color.is_some() {
        tier.color = required_text("color", body.color)?;
    }
    if body.icon.is_some() {
        tier.icon = required_text("icon", body.icon)?;
    }
    if let Some(min_score) = body.min_score {
        tier.min_score = check_min_score(min_score)?;
    }
    if let Some(sort_order) = body.sort_order {
        tier.sort_order = sort_order;
    }
    if body.description.is_some() {
        tier.description = body.description;
    }

    let updated = state
        .repo
        .update_tier(&tier)
        .await
        .map_err(|e| unique_or_internal(e, SLUG_TAKEN))?;
    if !updated {
        return Err(AppError::NotFound("tier not found".to_string()));
    }
    Ok(Json(tier))
}

pub async fn delete_tier(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_tier(&id).await? {
        return Err(AppError::NotFound("tier not found".to_string()));
    }
    Ok(deleted())
}

// =============================================================================
// Benefits
// =============================================================================

pub async fn list_benefits(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TierBenefit>>, AppError> {
    let tier = load_tier(&state, &id).await?;
    Ok(Json(tier.benefits))
}

pub async fn create_benefit(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<BenefitRequest>,
) -> Result<(StatusCode, Json<TierBenefit>), AppError> {
    let title = required_text("title", body.title)?;
    load_tier(&state, &id).await?;

    let sort_order = match body.sort_order {
        Some(order) => order,
        None => state.repo.next_benefit_sort_order(&id).await?,
    };
    let benefit = TierBenefit {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        description: body.description,
        sort_order,
    };

    state.repo.insert_benefit(&id, &benefit).await?;
    Ok((StatusCode::CREATED, Json(benefit)))
}

pub async fn update_benefit(
    Path((id, benefit_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(body): Json<BenefitRequest>,
) -> Result<Json<TierBenefit>, AppError> {
    let mut benefit = state
        .repo
        .get_benefit(&id, &benefit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("benefit not found".to_string()))?;

    if body.title.is_some() {
        benefit.title = required_text("title", body.title)?;
    }
    if body.description.is_some() {
        benefit.description = body.description;
    }
    if let Some(sort_order) = body.sort_order {
        benefit.sort_order = sort_order;
    }

    if !state.repo.update_benefit(&id, &benefit).await? {
        return Err(AppError::NotFound("benefit not found".to_string()));
    }
    Ok(Json(benefit))
}

pub async fn delete_benefit(
    Path((id, benefit_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_benefit(&id, &benefit_id).await? {
        return Err(AppError::NotFound("benefit not found".to_string()));
    }
    Ok(deleted())
}
