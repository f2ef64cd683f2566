use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::error::AppError;
use crate::import::{parse_fans_csv, parse_logs_csv, ParsedImport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub csv_text: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

impl ImportRequest {
    fn csv_text(&self) -> Result<&str, AppError> {
        self.csv_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("csvText is required".to_string()))
    }
}

/// Dry-run preview, or the row errors that block a real import.
/// `None` means the payload is clean and should be written.
fn preflight<T: Serialize>(parsed: &ParsedImport<T>, dry_run: bool) -> Option<Response> {
    if dry_run {
        return Some(
            Json(json!({
                "total": parsed.total,
                "valid": parsed.valid.len(),
                "errors": parsed.errors,
                "preview": parsed.preview(),
            }))
            .into_response(),
        );
    }
    if parsed.has_errors() {
        return Some(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("{} row(s) failed validation", parsed.errors.len()),
                    "total": parsed.total,
                    "valid": parsed.valid.len(),
                    "errors": parsed.errors,
                })),
            )
                .into_response(),
        );
    }
    None
}

fn created(count: usize, total: usize) -> Response {
    Json(json!({"success": true, "created": count, "total": total})).into_response()
}

pub async fn import_fans(
    State(state): State<AppState>,
    Json(body): Json<ImportRequest>,
) -> Result<Response, AppError> {
    let parsed = parse_fans_csv(body.csv_text()?)?;
    if let Some(response) = preflight(&parsed, body.dry_run) {
        return Ok(response);
    }

    let total = parsed.total;
    let fans: Vec<_> = parsed.valid.into_iter().map(|d| d.into_fan()).collect();
    let count = state.repo.insert_fans(&fans).await?;
    tracing::info!(count, "Imported fans");
    Ok(created(count, total))
}

pub async fn import_logs(
    State(state): State<AppState>,
    Json(body): Json<ImportRequest>,
) -> Result<Response, AppError> {
    let csv_text = body.csv_text()?;
    let fans = state.repo.list_fans(None).await?;
    let parsed = parse_logs_csv(csv_text, &fans)?;
    if let Some(response) = preflight(&parsed, body.dry_run) {
        return Ok(response);
    }

    let total = parsed.total;
    let records: Vec<_> = parsed.valid.into_iter().map(|d| d.into_record()).collect();
    let count = state.repo.insert_records(&records).await?;
    tracing::info!(count, "Imported logs");
    Ok(created(count, total))
}
