//! Axum route handlers for the Digest API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::pipeline::{run_digest, DigestReport, DigestRequest};
use crate::state::AppState;

const MAX_LIMIT: i64 = 50;
const MAX_DEADLINE_SECS: u64 = 3600;

/// POST /api/v1/digest
///
/// Runs fetch → score → generate → render → deliver once and returns the report.
/// Every body field is optional; `{}` uses the configured defaults.
pub async fn handle_digest(
    State(state): State<AppState>,
    Json(request): Json<DigestRequest>,
) -> Result<Json<DigestReport>, AppError> {
    if let Some(limit) = request.limit {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
    }
    if let Some(secs) = request.deadline_secs {
        if !(1..=MAX_DEADLINE_SECS).contains(&secs) {
            return Err(AppError::Validation(format!(
                "deadline_secs must be between 1 and {MAX_DEADLINE_SECS}, got {secs}"
            )));
        }
    }

    let report = run_digest(&state, &request).await?;
    Ok(Json(report))
}
