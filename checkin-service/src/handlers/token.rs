//! Token endpoints: the current token for the QR front-end and forced
//! rotation for administrators.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::dtos::{RotatedTokenResponse, TokenResponse};
use crate::models::submission::format_date;
use crate::services::reports;
use crate::AppState;
use service_core::error::AppError;

/// Current token plus remaining validity, issuing a fresh token if the held
/// one has expired. Polled by the page that renders the QR code.
///
/// GET /api/token
#[tracing::instrument(skip(state))]
pub async fn current_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.tokens.current(state.config.token.ttl_seconds);

    // The counter is a display aid; a ledger outage must not break the QR
    // refresh loop, but it is reported as absent rather than as zero.
    let today_count = match state.ledger.read_all().await {
        Ok(records) => Some(reports::count_on(&records, &format_date(Utc::now()))),
        Err(e) => {
            tracing::warn!(error = %e, "Ledger unavailable while counting today's check-ins");
            None
        }
    };

    Ok(Json(TokenResponse {
        remaining_seconds: token.remaining_seconds(),
        token: token.value,
        today_count,
    }))
}

/// Force early rotation of the access token, e.g. when a published QR code
/// is believed compromised.
///
/// POST /admin/token/invalidate
#[tracing::instrument(skip(state))]
pub async fn invalidate_token(
    State(state): State<AppState>,
) -> Result<Json<RotatedTokenResponse>, AppError> {
    let token = state.tokens.invalidate(state.config.token.ttl_seconds);
    tracing::info!(expires_at = %token.expires_at, "Access token rotated by administrator");

    Ok(Json(RotatedTokenResponse {
        remaining_seconds: token.remaining_seconds(),
        token: token.value,
    }))
}
