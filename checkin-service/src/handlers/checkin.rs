//! Check-in submission handler.

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use metrics::counter;
use std::net::SocketAddr;
use validator::Validate;

use crate::dtos::{CheckinRequest, CheckinResponse};
use crate::services::guard::{self, CheckinCandidate};
use crate::services::CheckinError;
use crate::AppState;
use service_core::error::AppError;

/// Accept a check-in gated by the current access token.
///
/// POST /checkin
///
/// Outcomes: 201 with the stored record, 401 for a missing/expired token,
/// 422 for blank required fields, 409 when the identifier already checked
/// in today (carrying the earlier timestamp), 502 when the ledger cannot
/// be reached.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn submit_checkin(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<CheckinRequest>,
) -> Result<(StatusCode, Json<CheckinResponse>), AppError> {
    if !state.tokens.validate(&payload.token) {
        counter!("checkin_submissions_total", "outcome" => "token_invalid").increment(1);
        return Err(CheckinError::TokenInvalid.into());
    }

    payload.validate()?;

    let source_address = client_address(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    // Duplicate detection runs against a fresh ledger snapshot; a failed
    // read is surfaced as 502, never treated as an empty ledger.
    let records = state.ledger.read_all().await.map_err(CheckinError::from)?;

    let geo = state.geo.lookup(&source_address).await;
    let (location_label, country) = match geo {
        Some(info) => {
            let label = info.location_label();
            (
                (!label.is_empty()).then_some(label),
                (!info.country.is_empty()).then_some(info.country),
            )
        }
        None => (None, None),
    };

    let candidate = CheckinCandidate::new(
        &payload.name,
        &payload.identifier,
        &payload.department,
        source_address,
    )
    .with_geo(location_label, country);

    let record = guard::accept(candidate, &records, Utc::now()).map_err(|rejected| {
        counter!("checkin_submissions_total", "outcome" => "duplicate").increment(1);
        CheckinError::AlreadyRegistered {
            previous_timestamp: rejected.previous_timestamp,
        }
    })?;

    state
        .ledger
        .append(&record)
        .await
        .map_err(CheckinError::from)?;

    counter!("checkin_submissions_total", "outcome" => "accepted").increment(1);
    tracing::info!(
        identifier = %record.identifier,
        department = %record.department,
        "Check-in accepted"
    );

    Ok((StatusCode::CREATED, Json(CheckinResponse { record })))
}

/// Network origin of the submission: first `X-Forwarded-For` hop, then the
/// socket peer address.
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
