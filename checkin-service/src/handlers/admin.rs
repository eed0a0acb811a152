//! Admin data endpoint: filtered records plus aggregate counts.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::dtos::{AdminDataResponse, RecordFilter};
use crate::models::submission::format_date;
use crate::services::reports::{self, RecordQuery};
use crate::services::CheckinError;
use crate::AppState;
use service_core::error::AppError;

/// Filtered records with per-day, per-month and per-department counts.
///
/// GET /admin/data?name=&date_from=&date_to=
#[tracing::instrument(skip(state))]
pub async fn admin_data(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<AdminDataResponse>, AppError> {
    let query =
        RecordQuery::parse(&filter).map_err(|msg| AppError::BadRequest(anyhow::anyhow!(msg)))?;

    let records = state.ledger.read_all().await.map_err(CheckinError::from)?;
    let filtered = reports::filter_records(&records, &query);
    let today_count = reports::count_on(&filtered, &format_date(Utc::now()));

    Ok(Json(AdminDataResponse {
        by_day: reports::by_day(&filtered),
        by_month: reports::by_month(&filtered),
        by_department: reports::by_department(&filtered),
        today_count,
        records: filtered,
    }))
}
