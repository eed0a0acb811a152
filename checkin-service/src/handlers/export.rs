//! CSV export of the (optionally filtered) ledger.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::dtos::RecordFilter;
use crate::services::reports::{self, RecordQuery};
use crate::services::CheckinError;
use crate::AppState;
use service_core::error::AppError;

/// Download the filtered records as `checkins.csv`.
///
/// GET /admin/export/csv?name=&date_from=&date_to=
#[tracing::instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<Response, AppError> {
    let query =
        RecordQuery::parse(&filter).map_err(|msg| AppError::BadRequest(anyhow::anyhow!(msg)))?;

    let records = state.ledger.read_all().await.map_err(CheckinError::from)?;
    let filtered = reports::filter_records(&records, &query);
    let body = reports::to_csv(&filtered);

    tracing::info!(rows = filtered.len(), "CSV export generated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"checkins.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
