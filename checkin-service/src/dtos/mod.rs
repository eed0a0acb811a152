use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::submission::SubmissionRecord;

/// Body of `GET /api/token`, polled by the QR front-end.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub remaining_seconds: i64,
    /// Check-ins accepted today; `null` when the ledger cannot be read.
    pub today_count: Option<usize>,
}

/// Body of `POST /admin/token/invalidate`.
#[derive(Debug, Serialize)]
pub struct RotatedTokenResponse {
    pub token: String,
    pub remaining_seconds: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckinRequest {
    pub token: String,
    #[validate(custom(function = "not_blank", message = "name is required"))]
    pub name: String,
    #[validate(custom(function = "not_blank", message = "identifier is required"))]
    pub identifier: String,
    #[validate(custom(function = "not_blank", message = "department is required"))]
    pub department: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CheckinResponse {
    pub record: SubmissionRecord,
}

/// Raw admin filter parameters; dates use the external `DD/MM/YYYY` contract.
#[derive(Debug, Default, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AdminDataResponse {
    pub by_day: Vec<DayCount>,
    pub by_month: Vec<MonthCount>,
    pub by_department: Vec<DepartmentCount>,
    pub records: Vec<SubmissionRecord>,
    pub today_count: usize,
}
