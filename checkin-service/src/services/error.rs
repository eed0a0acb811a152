use service_core::error::AppError;
use thiserror::Error;

use crate::services::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("Invalid or expired access token")]
    TokenInvalid,

    #[error("Already registered today at {previous_timestamp}")]
    AlreadyRegistered { previous_timestamp: String },

    #[error("Ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<CheckinError> for AppError {
    fn from(err: CheckinError) -> Self {
        match err {
            CheckinError::TokenInvalid => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid or expired access token"))
            }
            CheckinError::AlreadyRegistered { previous_timestamp } => AppError::Conflict(
                anyhow::anyhow!("Already registered today at {}", previous_timestamp),
            ),
            CheckinError::Ledger(e) => AppError::BadGateway(e.to_string()),
        }
    }
}
