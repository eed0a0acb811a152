//! Access token model - the rotating credential embedded in the check-in QR URL.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A single issued access token together with its validity window.
///
/// At most one token is live per process; superseded tokens are discarded,
/// not archived.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token valid for `ttl_seconds` from now.
    pub fn new(value: String, ttl_seconds: i64) -> Self {
        let issued_at = Utc::now();
        Self {
            value,
            issued_at,
            expires_at: issued_at + Duration::seconds(ttl_seconds),
        }
    }

    /// A token is expired once `expires_at` is reached.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whole seconds of validity left, never negative.
    pub fn remaining_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}
