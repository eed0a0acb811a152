//! Token authority - owns the single live access token and its expiry.
//!
//! Exactly one token is valid at any instant. Issuing a new token replaces
//! the held one, which becomes permanently invalid even if its own TTL had
//! not elapsed. State is process-local; a restart invalidates any
//! outstanding token, which is acceptable for credentials this short-lived.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use std::sync::Mutex;
use subtle::ConstantTimeEq;

use crate::models::token::AccessToken;

/// Random bytes per token value (128 bits of entropy).
const TOKEN_BYTES: usize = 16;

pub struct TokenAuthority {
    current: Mutex<Option<AccessToken>>,
}

impl TokenAuthority {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Issue a fresh token valid for `ttl_seconds`, replacing any held one.
    pub fn issue(&self, ttl_seconds: i64) -> AccessToken {
        let token = AccessToken::new(generate_value(), ttl_seconds);
        let mut held = self.current.lock().expect("token state lock poisoned");
        *held = Some(token.clone());
        token
    }

    /// Return the held token while it is still valid, issuing a fresh one
    /// otherwise. Never returns an expired token.
    pub fn current(&self, ttl_seconds: i64) -> AccessToken {
        let mut held = self.current.lock().expect("token state lock poisoned");
        match held.as_ref() {
            Some(token) if !token.is_expired() => token.clone(),
            _ => {
                let token = AccessToken::new(generate_value(), ttl_seconds);
                *held = Some(token.clone());
                token
            }
        }
    }

    /// Whole seconds of validity left on the held token; `0` when no token
    /// is held or the held one has expired.
    pub fn remaining_seconds(&self) -> i64 {
        self.current
            .lock()
            .expect("token state lock poisoned")
            .as_ref()
            .map(|t| t.remaining_seconds())
            .unwrap_or(0)
    }

    /// A presented value is valid iff a token is held, the values match and
    /// the token has not expired. The comparison is constant-time.
    pub fn validate(&self, presented: &str) -> bool {
        let held = self.current.lock().expect("token state lock poisoned");
        match held.as_ref() {
            Some(token) if !token.is_expired() => token
                .value
                .as_bytes()
                .ct_eq(presented.as_bytes())
                .into(),
            _ => false,
        }
    }

    /// Forced rotation, e.g. when a published QR code is believed
    /// compromised. The previous token becomes invalid immediately.
    pub fn invalidate(&self, ttl_seconds: i64) -> AccessToken {
        self.issue(ttl_seconds)
    }
}

impl Default for TokenAuthority {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
