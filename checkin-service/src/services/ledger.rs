//! Ledger adapters - the append-only row store behind the `Ledger` trait.
//!
//! The core never knows which concrete store backs the ledger: handlers see
//! `Arc<dyn Ledger>`. `RestLedger` adapts a spreadsheet-style HTTP row API;
//! `MemoryLedger` backs local development and the integration tests.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::LedgerConfig;
use crate::models::submission::{SubmissionRecord, LEDGER_HEADERS};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger rejected the request: HTTP {0}")]
    Status(u16),

    #[error("ledger returned a malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append one accepted record. Single attempt; the caller surfaces
    /// failures to the client.
    async fn append(&self, record: &SubmissionRecord) -> Result<(), LedgerError>;

    /// Read every record the store holds. An empty ledger is `Ok(vec![])`;
    /// a failed read is an error and must never be conflated with empty.
    async fn read_all(&self) -> Result<Vec<SubmissionRecord>, LedgerError>;

    async fn health_check(&self) -> Result<(), LedgerError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct RowsPayload {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Adapter over a spreadsheet-style HTTP row store (bearer-token auth,
/// `GET {base}/values` to read, `POST {base}/values:append` to append).
pub struct RestLedger {
    client: reqwest::Client,
    config: LedgerConfig,
}

impl RestLedger {
    /// Build the adapter and make sure the fixed header row exists.
    pub async fn connect(config: LedgerConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        let ledger = Self { client, config };
        ledger.ensure_headers().await?;
        tracing::info!(base_url = %ledger.config.base_url, "Connected to ledger store");
        Ok(ledger)
    }

    async fn ensure_headers(&self) -> Result<(), LedgerError> {
        let rows = self.fetch_rows().await?;
        match rows.first() {
            None => {
                let header: Vec<String> =
                    LEDGER_HEADERS.iter().map(|h| h.to_string()).collect();
                self.append_row(&header).await?;
                tracing::info!("Ledger was empty; header row created");
            }
            Some(first) if first.first().map(String::as_str) != Some(LEDGER_HEADERS[0]) => {
                tracing::warn!(
                    "Ledger first row does not look like the expected header; leaving it untouched"
                );
            }
            Some(_) => {}
        }
        Ok(())
    }

    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, LedgerError> {
        let url = format!("{}/values", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status(response.status().as_u16()));
        }

        let payload: RowsPayload = response
            .json()
            .await
            .map_err(|e| LedgerError::Malformed(e.to_string()))?;
        Ok(payload.values)
    }

    async fn append_row(&self, row: &[String]) -> Result<(), LedgerError> {
        let url = format!("{}/values:append", self.config.base_url);
        let payload = RowsPayload {
            values: vec![row.to_vec()],
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for RestLedger {
    async fn append(&self, record: &SubmissionRecord) -> Result<(), LedgerError> {
        self.append_row(&record.to_row()).await
    }

    async fn read_all(&self) -> Result<Vec<SubmissionRecord>, LedgerError> {
        let rows = self.fetch_rows().await?;
        // Only the first row can be the header.
        let skip = usize::from(
            rows.first().and_then(|row| row.first()).map(String::as_str)
                == Some(LEDGER_HEADERS[0]),
        );
        let records = rows
            .iter()
            .skip(skip)
            .filter_map(|row| {
                let record = SubmissionRecord::from_row(row);
                if record.is_none() {
                    tracing::warn!(cells = row.len(), "Skipping short ledger row");
                }
                record
            })
            .collect();
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        self.fetch_rows().await.map(|_| ())
    }
}

/// In-process ledger used when the remote store is disabled and by tests.
#[derive(Default)]
pub struct MemoryLedger {
    rows: RwLock<Vec<SubmissionRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records, for assertions in tests.
    pub async fn records(&self) -> Vec<SubmissionRecord> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, record: &SubmissionRecord) -> Result<(), LedgerError> {
        self.rows.write().await.push(record.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<SubmissionRecord>, LedgerError> {
        Ok(self.rows.read().await.clone())
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}
