//! Submission record model - one accepted check-in row in the ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed header row enforced on the ledger store.
pub const LEDGER_HEADERS: [&str; 7] = [
    "Name",
    "Identifier",
    "Department",
    "Timestamp",
    "SourceAddress",
    "LocationLabel",
    "Country",
];

/// Textual acceptance-time format carried in the ledger.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Date portion of [`TIMESTAMP_FORMAT`], used for the same-day duplicate window.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// An accepted check-in. Immutable once created; persisted append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub name: String,
    pub identifier: String,
    pub department: String,
    /// Acceptance time, fixed textual format `DD/MM/YYYY HH:MM:SS`.
    pub timestamp: String,
    pub source_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl SubmissionRecord {
    /// Date portion (`DD/MM/YYYY`) of the stored timestamp.
    pub fn date_part(&self) -> &str {
        self.timestamp.split(' ').next().unwrap_or("")
    }

    /// Parsed calendar date, `None` for malformed timestamps.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_part(), DATE_FORMAT).ok()
    }

    /// Ordered cells matching [`LEDGER_HEADERS`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.identifier.clone(),
            self.department.clone(),
            self.timestamp.clone(),
            self.source_address.clone(),
            self.location_label.clone().unwrap_or_default(),
            self.country.clone().unwrap_or_default(),
        ]
    }

    /// Rebuild a record from an ordered ledger row. Rows shorter than the
    /// required five cells are rejected; the optional location cells may be
    /// absent or empty.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 5 {
            return None;
        }
        let optional = |idx: usize| {
            row.get(idx)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        Some(Self {
            name: row[0].clone(),
            identifier: row[1].clone(),
            department: row[2].clone(),
            timestamp: row[3].clone(),
            source_address: row[4].clone(),
            location_label: optional(5),
            country: optional(6),
        })
    }
}

/// Render an instant in the ledger timestamp format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Render the date portion only (`DD/MM/YYYY`).
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str) -> SubmissionRecord {
        SubmissionRecord {
            name: "Ana".to_string(),
            identifier: "123".to_string(),
            department: "RH".to_string(),
            timestamp: timestamp.to_string(),
            source_address: "203.0.113.9".to_string(),
            location_label: None,
            country: None,
        }
    }

    #[test]
    fn date_part_is_text_before_first_space() {
        assert_eq!(record("01/05/2024 09:00:00").date_part(), "01/05/2024");
        assert_eq!(record("01/05/2024").date_part(), "01/05/2024");
        assert_eq!(record("").date_part(), "");
    }

    #[test]
    fn parsed_date_rejects_malformed_timestamps() {
        assert_eq!(
            record("31/01/2025 08:30:00").parsed_date(),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert!(record("2025-01-31 08:30:00").parsed_date().is_none());
        assert!(record("garbage").parsed_date().is_none());
    }

    #[test]
    fn row_conversion_keeps_header_order_and_optional_cells() {
        let mut rec = record("01/05/2024 09:00:00");
        rec.location_label = Some("Lisbon, Lisboa".to_string());
        rec.country = Some("Portugal".to_string());

        let row = rec.to_row();
        assert_eq!(row.len(), LEDGER_HEADERS.len());
        assert_eq!(SubmissionRecord::from_row(&row), Some(rec));

        // Five-cell rows (no location columns) are still valid.
        let short: Vec<String> = row[..5].to_vec();
        let parsed = SubmissionRecord::from_row(&short).unwrap();
        assert_eq!(parsed.location_label, None);
        assert_eq!(parsed.country, None);

        assert!(SubmissionRecord::from_row(&row[..4]).is_none());
    }
}
