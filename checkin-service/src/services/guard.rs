//! Submission guard - same-day duplicate detection and record admission.
//!
//! The guard is pure: callers supply the ledger snapshot, so a failed
//! ledger read surfaces before admission is ever attempted and is never
//! mistaken for an empty ledger.

use chrono::{DateTime, Utc};

use crate::models::submission::{format_date, format_timestamp, SubmissionRecord};

/// A validated, trimmed candidate for admission.
#[derive(Debug, Clone)]
pub struct CheckinCandidate {
    pub name: String,
    pub identifier: String,
    pub department: String,
    pub source_address: String,
    pub location_label: Option<String>,
    pub country: Option<String>,
}

impl CheckinCandidate {
    /// Trim surrounding whitespace from the user-entered fields. Identifier
    /// comparison stays exact beyond that: case and leading zeros are
    /// significant.
    pub fn new(name: &str, identifier: &str, department: &str, source_address: String) -> Self {
        Self {
            name: name.trim().to_string(),
            identifier: identifier.trim().to_string(),
            department: department.trim().to_string(),
            source_address,
            location_label: None,
            country: None,
        }
    }

    pub fn with_geo(mut self, location_label: Option<String>, country: Option<String>) -> Self {
        self.location_label = location_label;
        self.country = country;
        self
    }
}

/// Rejection outcome: the prior matching record's timestamp, for
/// "already registered at ..." messaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyRegistered {
    pub previous_timestamp: String,
}

/// True iff any record matches `identifier` exactly and carries a timestamp
/// dated `today` (`DD/MM/YYYY`).
pub fn is_duplicate_today(identifier: &str, records: &[SubmissionRecord], today: &str) -> bool {
    find_todays_entry(identifier, records, today).is_some()
}

fn find_todays_entry<'a>(
    identifier: &str,
    records: &'a [SubmissionRecord],
    today: &str,
) -> Option<&'a SubmissionRecord> {
    records
        .iter()
        .find(|r| r.identifier == identifier && r.date_part() == today)
}

/// Admit a candidate against the ledger snapshot: reject same-day repeats
/// of the identifier, otherwise produce the record ready for persistence.
pub fn accept(
    candidate: CheckinCandidate,
    records: &[SubmissionRecord],
    accepted_at: DateTime<Utc>,
) -> Result<SubmissionRecord, AlreadyRegistered> {
    let today = format_date(accepted_at);
    if let Some(previous) = find_todays_entry(&candidate.identifier, records, &today) {
        return Err(AlreadyRegistered {
            previous_timestamp: previous.timestamp.clone(),
        });
    }

    Ok(SubmissionRecord {
        name: candidate.name,
        identifier: candidate.identifier,
        department: candidate.department,
        timestamp: format_timestamp(accepted_at),
        source_address: candidate.source_address,
        location_label: candidate.location_label,
        country: candidate.country,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str, timestamp: &str) -> SubmissionRecord {
        SubmissionRecord {
            name: "Ana".to_string(),
            identifier: identifier.to_string(),
            department: "RH".to_string(),
            timestamp: timestamp.to_string(),
            source_address: "203.0.113.9".to_string(),
            location_label: None,
            country: None,
        }
    }

    #[test]
    fn duplicate_requires_same_identifier_and_same_day() {
        let records = vec![record("A123", "01/05/2024 09:00:00")];

        assert!(is_duplicate_today("A123", &records, "01/05/2024"));
        assert!(!is_duplicate_today("A123", &records, "02/05/2024"));
        assert!(!is_duplicate_today("B456", &records, "01/05/2024"));
    }

    #[test]
    fn identifier_comparison_is_exact() {
        let records = vec![record("A123", "01/05/2024 09:00:00")];

        assert!(!is_duplicate_today("a123", &records, "01/05/2024"));
        assert!(!is_duplicate_today("0A123", &records, "01/05/2024"));
        assert!(!is_duplicate_today(" A123", &records, "01/05/2024"));
    }

    #[test]
    fn accept_builds_a_timestamped_record() {
        let now = Utc::now();
        let candidate =
            CheckinCandidate::new("  Ana  ", " 123 ", " RH ", "203.0.113.9".to_string());

        let accepted = accept(candidate, &[], now).unwrap();
        assert_eq!(accepted.name, "Ana");
        assert_eq!(accepted.identifier, "123");
        assert_eq!(accepted.department, "RH");
        assert_eq!(accepted.date_part(), format_date(now));
        assert_eq!(accepted.source_address, "203.0.113.9");
    }

    #[test]
    fn accept_rejects_same_day_repeat_with_previous_timestamp() {
        let now = Utc::now();
        let today = format_date(now);
        let existing = vec![record("123", &format!("{} 09:00:00", today))];

        let candidate = CheckinCandidate::new("Bruno", "123", "TI", "198.51.100.4".to_string());
        let rejected = accept(candidate, &existing, now).unwrap_err();
        assert_eq!(
            rejected.previous_timestamp,
            format!("{} 09:00:00", today)
        );
    }

    #[test]
    fn accept_allows_same_identifier_on_a_different_day() {
        let now = Utc::now();
        let existing = vec![record("123", "01/01/2020 08:00:00")];

        let candidate = CheckinCandidate::new("Ana", "123", "RH", "203.0.113.9".to_string());
        assert!(accept(candidate, &existing, now).is_ok());
    }

    #[test]
    fn geo_labels_are_carried_onto_the_record() {
        let now = Utc::now();
        let candidate = CheckinCandidate::new("Ana", "123", "RH", "203.0.113.9".to_string())
            .with_geo(Some("Lisbon, Lisboa".to_string()), Some("Portugal".to_string()));

        let accepted = accept(candidate, &[], now).unwrap();
        assert_eq!(accepted.location_label.as_deref(), Some("Lisbon, Lisboa"));
        assert_eq!(accepted.country.as_deref(), Some("Portugal"));
    }
}
