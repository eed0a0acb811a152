//! Record filtering, aggregation and CSV rendering for the admin surface.
//!
//! Date bounds arrive as `DD/MM/YYYY` text (the external contract) but are
//! compared as parsed dates internally; lexical comparison of that format
//! does not order dates across month boundaries.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::dtos::{DayCount, DepartmentCount, MonthCount, RecordFilter};
use crate::models::submission::{SubmissionRecord, DATE_FORMAT, LEDGER_HEADERS};

/// Parsed admin filter: name substring plus inclusive date bounds.
#[derive(Debug, Default)]
pub struct RecordQuery {
    pub name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl RecordQuery {
    /// Parse the raw query parameters; malformed dates are a caller error.
    pub fn parse(filter: &RecordFilter) -> Result<Self, String> {
        let name = filter
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            name,
            date_from: parse_bound(filter.date_from.as_deref(), "date_from")?,
            date_to: parse_bound(filter.date_to.as_deref(), "date_to")?,
        })
    }

    fn matches(&self, record: &SubmissionRecord) -> bool {
        if let Some(needle) = &self.name {
            if !record.name.to_lowercase().contains(needle) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = record.parsed_date() else {
                return false;
            };
            if let Some(from) = self.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if date > to {
                    return false;
                }
            }
        }

        true
    }
}

fn parse_bound(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("{} must be formatted DD/MM/YYYY", field)),
    }
}

pub fn filter_records(records: &[SubmissionRecord], query: &RecordQuery) -> Vec<SubmissionRecord> {
    records
        .iter()
        .filter(|r| query.matches(r))
        .cloned()
        .collect()
}

/// Number of records dated `date` (`DD/MM/YYYY`).
pub fn count_on(records: &[SubmissionRecord], date: &str) -> usize {
    records.iter().filter(|r| r.date_part() == date).count()
}

/// Per-day counts, date ascending. Records with malformed timestamps are
/// left out of the aggregates.
pub fn by_day(records: &[SubmissionRecord]) -> Vec<DayCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.parsed_date() {
            *counts.entry(date).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(date, count)| DayCount {
            date: date.format(DATE_FORMAT).to_string(),
            count,
        })
        .collect()
}

/// Per-month (`YYYY-MM`) counts, month ascending.
pub fn by_month(records: &[SubmissionRecord]) -> Vec<MonthCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.parsed_date() {
            *counts.entry(date.format("%Y-%m").to_string()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}

/// Per-department counts, busiest first; ties break on the department name
/// so the ordering is stable.
pub fn by_department(records: &[SubmissionRecord]) -> Vec<DepartmentCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.department.clone()).or_default() += 1;
    }
    let mut entries: Vec<DepartmentCount> = counts
        .into_iter()
        .map(|(department, count)| DepartmentCount { department, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.department.cmp(&b.department)));
    entries
}

/// Render records as CSV with the fixed ledger header row.
pub fn to_csv(records: &[SubmissionRecord]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, LEDGER_HEADERS.iter().map(|h| h.to_string()));
    for record in records {
        push_csv_row(&mut out, record.to_row().into_iter());
    }
    out
}

fn push_csv_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_escape(&cell));
    }
    out.push('\n');
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
