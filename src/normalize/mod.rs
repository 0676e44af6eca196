//! Normalizers: raw tables in, one value per calendar year out.
//!
//! - `emissions`: resolve year/value columns by keyword, sum per year
//! - `temperature`: headerless date + regional columns, mean per row, mean per year
//!
//! Row-level problems never abort a normalizer. They are recorded as
//! `RowIssue`s and the row (or the offending value) is left out.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::YearlySeries;
use crate::schema::ColumnRef;

pub mod coerce;
pub mod emissions;
pub mod temperature;

pub use emissions::{EmissionsSchema, normalize_emissions};
pub use temperature::normalize_temperature;

/// Why a single row (or one of its values) was left out.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssueKind {
    /// Year cell is not a whole number.
    InvalidYear(String),
    /// Year parsed but is outside the plausible range.
    YearOutOfRange(i32),
    /// Emissions value is not numeric; the row contributes nothing to its year.
    InvalidValue(String),
    /// Date cell could not be parsed; the row is dropped.
    InvalidDate(String),
    /// No regional column held a numeric reading; the row is dropped.
    NoRegionalReadings,
}

impl RowIssueKind {
    /// Short stable label used for grouping in reports.
    pub fn label(&self) -> &'static str {
        match self {
            RowIssueKind::InvalidYear(_) => "invalid year",
            RowIssueKind::YearOutOfRange(_) => "year out of range",
            RowIssueKind::InvalidValue(_) => "invalid value",
            RowIssueKind::InvalidDate(_) => "invalid date",
            RowIssueKind::NoRegionalReadings => "no regional readings",
        }
    }
}

impl fmt::Display for RowIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssueKind::InvalidYear(raw) => write!(f, "invalid year '{raw}'"),
            RowIssueKind::YearOutOfRange(year) => write!(f, "year {year} out of range"),
            RowIssueKind::InvalidValue(raw) => write!(f, "invalid value '{raw}' (excluded from sum)"),
            RowIssueKind::InvalidDate(raw) => write!(f, "invalid date '{raw}'"),
            RowIssueKind::NoRegionalReadings => f.write_str("no numeric regional readings"),
        }
    }
}

/// A row-level coercion problem.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// Zero-based data row index (header rows are not counted).
    pub row: usize,
    pub kind: RowIssueKind,
}

impl RowIssue {
    pub fn new(row: usize, kind: RowIssueKind) -> Self {
        Self { row, kind }
    }
}

/// A semantic field and the column that was picked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub field: &'static str,
    pub column: ColumnRef,
}

/// Normalizer output: the yearly series plus what happened along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub series: YearlySeries,
    pub columns: Vec<ResolvedField>,
    pub rows_read: usize,
    /// Rows that contributed a value to some year.
    pub rows_used: usize,
    pub issues: Vec<RowIssue>,
}

impl Normalized {
    /// Issue counts grouped by kind label.
    pub fn issue_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind.label()).or_insert(0) += 1;
        }
        counts
    }
}
