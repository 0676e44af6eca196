//! Temperature-anomaly normalizer.
//!
//! Input layout (no semantic header): column 0 is a date, columns 1..N are
//! regional anomaly readings. Each row is reduced to the mean of its numeric
//! readings, dated, and then averaged per calendar year.
//!
//! Absence is the signal for missing data throughout: a row with no usable
//! readings or no parseable date is dropped, and a year with no surviving rows
//! does not appear in the output at all. Nothing is ever counted as zero.

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::domain::{YearlySeries, is_plausible_year};
use crate::io::raw::RawTable;
use crate::normalize::coerce::{parse_date, parse_number};
use crate::normalize::{Normalized, ResolvedField, RowIssue, RowIssueKind};
use crate::pipeline::error::{SchemaError, StageError};
use crate::schema::ColumnRef;

/// Position of the date column.
pub const DATE_COLUMN: usize = 0;

const LAYOUT: &str = "date + regional readings";

/// Aggregate an anomaly table to one mean value per year.
pub fn normalize_temperature(raw: &RawTable) -> Result<Normalized, StageError> {
    if raw.column_count() < 2 {
        return Err(SchemaError::TooFewColumns {
            required: 2,
            found: raw.column_count(),
            layout: LAYOUT,
        }
        .into());
    }
    debug!(regions = raw.column_count() - 1, "temperature layout");

    // year -> (sum of row means, row count)
    let mut acc: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    let mut issues = Vec::new();
    let mut rows_used = 0usize;

    for row in 0..raw.row_count() {
        let date_cell = raw.cell(DATE_COLUMN, row);
        let Some(date) = parse_date(date_cell) else {
            issues.push(RowIssue::new(row, RowIssueKind::InvalidDate(date_cell.to_string())));
            continue;
        };
        let year = date.year();
        if !is_plausible_year(year) {
            issues.push(RowIssue::new(row, RowIssueKind::YearOutOfRange(year)));
            continue;
        }
        let Some(anomaly) = row_mean(raw, row) else {
            issues.push(RowIssue::new(row, RowIssueKind::NoRegionalReadings));
            continue;
        };

        let entry = acc.entry(year).or_insert((0.0, 0));
        entry.0 += anomaly;
        entry.1 += 1;
        rows_used += 1;
    }

    let mut series = YearlySeries::new();
    for (year, (sum, n)) in acc {
        let mean = sum / n as f64;
        if !mean.is_finite() {
            return Err(StageError::Processing(format!(
                "mean anomaly for {year} is not finite"
            )));
        }
        series.insert(year, mean);
    }

    Ok(Normalized {
        series,
        columns: vec![ResolvedField {
            field: "date",
            column: ColumnRef {
                index: DATE_COLUMN,
                name: date_column_name(raw),
            },
        }],
        rows_read: raw.row_count(),
        rows_used,
        issues,
    })
}

/// Mean of the numeric regional readings in `row`, or `None` if there are none.
fn row_mean(raw: &RawTable, row: usize) -> Option<f64> {
    let (sum, n) = (DATE_COLUMN + 1..raw.column_count())
        .filter_map(|col| parse_number(raw.cell(col, row)))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn date_column_name(raw: &RawTable) -> String {
    raw.column(DATE_COLUMN)
        .and_then(|c| c.name())
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| format!("#{DATE_COLUMN}"))
}
