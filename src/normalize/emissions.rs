//! Emissions normalizer.
//!
//! The input has one row per sector/country/year with arbitrary extra columns.
//! We resolve a year column and a value column by keyword, then sum the values
//! of all rows sharing a year into one global total.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{YearlySeries, is_plausible_year};
use crate::io::raw::RawTable;
use crate::normalize::coerce::{parse_number, parse_year};
use crate::normalize::{Normalized, ResolvedField, RowIssue, RowIssueKind};
use crate::pipeline::error::StageError;
use crate::schema::{DEFAULT_VALUE_KEYWORD, DEFAULT_YEAR_KEYWORD, FieldRule, resolve_field};

/// Resolution rules for the emissions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionsSchema {
    pub year: FieldRule,
    pub value: FieldRule,
}

impl EmissionsSchema {
    pub fn new(year_keyword: impl Into<String>, value_keyword: impl Into<String>) -> Self {
        Self {
            year: FieldRule::new("year", year_keyword),
            value: FieldRule::new("emissions", value_keyword),
        }
    }
}

impl Default for EmissionsSchema {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR_KEYWORD, DEFAULT_VALUE_KEYWORD)
    }
}

/// Aggregate an emissions table to one summed value per year.
///
/// - rows whose year is not a plausible whole number are dropped
/// - non-numeric values are excluded from the sum; the year itself is kept,
///   so a year whose values are all invalid totals `0.0`
pub fn normalize_emissions(raw: &RawTable, schema: &EmissionsSchema) -> Result<Normalized, StageError> {
    let year_col = resolve_field(raw, &schema.year)?;
    let value_col = resolve_field(raw, &schema.value)?;
    debug!(year = %year_col.name, value = %value_col.name, "resolved emissions columns");

    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    let mut issues = Vec::new();
    let mut rows_used = 0usize;

    for row in 0..raw.row_count() {
        let year_cell = raw.cell(year_col.index, row);
        let Some(year) = parse_year(year_cell) else {
            issues.push(RowIssue::new(row, RowIssueKind::InvalidYear(year_cell.to_string())));
            continue;
        };
        if !is_plausible_year(year) {
            issues.push(RowIssue::new(row, RowIssueKind::YearOutOfRange(year)));
            continue;
        }

        let total = totals.entry(year).or_insert(0.0);
        let value_cell = raw.cell(value_col.index, row);
        match parse_number(value_cell) {
            Some(value) => {
                *total += value;
                rows_used += 1;
            }
            None => issues.push(RowIssue::new(row, RowIssueKind::InvalidValue(value_cell.to_string()))),
        }
    }

    if let Some((year, _)) = totals.iter().find(|(_, total)| !total.is_finite()) {
        return Err(StageError::Processing(format!(
            "emissions total for {year} is not finite"
        )));
    }

    Ok(Normalized {
        series: totals.into_iter().collect::<YearlySeries>(),
        columns: vec![
            ResolvedField {
                field: schema.year.field,
                column: year_col,
            },
            ResolvedField {
                field: schema.value.field,
                column: value_col,
            },
        ],
        rows_read: raw.row_count(),
        rows_used,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::raw::Cell;
    use crate::pipeline::error::SchemaError;

    fn emissions_table(rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::headed(["Year", "Country", "CO2_EMISSIONS_MT"], rows)
    }

    fn row(year: &str, country: &str, value: impl Into<Cell>) -> Vec<Cell> {
        vec![year.into(), country.into(), value.into()]
    }

    #[test]
    fn sums_sectors_per_year() {
        let raw = emissions_table(vec![
            row("2000", "US", 10),
            row("2000", "CN", 20),
            row("2001", "US", 15),
        ]);
        let out = normalize_emissions(&raw, &EmissionsSchema::default()).unwrap();
        assert_eq!(out.series.get(2000), Some(30.0));
        assert_eq!(out.series.get(2001), Some(15.0));
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.rows_used, 3);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn invalid_values_are_excluded_from_sum() {
        let raw = emissions_table(vec![
            row("2000", "US", 10),
            row("2000", "CN", "n/a"),
            row("2000", "IN", None::<f64>),
            row("2001", "US", "unknown"),
        ]);
        let out = normalize_emissions(&raw, &EmissionsSchema::default()).unwrap();
        assert_eq!(out.series.get(2000), Some(10.0));
        // The year stays, contributing an empty sum.
        assert_eq!(out.series.get(2001), Some(0.0));
        assert_eq!(out.rows_used, 1);
        assert_eq!(out.issues.len(), 3);
        assert_eq!(out.issues[0], RowIssue::new(1, RowIssueKind::InvalidValue("n/a".into())));
    }

    #[test]
    fn unparseable_years_drop_the_row() {
        let raw = emissions_table(vec![
            row("2000", "US", 10),
            row("", "US", 99),
            row("twenty", "US", 99),
            row("0", "US", 99),
            row("2000.0", "CN", 5),
        ]);
        let out = normalize_emissions(&raw, &EmissionsSchema::default()).unwrap();
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.series.get(2000), Some(15.0));
        let counts = out.issue_counts();
        assert_eq!(counts.get("invalid year"), Some(&2));
        assert_eq!(counts.get("year out of range"), Some(&1));
    }

    #[test]
    fn missing_year_column_is_schema_error() {
        let raw = RawTable::headed(["Country", "CO2_EMISSIONS", "Sector"], vec![vec!["US", "1", "Power"]]);
        let err = normalize_emissions(&raw, &EmissionsSchema::default()).unwrap_err();
        assert!(matches!(
            err,
            StageError::Schema(SchemaError::MissingColumn { field: "year", .. })
        ));
    }

    #[test]
    fn custom_keywords() {
        let raw = RawTable::headed(["period", "total_ghg"], vec![vec!["1990", "7"]]);
        let schema = EmissionsSchema::new("period", "ghg");
        let out = normalize_emissions(&raw, &schema).unwrap();
        assert_eq!(out.series.get(1990), Some(7.0));
        assert_eq!(out.columns[1].column.name, "total_ghg");
    }

    #[test]
    fn overflowing_total_is_processing_error() {
        let raw = emissions_table(vec![row("2000", "US", f64::MAX), row("2000", "CN", f64::MAX)]);
        let err = normalize_emissions(&raw, &EmissionsSchema::default()).unwrap_err();
        assert!(matches!(err, StageError::Processing(_)));
    }
}
