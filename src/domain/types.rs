//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the normalizers and consumed by the aligner
//! - exported to JSON/CSV
//! - rendered by the terminal front-ends

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Smallest calendar year accepted as a series key.
pub const MIN_YEAR: i32 = 1000;
/// Largest calendar year accepted as a series key.
pub const MAX_YEAR: i32 = 9999;

/// Whether `year` is a plausible historical calendar year.
pub fn is_plausible_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// One value per calendar year.
///
/// Backed by a `BTreeMap`, so iteration is always in ascending year order and a
/// year can never appear twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlySeries {
    values: BTreeMap<i32, f64>,
}

impl YearlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the value for `year`, returning the previous one.
    pub fn insert(&mut self, year: i32, value: f64) -> Option<f64> {
        self.values.insert(year, value)
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.values.contains_key(&year)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    /// `(year, value)` pairs in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(&y, &v)| (y, v))
    }

    pub fn first_year(&self) -> Option<i32> {
        self.values.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.values.keys().next_back().copied()
    }
}

impl FromIterator<(i32, f64)> for YearlySeries {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// One row of the aligned output table.
///
/// Column names match the dashboard's merged-data view so exported
/// CSVs drop into existing spreadsheets unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Global CO2 Emissions")]
    pub emissions: f64,
    #[serde(rename = "Temperature_Anomaly")]
    pub anomaly: f64,
}

/// The pipeline's terminal artifact: records strictly ascending by year.
///
/// Serialize-only; the aligner is the one way to build a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlignedTable {
    records: Vec<AlignedRecord>,
}

impl AlignedTable {
    /// Build from records already sorted by year with no duplicates.
    ///
    /// Only the aligner constructs tables; it iterates a `BTreeMap`, which
    /// guarantees the ordering.
    pub(crate) fn from_sorted(records: Vec<AlignedRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].year < w[1].year));
        Self { records }
    }

    pub fn records(&self) -> &[AlignedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|r| r.year)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.records.first().map(|r| r.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.records.last().map(|r| r.year)
    }

    /// `(year, emissions)` points for charting.
    pub fn emissions_points(&self) -> Vec<(f64, f64)> {
        self.records.iter().map(|r| (r.year as f64, r.emissions)).collect()
    }

    /// `(year, anomaly)` points for charting.
    pub fn anomaly_points(&self) -> Vec<(f64, f64)> {
        self.records.iter().map(|r| (r.year as f64, r.anomaly)).collect()
    }

    /// Headline numbers shown above the charts.
    pub fn key_stats(&self) -> KeyStats {
        KeyStats {
            start_year: self.first_year(),
            end_year: self.last_year(),
            data_points: self.len(),
        }
    }
}

/// Start year, end year and number of aligned years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStats {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub data_points: usize,
}

/// Which dataset a stage works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Emissions,
    Temperature,
}

impl Dataset {
    pub fn display_name(self) -> &'static str {
        match self {
            Dataset::Emissions => "emissions",
            Dataset::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which chart the `run` command draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Global CO₂ emissions per year.
    Emissions,
    /// Mean temperature anomaly per year.
    Anomaly,
    /// Both series on one grid, each scaled to its own range.
    Dual,
}

/// Output format for `climate export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_iterates_in_year_order() {
        let series: YearlySeries = [(2001, 1.0), (1999, 2.0), (2000, 3.0)].into_iter().collect();
        let years: Vec<i32> = series.years().collect();
        assert_eq!(years, vec![1999, 2000, 2001]);
        assert_eq!(series.first_year(), Some(1999));
        assert_eq!(series.last_year(), Some(2001));
    }

    #[test]
    fn key_stats_empty_table() {
        let stats = AlignedTable::default().key_stats();
        assert_eq!(stats.start_year, None);
        assert_eq!(stats.end_year, None);
        assert_eq!(stats.data_points, 0);
    }

    #[test]
    fn plausible_year_bounds() {
        assert!(is_plausible_year(1850));
        assert!(!is_plausible_year(999));
        assert!(!is_plausible_year(10_000));
    }
}
