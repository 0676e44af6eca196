//! Year alignment: inner join of two yearly series.
//!
//! Only years present in both inputs survive. Values are carried through
//! unchanged; nothing is interpolated or filled.

use crate::domain::{AlignedRecord, AlignedTable, YearlySeries};

/// How many years fell on each side of the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matched: usize,
    pub emissions_only: usize,
    pub temperature_only: usize,
}

impl AlignmentStats {
    /// Years dropped from either side.
    pub fn excluded(&self) -> usize {
        self.emissions_only + self.temperature_only
    }
}

/// Join emissions and temperature series on year.
pub fn align(emissions: &YearlySeries, temperature: &YearlySeries) -> AlignedTable {
    align_with_stats(emissions, temperature).0
}

/// Like [`align`], also reporting how many years were unmatched on each side.
pub fn align_with_stats(emissions: &YearlySeries, temperature: &YearlySeries) -> (AlignedTable, AlignmentStats) {
    // `YearlySeries` iterates ascending, so the output is ordered by construction.
    let records: Vec<AlignedRecord> = emissions
        .iter()
        .filter_map(|(year, emissions)| {
            temperature.get(year).map(|anomaly| AlignedRecord {
                year,
                emissions,
                anomaly,
            })
        })
        .collect();

    let matched = records.len();
    let stats = AlignmentStats {
        matched,
        emissions_only: emissions.len() - matched,
        temperature_only: temperature.len() - matched,
    };

    (AlignedTable::from_sorted(records), stats)
}
