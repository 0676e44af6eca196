//! Pipeline orchestration: two raw tables in, one aligned table (or one error) out.
//!
//! The normalizers share nothing, so they run side by side on the rayon pool and
//! join before alignment. Every stage failure, including a panic, comes back as
//! a single `PipelineError` tagged with the stage that produced it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::align::{AlignmentStats, align_with_stats};
use crate::domain::AlignedTable;
use crate::io::raw::RawTable;
use crate::normalize::{EmissionsSchema, Normalized, normalize_emissions, normalize_temperature};

pub mod error;

use error::{PipelineError, Stage, StageError};

/// Knobs for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub emissions: EmissionsSchema,
}

/// Everything a run produced, for front-ends that report more than the table.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub aligned: AlignedTable,
    pub emissions: Normalized,
    pub temperature: Normalized,
    pub alignment: AlignmentStats,
}

/// Normalize both tables and join them on year.
pub fn run(
    raw_emissions: &RawTable,
    raw_temperature: &RawTable,
    options: &PipelineOptions,
) -> Result<AlignedTable, PipelineError> {
    run_detailed(raw_emissions, raw_temperature, options).map(|run| run.aligned)
}

/// Like [`run`], keeping the per-stage reports.
pub fn run_detailed(
    raw_emissions: &RawTable,
    raw_temperature: &RawTable,
    options: &PipelineOptions,
) -> Result<PipelineRun, PipelineError> {
    let span = info_span!(
        "pipeline",
        emissions_rows = raw_emissions.row_count(),
        temperature_rows = raw_temperature.row_count()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let (emissions, temperature) = rayon::join(
        || {
            let _stage = info_span!(parent: &span, "normalize", stage = %Stage::Emissions).entered();
            guard_stage(Stage::Emissions, || normalize_emissions(raw_emissions, &options.emissions))
        },
        || {
            let _stage = info_span!(parent: &span, "normalize", stage = %Stage::Temperature).entered();
            guard_stage(Stage::Temperature, || normalize_temperature(raw_temperature))
        },
    );

    // Emissions is reported first when both stages fail.
    let emissions = emissions?;
    let temperature = temperature?;
    log_normalized(Stage::Emissions, &emissions);
    log_normalized(Stage::Temperature, &temperature);

    let (aligned, alignment) = guard_stage(Stage::Alignment, || {
        Ok(align_with_stats(&emissions.series, &temperature.series))
    })?;

    if alignment.excluded() > 0 {
        warn!(
            emissions_only = alignment.emissions_only,
            temperature_only = alignment.temperature_only,
            "years present in only one dataset were excluded"
        );
    }
    info!(
        years = aligned.len(),
        first = ?aligned.first_year(),
        last = ?aligned.last_year(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );

    Ok(PipelineRun {
        aligned,
        emissions,
        temperature,
        alignment,
    })
}

/// Run one stage, converting its error or panic into a `PipelineError`.
fn guard_stage<T>(stage: Stage, f: impl FnOnce() -> Result<T, StageError>) -> Result<T, PipelineError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(|err| PipelineError::from_stage(stage, err)),
        Err(payload) => Err(PipelineError::Processing {
            stage,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn log_normalized(stage: Stage, normalized: &Normalized) {
    for issue in &normalized.issues {
        debug!(stage = %stage, row = issue.row, issue = %issue.kind, "row skipped");
    }
    info!(
        stage = %stage,
        rows_read = normalized.rows_read,
        rows_used = normalized.rows_used,
        issues = normalized.issues.len(),
        years = normalized.series.len(),
        "normalized"
    );
}
