//! Shared "load + run" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! resolve sources -> load both tables -> normalize/align
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::Dataset;
use crate::error::AppError;
use crate::io::raw::RawTable;
use crate::io::source::{SourceSpec, load_table};
use crate::normalize::EmissionsSchema;
use crate::pipeline::{PipelineOptions, PipelineRun, run_detailed};

/// Everything needed to load and process one pair of datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub emissions: SourceSpec,
    pub temperature: SourceSpec,
    /// The temperature file starts with one header line to skip.
    pub temperature_header: bool,
    pub schema: EmissionsSchema,
}

/// Load both sources and run the pipeline.
pub fn load_and_run(config: &RunConfig) -> Result<PipelineRun, AppError> {
    // Two independent reads (possibly two HTTP fetches); overlap them.
    let (emissions, temperature) = rayon::join(
        || load_table(&config.emissions, Dataset::Emissions, true),
        || load_table(&config.temperature, Dataset::Temperature, config.temperature_header),
    );
    run_tables(&emissions?, &temperature?, config)
}

/// Run the pipeline on tables that are already in memory.
pub fn run_tables(emissions: &RawTable, temperature: &RawTable, config: &RunConfig) -> Result<PipelineRun, AppError> {
    let options = PipelineOptions {
        emissions: config.schema.clone(),
    };
    Ok(run_detailed(emissions, temperature, &options)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::{EXIT_INPUT, EXIT_SCHEMA};

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> SourceSpec {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        SourceSpec::Path(path)
    }

    fn config(emissions: SourceSpec, temperature: SourceSpec) -> RunConfig {
        RunConfig {
            emissions,
            temperature,
            temperature_header: false,
            schema: EmissionsSchema::default(),
        }
    }

    #[test]
    fn loads_files_and_aligns() {
        let dir = tempfile::tempdir().unwrap();
        let emissions = write_file(&dir, "co2.csv", "Year,Country,CO2_EMISSIONS\n2000,US,10\n2000,CN,20\n2001,US,15\n");
        let temperature = write_file(&dir, "t.csv", "2000-01,0.5,0.7\n2000-02,,0.9\n2001-01,1.0,1.2\n");
        let run = load_and_run(&config(emissions, temperature)).unwrap();
        assert_eq!(run.aligned.years().collect::<Vec<_>>(), vec![2000, 2001]);
        assert_eq!(run.aligned.records()[0].emissions, 30.0);
    }

    #[test]
    fn temperature_header_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let emissions = write_file(&dir, "co2.csv", "Year,CO2_EMISSIONS\n2000,1\n");
        let temperature = write_file(&dir, "t.csv", "Time,Anomaly\n2000-01,0.5\n");
        let mut cfg = config(emissions, temperature);
        cfg.temperature_header = true;
        let run = load_and_run(&cfg).unwrap();
        assert!(run.temperature.issues.is_empty());
        assert_eq!(run.aligned.len(), 1);
    }

    #[test]
    fn missing_file_exits_with_input_code() {
        let dir = tempfile::tempdir().unwrap();
        let temperature = write_file(&dir, "t.csv", "2000-01,0.5\n");
        let emissions = SourceSpec::Path(dir.path().join("missing.csv"));
        let err = load_and_run(&config(emissions, temperature)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn unresolved_schema_exits_with_schema_code() {
        let dir = tempfile::tempdir().unwrap();
        let emissions = write_file(&dir, "co2.csv", "Country,CO2_EMISSIONS,Sector\nUS,1,Power\n");
        let temperature = write_file(&dir, "t.csv", "2000-01,0.5\n");
        let err = load_and_run(&config(emissions, temperature)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_SCHEMA);
        assert!(err.to_string().starts_with("emissions schema unresolved"));
    }
}
