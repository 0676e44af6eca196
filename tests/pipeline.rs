//! End-to-end runs through the public API: CSV text in, aligned table out.

use std::io::Write;

use climate_align::app::pipeline::{RunConfig, load_and_run};
use climate_align::domain::{AlignedRecord, ExportFormat};
use climate_align::io::export::write_aligned;
use climate_align::io::raw::RawTable;
use climate_align::io::source::SourceSpec;
use climate_align::normalize::EmissionsSchema;
use climate_align::pipeline::error::{FailureKind, PipelineError, Stage};
use climate_align::pipeline::{PipelineOptions, run};

const EMISSIONS_CSV: &str = "\
Year,Country,Sector,CO2_EMISSIONS_MT
2000,US,Power,10
2000,CN,Power,20
2001,US,Power,15
";

const TEMPERATURE_CSV: &str = "\
2000-01,0.5,0.7
2000-02,,0.9
2001-01,1.0,1.2
";

fn tables() -> (RawTable, RawTable) {
    (
        RawTable::read_csv(EMISSIONS_CSV.as_bytes(), true).unwrap(),
        RawTable::read_csv(TEMPERATURE_CSV.as_bytes(), false).unwrap(),
    )
}

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    path
}

#[test]
fn aligns_documented_example() {
    let (emissions, temperature) = tables();
    let table = run(&emissions, &temperature, &PipelineOptions::default()).unwrap();

    let records = table.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].year, 2000);
    assert_eq!(records[0].emissions, 30.0);
    assert!((records[0].anomaly - 0.75).abs() < 1e-12);
    assert_eq!(records[1].year, 2001);
    assert_eq!(records[1].emissions, 15.0);
    assert!((records[1].anomaly - 1.1).abs() < 1e-12);
}

#[test]
fn emissions_schema_failure_is_reported_for_emissions() {
    let emissions = RawTable::read_csv("Country,CO2_EMISSIONS,Sector\nUS,1,Power\n".as_bytes(), true).unwrap();
    let (_, temperature) = tables();
    let err = run(&emissions, &temperature, &PipelineOptions::default()).unwrap_err();

    assert_eq!(err.stage(), Stage::Emissions);
    assert_eq!(err.kind(), FailureKind::EmissionsSchema);
    assert!(matches!(err, PipelineError::Schema { .. }));
    assert!(err.to_string().contains("YEAR"));
}

#[test]
fn partially_overlapping_years_keep_only_the_intersection() {
    let emissions = RawTable::read_csv("YEAR,CO2_EMISSIONS\n1998,1\n1999,2\n2000,3\n".as_bytes(), true).unwrap();
    let temperature = RawTable::read_csv("1999-06,0.1\n2000-06,0.2\n2001-06,0.3\n".as_bytes(), false).unwrap();
    let table = run(&emissions, &temperature, &PipelineOptions::default()).unwrap();
    assert_eq!(table.years().collect::<Vec<_>>(), vec![1999, 2000]);
}

#[test]
fn loads_files_runs_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        emissions: SourceSpec::Path(write_temp(&dir, "co2.csv", EMISSIONS_CSV)),
        temperature: SourceSpec::Path(write_temp(&dir, "hadcrut.csv", TEMPERATURE_CSV)),
        temperature_header: false,
        schema: EmissionsSchema::default(),
    };
    let run = load_and_run(&config).unwrap();
    assert_eq!(run.aligned.len(), 2);

    let out = dir.path().join("merged.csv");
    write_aligned(&out, &run.aligned, ExportFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let rows: Vec<AlignedRecord> = reader.deserialize().map(Result::unwrap).collect();
    assert_eq!(rows, run.aligned.records());
}
