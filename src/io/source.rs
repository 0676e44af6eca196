//! Loading raw tables from local files or HTTP(S) URLs.
//!
//! Loading sits outside the pipeline: by the time `pipeline::run` is called
//! both tables are already in memory. Failures here are reported as
//! `SourceError` and passed upward unchanged.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Dataset;
use crate::io::raw::RawTable;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Path(PathBuf),
    Url(String),
}

impl SourceSpec {
    /// Interpret a CLI/env value: `http://` and `https://` prefixes select a URL,
    /// anything else is a filesystem path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceSpec::Url(value.to_string())
        } else {
            SourceSpec::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Path(path) => write!(f, "{}", path.display()),
            SourceSpec::Url(url) => f.write_str(url),
        }
    }
}

/// A raw table could not be obtained.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{dataset} file not found: {path}")]
    NotFound { dataset: Dataset, path: PathBuf },

    #[error("failed to read {dataset} file {path}: {source}")]
    Read {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {dataset} data from {url}: {source}")]
    Fetch {
        dataset: Dataset,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {dataset} CSV from {location}: {source}")]
    Csv {
        dataset: Dataset,
        location: String,
        #[source]
        source: csv::Error,
    },
}

impl SourceError {
    pub fn dataset(&self) -> Dataset {
        match self {
            SourceError::NotFound { dataset, .. }
            | SourceError::Read { dataset, .. }
            | SourceError::Fetch { dataset, .. }
            | SourceError::Csv { dataset, .. } => *dataset,
        }
    }
}

/// Load a CSV table for `dataset` from `spec`.
///
/// `has_header` controls whether the first record is taken as column names.
pub fn load_table(spec: &SourceSpec, dataset: Dataset, has_header: bool) -> Result<RawTable, SourceError> {
    let table = match spec {
        SourceSpec::Path(path) => load_file(path, dataset, has_header)?,
        SourceSpec::Url(url) => load_url(url, dataset, has_header)?,
    };
    info!(
        %dataset,
        source = %spec,
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded raw table"
    );
    Ok(table)
}

fn load_file(path: &Path, dataset: Dataset, has_header: bool) -> Result<RawTable, SourceError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound {
                dataset,
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Read {
                dataset,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    RawTable::read_csv(file, has_header).map_err(|source| SourceError::Csv {
        dataset,
        location: path.display().to_string(),
        source,
    })
}

fn load_url(url: &str, dataset: Dataset, has_header: bool) -> Result<RawTable, SourceError> {
    debug!(%dataset, url, "fetching remote table");
    let fetch_err = |source: reqwest::Error| SourceError::Fetch {
        dataset,
        url: url.to_string(),
        source,
    };

    let body = Client::new()
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(fetch_err)?;

    RawTable::read_csv(body.as_ref(), has_header).map_err(|source| SourceError::Csv {
        dataset,
        location: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            SourceSpec::parse("https://example.org/hadcrut.csv"),
            SourceSpec::Url("https://example.org/hadcrut.csv".to_string())
        );
        assert_eq!(
            SourceSpec::parse(" data/co2.csv "),
            SourceSpec::Path(PathBuf::from("data/co2.csv"))
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let spec = SourceSpec::Path(PathBuf::from("definitely/not/here.csv"));
        let err = load_table(&spec, Dataset::Emissions, true).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
        assert_eq!(err.dataset(), Dataset::Emissions);
        assert!(err.to_string().contains("emissions file not found"));
    }
}
