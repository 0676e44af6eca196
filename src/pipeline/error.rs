//! Error types for the normalization/alignment pipeline.

use std::fmt;

use thiserror::Error;

/// A required semantic column could not be resolved.
///
/// Fatal for the whole run: without the key columns no aggregation is
/// meaningful, so this is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No column name contains the keyword declared for `field`.
    #[error("no column matching `{keyword}` for {field} (columns: {})", display_columns(.available))]
    MissingColumn {
        field: &'static str,
        keyword: String,
        available: Vec<String>,
    },

    /// A positional table is narrower than its layout requires.
    #[error("expected at least {required} columns ({layout}), found {found}")]
    TooFewColumns {
        required: usize,
        found: usize,
        layout: &'static str,
    },
}

fn display_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        "none".to_string()
    } else {
        columns.join(", ")
    }
}

/// Failure inside a single normalizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Processing(String),
}

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Emissions,
    Temperature,
    Alignment,
}

impl Stage {
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Emissions => "emissions",
            Stage::Temperature => "temperature",
            Stage::Alignment => "alignment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The coarse failure classes a presentation layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmissionsSchema,
    TemperatureSchema,
    Unexpected,
}

/// The single failure value returned by `pipeline::run`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("{stage} schema unresolved: {source}")]
    Schema {
        stage: Stage,
        #[source]
        source: SchemaError,
    },

    #[error("unexpected failure while processing {stage} data: {message}")]
    Processing { stage: Stage, message: String },
}

impl PipelineError {
    pub(crate) fn from_stage(stage: Stage, err: StageError) -> Self {
        match err {
            StageError::Schema(source) => PipelineError::Schema { stage, source },
            StageError::Processing(message) => PipelineError::Processing { stage, message },
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Schema { stage, .. } | PipelineError::Processing { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Schema {
                stage: Stage::Emissions,
                ..
            } => FailureKind::EmissionsSchema,
            PipelineError::Schema {
                stage: Stage::Temperature,
                ..
            } => FailureKind::TemperatureSchema,
            PipelineError::Schema { .. } | PipelineError::Processing { .. } => FailureKind::Unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_lists_available_columns() {
        let err = SchemaError::MissingColumn {
            field: "year",
            keyword: "YEAR".to_string(),
            available: vec!["Country".to_string(), "CO2_EMISSIONS".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "no column matching `YEAR` for year (columns: Country, CO2_EMISSIONS)"
        );
    }

    #[test]
    fn kind_follows_stage() {
        let schema = SchemaError::TooFewColumns {
            required: 2,
            found: 1,
            layout: "date + regional readings",
        };
        let err = PipelineError::from_stage(Stage::Temperature, schema.into());
        assert_eq!(err.kind(), FailureKind::TemperatureSchema);
        assert_eq!(err.stage(), Stage::Temperature);

        let err = PipelineError::from_stage(Stage::Emissions, StageError::Processing("boom".into()));
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert_eq!(
            err.to_string(),
            "unexpected failure while processing emissions data: boom"
        );
    }
}
