use crate::io::source::SourceError;
use crate::pipeline::error::{FailureKind, PipelineError};

/// Exit code for unreadable inputs and bad configuration.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for an unresolved schema in either dataset.
pub const EXIT_SCHEMA: u8 = 3;
/// Exit code for anything else that went wrong while processing.
pub const EXIT_UNEXPECTED: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let code = match err.kind() {
            FailureKind::EmissionsSchema | FailureKind::TemperatureSchema => EXIT_SCHEMA,
            FailureKind::Unexpected => EXIT_UNEXPECTED,
        };
        Self::new(code, err.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        Self::new(EXIT_INPUT, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
