//! Error type for pipeline orchestration.

use std::path::PathBuf;

use etl_ingest::IngestError;
use etl_report::ReportError;
use etl_transform::TransformError;
use thiserror::Error;

/// Errors surfaced by [`crate::Pipeline`] and configuration loading.
///
/// Stage errors pass through unchanged; the pipeline never recovers from them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// An operation needs a current table and none has been extracted.
    #[error("no data loaded; run extract first")]
    NoData,

    /// A configuration value is missing or unusable.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML from {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl PipelineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_pass_through() {
        let err: PipelineError = IngestError::MissingQuery.into();
        assert_eq!(err.to_string(), "a query is required for database sources");

        let err: PipelineError = TransformError::NoData.into();
        assert!(matches!(err, PipelineError::Transform(TransformError::NoData)));
    }

    #[test]
    fn config_helper_builds_config_error() {
        let err = PipelineError::config("bar chart needs x");
        assert_eq!(err.to_string(), "invalid configuration: bar chart needs x");
    }
}
