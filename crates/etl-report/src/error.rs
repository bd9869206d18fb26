//! Error types for report and export output.

use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors raised while writing reports, charts and exports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create or write a file.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Drawing backend failure while rendering a chart.
    #[error("chart rendering failed: {message}")]
    Chart { message: String },

    /// The chart request cannot be drawn from this table.
    #[error("invalid chart: {message}")]
    InvalidChart { message: String },

    #[error("column not found: {column}")]
    ColumnNotFound { column: String },

    /// Destination tag is not csv or excel.
    #[error("unsupported destination type: {kind}")]
    UnsupportedDestination { kind: String },

    #[error("failed to export {path}: {message}")]
    Export { path: PathBuf, message: String },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ReportError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        match err {
            polars::prelude::PolarsError::ColumnNotFound(name) => Self::ColumnNotFound {
                column: name.to_string(),
            },
            other => Self::DataFrame {
                message: other.to_string(),
            },
        }
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<DrawingAreaErrorKind<E>> for ReportError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Chart {
            message: err.to_string(),
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_destination_names_the_tag() {
        let err = ReportError::UnsupportedDestination {
            kind: "parquet".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported destination type: parquet");
    }

    #[test]
    fn io_error_keeps_source() {
        let err = ReportError::Io {
            path: PathBuf::from("out/report.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("out/report.html"));
    }
}
