//! Error types for table transformations.

use etl_model::{ParseTagError, TargetType};
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// An operation was called before any table was set.
    #[error("no data loaded")]
    NoData,

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// Invalid or incomplete operation parameters.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("cannot convert column '{column}' to {target}: {message}")]
    TypeConversion {
        column: String,
        target: TargetType,
        message: String,
    },

    /// A caller-supplied column or mask has the wrong length.
    #[error("{context}: expected {expected} rows, got {actual}")]
    Shape {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl TransformError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        match err {
            PolarsError::ColumnNotFound(column) => Self::ColumnNotFound {
                column: column.to_string(),
            },
            other => Self::DataFrame {
                message: other.to_string(),
            },
        }
    }
}

impl From<ParseTagError> for TransformError {
    fn from(err: ParseTagError) -> Self {
        Self::config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polars_column_not_found_keeps_its_kind() {
        let err: TransformError = PolarsError::ColumnNotFound("price".into()).into();
        assert!(matches!(err, TransformError::ColumnNotFound { .. }));
        let err: TransformError = PolarsError::ComputeError("boom".into()).into();
        assert!(matches!(err, TransformError::DataFrame { .. }));
    }

    #[test]
    fn tag_errors_are_configuration_errors() {
        let err: TransformError = "linear".parse::<etl_model::MissingValueStrategy>().unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: unknown missing-value strategy 'linear'"
        );
    }
}
