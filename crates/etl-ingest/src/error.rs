//! Error types for data extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting a table from a source.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Source Selection ===
    /// The requested source kind is not one of csv, excel, json, database.
    #[error("unsupported source type: {kind}")]
    UnsupportedSource { kind: String },

    /// A database source was requested without a query.
    #[error("a query is required for database sources")]
    MissingQuery,

    /// An ingestion option has a value the reader cannot use.
    #[error("invalid {option} option: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },

    // === File System Errors ===
    /// Source file not found.
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the CSV reader cannot decode.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding { path: PathBuf, encoding: String },

    // === Format Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to parse JSON with Polars.
    #[error("failed to parse JSON {path}: {message}")]
    Json { path: PathBuf, message: String },

    /// Failed to open or read an Excel workbook.
    #[error("failed to read workbook {path}: {message}")]
    Excel { path: PathBuf, message: String },

    /// Connection or query failure.
    #[error("database error: {message}")]
    Database { message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for IngestError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

/// Maps an I/O error on `path` to `SourceNotFound` or `FileRead`.
pub(crate) fn file_error(path: &std::path::Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::SourceNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
