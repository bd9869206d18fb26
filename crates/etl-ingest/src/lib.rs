//! Table extraction for the ETL pipeline.
//!
//! Every source kind produces a polars `DataFrame`:
//!
//! - **CSV**: polars' CSV reader with configurable delimiter and encoding.
//! - **JSON**: a top-level array of records, or newline-delimited records.
//! - **Excel**: one worksheet read through calamine.
//! - **Database**: the result set of a SQL query against SQLite.

pub mod csv;
pub mod database;
pub mod error;
pub mod excel;
pub mod ingestor;
pub mod json;
pub mod options;
pub mod polars_utils;
pub mod source;

mod cells;

pub use error::{IngestError, Result};
pub use ingestor::Ingestor;
pub use options::IngestOptions;
pub use polars_utils::{any_to_f64, any_to_string, format_numeric, numeric_values};
pub use source::SourceKind;
