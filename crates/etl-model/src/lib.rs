//! Value types shared by the ETL crates.
//!
//! Nothing here depends on polars; the types describe what to do to a table
//! (strategies, target types, aggregations, chart requests) and what a table
//! looks like afterwards (summaries).

pub mod chart;
pub mod enums;
pub mod error;
pub mod scalar;
pub mod summary;

pub use chart::ChartSpec;
pub use enums::{AggFunc, DuplicateKeep, MissingValueStrategy, TargetType};
pub use error::ParseTagError;
pub use scalar::Scalar;
pub use summary::{ColumnSummary, DataSummary, FrameStats, FrameSummary};
