//! Table transformations for the ETL pipeline.
//!
//! [`Transformer`] owns one table and applies operations to it in the order
//! they are called:
//!
//! - **remove_duplicates**: drop repeated rows, keeping first or last
//! - **handle_missing_values**: drop, constant fill, directional fill, mean/median
//! - **convert_types**: strict coercion, including text to datetime/date/bool
//! - **add_calculated_column**: closures, polars expressions, or formulas
//! - **filter_rows** / **rename_columns** / **aggregate**
//!
//! Each applied operation is recorded as a [`StepReport`].

pub mod calculated;
pub mod convert;
pub mod error;
pub mod history;
pub mod transformer;

mod aggregate;
mod missing;

pub use calculated::{CalculatedColumn, ColumnFn, DerivedColumn};
pub use error::{Result, TransformError};
pub use history::{StepReport, TransformStep};
pub use transformer::Transformer;
