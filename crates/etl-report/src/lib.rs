//! Report output for the ETL pipeline.
//!
//! - **HTML report**: title, timestamp, optional summary statistics and a
//!   preview of the first rows.
//! - **Charts**: bar, line, pie and correlation heatmap PNGs via plotters.
//! - **Export**: CSV through polars, Excel through simple_excel_writer.

mod common;

pub mod charts;
pub mod destination;
pub mod error;
pub mod export;
pub mod html;
pub mod reporter;
pub mod stats;

pub use charts::{ChartKind, correlation_matrix};
pub use destination::DestinationKind;
pub use error::{ReportError, Result};
pub use export::{ExportOptions, export, write_csv, write_excel};
pub use html::{PREVIEW_ROWS, render_html};
pub use reporter::Reporter;
pub use stats::{STATISTIC_COLUMN, summary_statistics};
