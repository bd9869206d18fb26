//! Pipeline orchestration for the ETL workspace.
//!
//! [`Pipeline`] sequences extraction (`etl-ingest`), transformation
//! (`etl-transform`) and reporting (`etl-report`) against one current table,
//! configured from YAML through [`config`].

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{
    ExportConfig, JobConfig, PipelineConfig, ReportConfig, ReportingConfig, SourceConfig,
    TransformConfig,
};
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
