use std::path::PathBuf;

use etl_model::{AggFunc, FrameStats, FrameSummary};
use etl_transform::StepReport;
use polars::prelude::DataFrame;

/// What `etl run` and `etl job` produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub source: String,
    pub stats: Option<FrameStats>,
    pub steps: Vec<StepReport>,
    pub output_dir: PathBuf,
    pub artifacts: Vec<PathBuf>,
    pub export: Option<PathBuf>,
}

/// What `etl summary` found in a source.
#[derive(Debug)]
pub struct SourceSummary {
    pub source: String,
    pub stats: FrameStats,
    pub columns: FrameSummary,
    pub insights: Option<GroupInsights>,
}

#[derive(Debug)]
pub struct GroupInsights {
    pub group_by: String,
    pub metric: String,
    pub func: AggFunc,
    pub table: DataFrame,
}
