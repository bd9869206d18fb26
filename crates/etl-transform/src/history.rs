//! Record of the operations applied to a transformer's table.

use std::fmt;

use etl_model::{DuplicateKeep, MissingValueStrategy};
use serde::Serialize;

/// One applied operation and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformStep {
    RemoveDuplicates { keep: DuplicateKeep },
    HandleMissing { strategy: MissingValueStrategy },
    ConvertTypes { columns: Vec<String> },
    AddCalculatedColumn { name: String },
    FilterRows,
    RenameColumns { renamed: usize },
    Aggregate { group_by: Vec<String> },
}

impl TransformStep {
    pub fn name(&self) -> &'static str {
        match self {
            TransformStep::RemoveDuplicates { .. } => "remove_duplicates",
            TransformStep::HandleMissing { .. } => "handle_missing",
            TransformStep::ConvertTypes { .. } => "convert_types",
            TransformStep::AddCalculatedColumn { .. } => "add_calculated_column",
            TransformStep::FilterRows => "filter_rows",
            TransformStep::RenameColumns { .. } => "rename_columns",
            TransformStep::Aggregate { .. } => "aggregate",
        }
    }
}

impl fmt::Display for TransformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    #[serde(flatten)]
    pub step: TransformStep,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StepReport {
    /// Rows removed by the step; zero when the step added rows.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}
