//! Shape and memory summaries of a held table.

use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Summary returned by the pipeline; `NoData` before anything is extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataSummary {
    NoData,
    Loaded(FrameStats),
}

impl DataSummary {
    pub fn stats(&self) -> Option<&FrameStats> {
        match self {
            DataSummary::NoData => None,
            DataSummary::Loaded(stats) => Some(stats),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub memory_bytes: usize,
}

impl FrameStats {
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / BYTES_PER_MB
    }

    /// Memory footprint formatted as `"<n.nn> MB"`.
    pub fn memory_usage(&self) -> String {
        format!("{:.2} MB", self.memory_mb())
    }
}

/// Per-column view of the transformer's current table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl FrameSummary {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}
