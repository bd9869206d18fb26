//! YAML configuration for pipelines and jobs.
//!
//! A pipeline config holds reader defaults (`ingestion`) and the report
//! output directory (`reporting.output_dir`). A job file adds the source to
//! extract, the optional transform and report stages, and an optional export.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use etl_ingest::{IngestError, IngestOptions, SourceKind};
use etl_model::{ChartSpec, MissingValueStrategy, Scalar, TargetType};
use etl_report::{DestinationKind, ExportOptions, ReportError};
use etl_transform::{CalculatedColumn, DerivedColumn};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PipelineError, Result};

/// Default directory for reports and charts.
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_REPORT_TITLE: &str = "Data Analytics Report";

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PipelineError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses YAML, treating an empty document as all defaults.
fn parse_yaml<T: DeserializeOwned + Default>(text: &str, origin: &str) -> Result<T> {
    let yaml_error = |source| PipelineError::Yaml {
        origin: origin.to_string(),
        source,
    };
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(yaml_error)?;
    if value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(value).map_err(yaml_error)
}

/// Pipeline-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reader defaults merged into every extract call.
    pub ingestion: IngestOptions,
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub output_dir: PathBuf,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl PipelineConfig {
    /// Loads a config file. A missing file is an error; an empty one is the
    /// default config.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        parse_yaml(&read_file(path)?, &path.display().to_string())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        parse_yaml(text, "inline config")
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reporting.output_dir = dir.into();
        self
    }
}

/// What to extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind tag: csv, json, excel or database.
    #[serde(rename = "type")]
    pub kind: String,
    /// File path, or connection string for database sources.
    pub path: String,
    #[serde(default)]
    pub options: IngestOptions,
}

impl SourceConfig {
    pub fn new(kind: SourceKind, path: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            path: path.into(),
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses the kind tag.
    pub fn source_kind(&self) -> std::result::Result<SourceKind, IngestError> {
        self.kind.parse()
    }
}

/// Steps applied by [`crate::Pipeline::transform`], in this order:
/// duplicates, missing values, type conversions, calculated columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub remove_duplicates: bool,
    pub handle_missing: Option<MissingValueStrategy>,
    /// Value for the `fill` strategy.
    pub fill_value: Option<Scalar>,
    /// Column to target type, applied in document order.
    #[serde(deserialize_with = "ordered_conversions")]
    pub type_conversions: Vec<(String, TargetType)>,
    /// Applied in list order.
    pub calculated_columns: Vec<DerivedColumn>,
}

/// Reads a `column: type` mapping without reordering its keys.
fn ordered_conversions<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, TargetType)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Conversions;

    impl<'de> Visitor<'de> for Conversions {
        type Value = Vec<(String, TargetType)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of column names to target types")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut conversions: Vec<(String, TargetType)> = Vec::new();
            while let Some((column, target)) = map.next_entry::<String, TargetType>()? {
                match conversions.iter_mut().find(|(name, _)| *name == column) {
                    Some(entry) => entry.1 = target,
                    None => conversions.push((column, target)),
                }
            }
            Ok(conversions)
        }
    }

    deserializer.deserialize_any(Conversions)
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            handle_missing: None,
            fill_value: None,
            type_conversions: Vec::new(),
            calculated_columns: Vec::new(),
        }
    }
}

impl TransformConfig {
    pub fn keep_duplicates(mut self) -> Self {
        self.remove_duplicates = false;
        self
    }

    pub fn with_missing(mut self, strategy: MissingValueStrategy, fill_value: Option<Scalar>) -> Self {
        self.handle_missing = Some(strategy);
        self.fill_value = fill_value;
        self
    }

    /// Adds a conversion; a column given twice keeps its first position and
    /// its latest target.
    pub fn with_conversion(mut self, column: impl Into<String>, target: TargetType) -> Self {
        let column = column.into();
        match self.type_conversions.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = target,
            None => self.type_conversions.push((column, target)),
        }
        self
    }

    pub fn with_calculated_column(
        mut self,
        name: impl Into<String>,
        calculation: CalculatedColumn,
    ) -> Self {
        self.calculated_columns
            .push(DerivedColumn::new(name, calculation));
        self
    }
}

/// Report stage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub include_summary: bool,
    pub charts: Vec<ChartSpec>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            include_summary: true,
            charts: Vec::new(),
        }
    }
}

impl ReportConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }
}

/// Where to write the final table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination kind tag: csv or excel.
    #[serde(rename = "type")]
    pub kind: String,
    pub path: PathBuf,
    #[serde(default)]
    pub options: ExportOptions,
}

impl ExportConfig {
    pub fn destination_kind(&self) -> std::result::Result<DestinationKind, ReportError> {
        self.kind.parse()
    }
}

/// A complete job: pipeline settings plus every stage to run.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(flatten)]
    pub settings: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub transform: Option<TransformConfig>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
    #[serde(default)]
    pub export: Option<ExportConfig>,
}

impl JobConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_file(path)?;
        serde_yaml::from_str(&text).map_err(|source| PipelineError::Yaml {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| PipelineError::Yaml {
            origin: "inline job".to_string(),
            source,
        })
    }
}
