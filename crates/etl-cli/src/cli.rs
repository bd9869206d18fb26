//! CLI argument definitions for the `etl` runner.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use etl_cli::logging::LogFormat;
use etl_ingest::SourceKind;
use etl_model::{AggFunc, MissingValueStrategy};
use etl_report::DestinationKind;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "etl",
    version,
    about = "Tabular ETL pipeline - extract, clean and report on a table",
    long_about = "Load a table from CSV, JSON, Excel or SQLite, apply cleaning steps\n\
                  (deduplication, missing values, type conversion, derived columns)\n\
                  and write an HTML report with charts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a pipeline described by command-line flags.
    Run(RunArgs),

    /// Run a pipeline described by a YAML job file.
    Job(JobArgs),

    /// Print the shape of a source and, optionally, a grouped metric.
    Summary(SummaryArgs),
}

/// Where to read the table from.
#[derive(Args)]
pub struct SourceArgs {
    /// Source file path, or a connection string such as sqlite:///data.db.
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Kind of source.
    #[arg(long = "source-type", value_enum, default_value = "csv")]
    pub source_type: SourceTypeArg,

    /// SQL query (required for database sources).
    #[arg(long = "query")]
    pub query: Option<String>,

    /// CSV field delimiter.
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Excel worksheet (default: first sheet).
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// YAML config with ingestion defaults and the report output directory.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Keep duplicated rows (they are removed by default).
    #[arg(long = "keep-duplicates")]
    pub keep_duplicates: bool,

    /// Missing-value strategy.
    #[arg(long = "missing", value_enum)]
    pub missing: Option<MissingArg>,

    /// Value used by `--missing fill`.
    #[arg(long = "fill-value")]
    pub fill_value: Option<String>,

    /// Type conversion, repeatable.
    #[arg(long = "convert", value_name = "COLUMN=TYPE")]
    pub convert: Vec<String>,

    /// Calculated column from a two-operand formula, repeatable.
    #[arg(long = "derive", value_name = "NAME=FORMULA")]
    pub derive: Vec<String>,

    /// Directory for the report and charts (overrides the config file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report title.
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Leave summary statistics out of the HTML report.
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Skip the report entirely.
    #[arg(long = "no-report", conflicts_with_all = ["bar", "line", "heatmap", "title"])]
    pub no_report: bool,

    /// Bar chart of the mean of Y per X, repeatable.
    #[arg(long = "bar", value_name = "X:Y")]
    pub bar: Vec<String>,

    /// Line chart of Y over X, optionally split by HUE, repeatable.
    #[arg(long = "line", value_name = "X:Y[:HUE]")]
    pub line: Vec<String>,

    /// Correlation heatmap of the numeric columns.
    #[arg(long = "heatmap")]
    pub heatmap: bool,

    /// Write the cleaned table to this path.
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Format for `--export`.
    #[arg(long = "export-type", value_enum, default_value = "csv")]
    pub export_type: DestinationArg,
}

#[derive(Args)]
pub struct JobArgs {
    /// YAML job file.
    #[arg(value_name = "JOB")]
    pub job: PathBuf,

    /// Directory for the report and charts (overrides the job file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column to group by for the metric table.
    #[arg(long = "group-by", requires = "metric")]
    pub group_by: Option<String>,

    /// Numeric column aggregated per group.
    #[arg(long = "metric", requires = "group_by")]
    pub metric: Option<String>,

    /// Aggregation applied to the metric.
    #[arg(long = "agg", value_enum, default_value = "sum")]
    pub agg: AggArg,

    /// Number of groups shown, largest first.
    #[arg(long = "top", default_value_t = 10)]
    pub top: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SourceTypeArg {
    Csv,
    Json,
    Excel,
    Database,
}

impl From<SourceTypeArg> for SourceKind {
    fn from(value: SourceTypeArg) -> Self {
        match value {
            SourceTypeArg::Csv => SourceKind::Csv,
            SourceTypeArg::Json => SourceKind::Json,
            SourceTypeArg::Excel => SourceKind::Excel,
            SourceTypeArg::Database => SourceKind::Database,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MissingArg {
    Drop,
    Fill,
    Ffill,
    Bfill,
    Mean,
    Median,
}

impl From<MissingArg> for MissingValueStrategy {
    fn from(value: MissingArg) -> Self {
        match value {
            MissingArg::Drop => MissingValueStrategy::Drop,
            MissingArg::Fill => MissingValueStrategy::Fill,
            MissingArg::Ffill => MissingValueStrategy::ForwardFill,
            MissingArg::Bfill => MissingValueStrategy::BackwardFill,
            MissingArg::Mean => MissingValueStrategy::Mean,
            MissingArg::Median => MissingValueStrategy::Median,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DestinationArg {
    Csv,
    Excel,
}

impl From<DestinationArg> for DestinationKind {
    fn from(value: DestinationArg) -> Self {
        match value {
            DestinationArg::Csv => DestinationKind::Csv,
            DestinationArg::Excel => DestinationKind::Excel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AggArg {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
}

impl From<AggArg> for AggFunc {
    fn from(value: AggArg) -> Self {
        match value {
            AggArg::Sum => AggFunc::Sum,
            AggArg::Mean => AggFunc::Mean,
            AggArg::Median => AggFunc::Median,
            AggArg::Min => AggFunc::Min,
            AggArg::Max => AggFunc::Max,
            AggArg::Count => AggFunc::Count,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
