use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use crate::error::{IngestError, Result};
use crate::options::IngestOptions;
use crate::source::SourceKind;
use crate::{csv, database, excel, json};

/// Extracts tables from any supported source.
///
/// Holds pipeline-wide reader defaults; options passed to [`Ingestor::load`]
/// take precedence field by field.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    defaults: IngestOptions,
}

impl Ingestor {
    pub fn new(defaults: IngestOptions) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &IngestOptions {
        &self.defaults
    }

    /// Loads a table from `location`: a file path, or a connection string
    /// for database sources.
    pub fn load(
        &self,
        kind: SourceKind,
        location: &str,
        options: &IngestOptions,
    ) -> Result<DataFrame> {
        let options = options.with_defaults(&self.defaults);
        let span = info_span!("extract", source = %kind, location);
        let _guard = span.enter();
        let start = Instant::now();

        let df = match kind {
            SourceKind::Csv => csv::read_csv(Path::new(location), &options)?,
            SourceKind::Json => json::read_json(Path::new(location), &options)?,
            SourceKind::Excel => excel::read_excel(Path::new(location), &options)?,
            SourceKind::Database => {
                let query = options
                    .query
                    .as_deref()
                    .filter(|q| !q.trim().is_empty())
                    .ok_or(IngestError::MissingQuery)?;
                database::read_query(location, query)?
            }
        };

        info!(
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "loaded {} rows from {}",
            df.height(),
            kind
        );
        Ok(df)
    }
}
