//! JSON extraction: an array of records, or newline-delimited records.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result, file_error};
use crate::options::IngestOptions;

fn is_json_lines(path: &Path, options: &IngestOptions) -> bool {
    options.json_lines.unwrap_or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jsonl" | "ndjson"))
    })
}

pub fn read_json(path: &Path, options: &IngestOptions) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| file_error(path, e))?;
    let format = if is_json_lines(path, options) {
        JsonFormat::JsonLines
    } else {
        JsonFormat::Json
    };
    JsonReader::new(file)
        .with_json_format(format)
        .finish()
        .map_err(|e| IngestError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
