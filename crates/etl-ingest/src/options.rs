//! Reader options shared by every source kind.

use serde::{Deserialize, Serialize};

/// Options passed to a reader. Every field is optional; unset fields fall
/// back to the pipeline-wide defaults and then to the reader's own default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// CSV field separator (single ASCII character).
    pub delimiter: Option<char>,
    /// CSV text encoding: `utf-8` or `utf-8-lossy`.
    pub encoding: Option<String>,
    pub has_header: Option<bool>,
    /// Rows scanned to infer CSV column types; unset scans the whole file.
    pub infer_schema_length: Option<usize>,
    pub try_parse_dates: Option<bool>,
    /// Excel worksheet; unset reads the first sheet.
    pub sheet_name: Option<String>,
    /// Read JSON as newline-delimited records; unset decides by extension.
    pub json_lines: Option<bool>,
    /// SQL query for database sources.
    pub query: Option<String>,
}

impl IngestOptions {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_sheet_name(mut self, sheet: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet.into());
        self
    }

    /// Fills unset fields from `defaults`.
    pub fn with_defaults(&self, defaults: &IngestOptions) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter.or(defaults.delimiter),
            encoding: self.encoding.clone().or_else(|| defaults.encoding.clone()),
            has_header: self.has_header.or(defaults.has_header),
            infer_schema_length: self.infer_schema_length.or(defaults.infer_schema_length),
            try_parse_dates: self.try_parse_dates.or(defaults.try_parse_dates),
            sheet_name: self
                .sheet_name
                .clone()
                .or_else(|| defaults.sheet_name.clone()),
            json_lines: self.json_lines.or(defaults.json_lines),
            query: self.query.clone().or_else(|| defaults.query.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_options_win_over_defaults() {
        let defaults = IngestOptions {
            delimiter: Some(';'),
            encoding: Some("utf-8".to_string()),
            ..IngestOptions::default()
        };
        let merged = IngestOptions::default()
            .with_delimiter('|')
            .with_defaults(&defaults);
        assert_eq!(merged.delimiter, Some('|'));
        assert_eq!(merged.encoding.as_deref(), Some("utf-8"));
        assert_eq!(merged.query, None);
    }
}
