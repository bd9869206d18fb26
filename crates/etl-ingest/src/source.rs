use std::fmt;
use std::str::FromStr;

use crate::error::IngestError;

/// Kind of source a table is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Csv,
    Excel,
    Json,
    /// SQLite database queried with SQL.
    Database,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Excel => "excel",
            SourceKind::Json => "json",
            SourceKind::Database => "database",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            "excel" | "xlsx" | "xls" => Ok(SourceKind::Excel),
            "json" | "ndjson" | "jsonl" => Ok(SourceKind::Json),
            "database" | "db" | "sql" | "sqlite" => Ok(SourceKind::Database),
            _ => Err(IngestError::UnsupportedSource {
                kind: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_case_insensitively() {
        assert_eq!("CSV".parse::<SourceKind>().unwrap(), SourceKind::Csv);
        assert_eq!("xlsx".parse::<SourceKind>().unwrap(), SourceKind::Excel);
        assert_eq!(" sqlite ".parse::<SourceKind>().unwrap(), SourceKind::Database);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "xml".parse::<SourceKind>().unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedSource { kind } if kind == "xml"));
    }
}
