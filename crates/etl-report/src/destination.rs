use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Kind of destination the current table is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    Csv,
    Excel,
}

impl DestinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationKind::Csv => "csv",
            DestinationKind::Excel => "excel",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DestinationKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DestinationKind::Csv),
            "excel" | "xlsx" => Ok(DestinationKind::Excel),
            _ => Err(ReportError::UnsupportedDestination {
                kind: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_destination_tags() {
        assert_eq!("csv".parse::<DestinationKind>().unwrap(), DestinationKind::Csv);
        assert_eq!("Excel".parse::<DestinationKind>().unwrap(), DestinationKind::Excel);
        assert_eq!("xlsx".parse::<DestinationKind>().unwrap(), DestinationKind::Excel);
    }

    #[test]
    fn rejects_unknown_destination() {
        let err = "parquet".parse::<DestinationKind>().unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedDestination { kind } if kind == "parquet"));
    }
}
