//! SQL extraction from SQLite databases.

use std::path::Path;

use polars::prelude::*;
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::cells::{CellValue, ColumnBuilder, frame_from_builders};
use crate::error::{IngestError, Result};

const IN_MEMORY: &str = ":memory:";

/// Resolves a connection string to a SQLite path.
///
/// Accepts a bare path, `sqlite://<path>` or `sqlite:///<path>`. Other URL
/// schemes are rejected.
pub fn sqlite_path(connection: &str) -> Result<&str> {
    if let Some(rest) = connection.strip_prefix("sqlite://") {
        // sqlite:///relative.db keeps the path relative, as SQLAlchemy does.
        return Ok(rest.strip_prefix('/').filter(|p| !p.is_empty()).unwrap_or(rest));
    }
    match connection.split_once("://") {
        Some((scheme, _)) => Err(IngestError::Database {
            message: format!("unsupported connection scheme '{scheme}'"),
        }),
        None => Ok(connection),
    }
}

fn sql_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(v) => CellValue::Int(v),
        ValueRef::Real(v) => CellValue::Float(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Runs `query` against the database and returns its result set.
pub fn read_query(connection: &str, query: &str) -> Result<DataFrame> {
    let path = sqlite_path(connection)?;
    if path != IN_MEMORY && !Path::new(path).exists() {
        return Err(IngestError::SourceNotFound { path: path.into() });
    }
    let conn = Connection::open(path)?;
    read_with_connection(&conn, query)
}

/// Runs `query` on an open connection.
pub fn read_with_connection(conn: &Connection, query: &str) -> Result<DataFrame> {
    let mut stmt = conn.prepare(query)?;
    let mut builders: Vec<ColumnBuilder> = stmt
        .column_names()
        .into_iter()
        .map(ColumnBuilder::new)
        .collect();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        for (idx, builder) in builders.iter_mut().enumerate() {
            builder.push(sql_cell(row.get_ref(idx)?));
        }
    }
    Ok(frame_from_builders(builders)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_strings() {
        assert_eq!(sqlite_path("data/sales.db").unwrap(), "data/sales.db");
        assert_eq!(sqlite_path("sqlite:///sales.db").unwrap(), "sales.db");
        assert_eq!(sqlite_path("sqlite://sales.db").unwrap(), "sales.db");
        assert!(matches!(
            sqlite_path("postgresql://host/db"),
            Err(IngestError::Database { .. })
        ));
    }

    #[test]
    fn reads_result_set_with_types() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (id INTEGER, region TEXT, amount REAL);
             INSERT INTO sales VALUES (1, 'North', 10.5), (2, 'South', NULL), (3, 'North', 7.0);",
        )
        .unwrap();
        let df = read_with_connection(&conn, "SELECT * FROM sales ORDER BY id").unwrap();
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("region").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("amount").unwrap().null_count(), 1);
    }

    #[test]
    fn bad_query_is_database_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = read_with_connection(&conn, "SELECT * FROM missing").unwrap_err();
        assert!(matches!(err, IngestError::Database { .. }));
    }
}
