//! CSV extraction.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result, file_error};
use crate::options::IngestOptions;

/// Resolves an encoding label to the reader's encoding.
pub fn resolve_encoding(path: &Path, label: Option<&str>) -> Result<CsvEncoding> {
    let Some(label) = label else {
        return Ok(CsvEncoding::Utf8);
    };
    match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "utf-8" | "utf8" | "utf-8-sig" => Ok(CsvEncoding::Utf8),
        "utf-8-lossy" | "utf8-lossy" | "lossy" => Ok(CsvEncoding::LossyUtf8),
        _ => Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: label.to_string(),
        }),
    }
}

/// Rejects files that start with a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| file_error(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| file_error(path, e))?;
    if bytes_read == 2 {
        let encoding = match buffer {
            [0xFF, 0xFE] => Some("UTF-16 LE"),
            [0xFE, 0xFF] => Some("UTF-16 BE"),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: encoding.to_string(),
            });
        }
    }
    Ok(())
}

fn separator(delimiter: Option<char>) -> Result<u8> {
    match delimiter {
        None => Ok(b','),
        Some(c) if c.is_ascii() => Ok(c as u8),
        Some(c) => Err(IngestError::InvalidOption {
            option: "delimiter",
            message: format!("'{c}' is not a single-byte character"),
        }),
    }
}

/// Reads a delimited text file into a DataFrame.
///
/// Empty fields become missing values. Column types are inferred from the
/// whole file unless `infer_schema_length` limits the scan.
pub fn read_csv(path: &Path, options: &IngestOptions) -> Result<DataFrame> {
    let encoding = resolve_encoding(path, options.encoding.as_deref())?;
    validate_encoding(path)?;
    let separator = separator(options.delimiter)?;
    let try_parse_dates = options.try_parse_dates.unwrap_or(false);

    CsvReadOptions::default()
        .with_has_header(options.has_header.unwrap_or(true))
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|parse| {
            parse
                .with_separator(separator)
                .with_encoding(encoding)
                .with_try_parse_dates(try_parse_dates)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
