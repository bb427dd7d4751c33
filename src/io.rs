//! File adapters for tables (CSV, Parquet) and structured objects
//! (JSON, bincode)

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::{PreprocessError, Result};

/// Rows used for CSV schema inference
pub const INFER_SCHEMA_LENGTH: usize = 10_000;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Tabular text
    Csv,
    /// Tabular columnar
    Parquet,
    /// Structured object
    Json,
    /// Serialized binary object
    Model,
}

impl FileFormat {
    /// Infer the format from the path suffix
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        extension.parse().map_err(|_| {
            PreprocessError::UnsupportedFormat(format!(
                "'.{}' ({}). Supported formats: csv, parquet, json, bin",
                extension,
                path.display()
            ))
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Json => "json",
            FileFormat::Model => "bin",
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, FileFormat::Csv | FileFormat::Parquet)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = PreprocessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            "json" => Ok(FileFormat::Json),
            "bin" | "model" => Ok(FileFormat::Model),
            other => Err(PreprocessError::UnsupportedFormat(format!(
                "'{}'. Supported formats: csv, parquet, json, bin",
                other
            ))),
        }
    }
}

/// Read a table. The format comes from the suffix unless given explicitly.
pub fn read_table(path: &Path, format: Option<FileFormat>) -> Result<DataFrame> {
    let format = resolve_format(path, format)?;

    let df = match format {
        FileFormat::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(INFER_SCHEMA_LENGTH))
            .finish()?
            .collect()?,
        FileFormat::Parquet => LazyFrame::scan_parquet(path, Default::default())?.collect()?,
        other => return Err(not_tabular(other, path)),
    };

    info!("Successfully read file from {}", path.display());
    Ok(df)
}

/// Write a table, creating parent directories as needed.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    if !format.is_tabular() {
        return Err(not_tabular(format, path));
    }

    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    match format {
        FileFormat::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        _ => {
            ParquetWriter::new(file).finish(df)?;
        }
    }

    info!("Successfully wrote file to {}", path.display());
    Ok(())
}

/// Read a structured object (JSON or bincode).
pub fn read_object<T: DeserializeOwned>(path: &Path, format: Option<FileFormat>) -> Result<T> {
    let format = resolve_format(path, format)?;
    let reader = BufReader::new(File::open(path)?);

    let value = match format {
        FileFormat::Json => serde_json::from_reader(reader)?,
        FileFormat::Model => bincode::deserialize_from(reader)?,
        other => {
            return Err(PreprocessError::UnsupportedFormat(format!(
                "'{}' is a table format and cannot hold an object ({})",
                other,
                path.display()
            )))
        }
    };

    info!("Successfully read file from {}", path.display());
    Ok(value)
}

/// Write a structured object, creating parent directories as needed.
pub fn write_object<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    if format.is_tabular() {
        return Err(PreprocessError::UnsupportedFormat(format!(
            "'{}' is a table format and cannot hold an object ({})",
            format,
            path.display()
        )));
    }

    ensure_parent_dir(path)?;
    let writer = BufWriter::new(File::create(path)?);
    match format {
        FileFormat::Json => serde_json::to_writer_pretty(writer, value)?,
        _ => bincode::serialize_into(writer, value)?,
    }

    info!("Successfully wrote file to {}", path.display());
    Ok(())
}

fn resolve_format(path: &Path, format: Option<FileFormat>) -> Result<FileFormat> {
    match format {
        Some(f) => Ok(f),
        None => FileFormat::from_path(path),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn not_tabular(format: FileFormat, path: &Path) -> PreprocessError {
    PreprocessError::UnsupportedFormat(format!(
        "'{}' does not hold a table ({}). Supported formats: csv, parquet",
        format,
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(&PathBuf::from("a/b.CSV")).unwrap(),
            FileFormat::Csv
        );
        assert_eq!(
            FileFormat::from_path(&PathBuf::from("labels.json")).unwrap(),
            FileFormat::Json
        );
        assert!(matches!(
            FileFormat::from_path(&PathBuf::from("data.xlsx")),
            Err(PreprocessError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(".parquet".parse::<FileFormat>().unwrap(), FileFormat::Parquet);
        assert_eq!("model".parse::<FileFormat>().unwrap(), FileFormat::Model);
        assert!("joblib".parse::<FileFormat>().is_err());
    }
}
