//! Raw survey loader: merges yearly survey files with differing headers

use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PreprocessError, Result};
use crate::io::read_table;
use crate::schema::{self, INDEX_COLUMN};

/// Header spellings used across the survey years and their canonical names
pub const SURVEY_COLUMN_NAMES: &[(&str, &str)] = &[
    ("Zeitstempel", "Timestamp"),
    ("Your level", "Seniority"),
    ("Seniority level", "Seniority"),
    ("Position (without seniority)", "Position"),
    ("Years of Experience", "Years_of_Experience"),
    ("Years of experience", "Years_of_Experience"),
    ("Total years of experience", "Years_of_Experience"),
    ("Current Salary", "Salary_Yearly"),
    (
        "Yearly brutto salary (without bonus and stocks)",
        "Salary_Yearly",
    ),
    (
        "Yearly brutto salary (without bonus and stocks) in EUR",
        "Salary_Yearly",
    ),
    ("Company size", "Company_Size"),
    ("Company type", "Company_Type"),
];

/// Canonical name for a header: trimmed, then mapped if it is a known
/// spelling variant.
pub fn canonical_column_name(name: &str) -> &str {
    let trimmed = name.trim();
    SURVEY_COLUMN_NAMES
        .iter()
        .find(|(variant, _)| *variant == trimmed)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(trimmed)
}

/// Strip and rename the headers of one survey file
pub fn rename_columns(df: &DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| canonical_column_name(name.as_str()).to_string())
        .collect();

    let mut renamed = df.clone();
    renamed.set_column_names(names)?;
    Ok(renamed)
}

/// Concatenate survey tables into one RawInput table.
///
/// Headers are renamed first. Every RawInput column is kept as text so that
/// files with different inferred dtypes stack; required columns missing in
/// a file are filled with nulls and the optional target is kept when any
/// file has it. Rows receive a fresh `id` from 0.
pub fn combine_raw_tables(tables: &[DataFrame]) -> Result<DataFrame> {
    if tables.is_empty() {
        return Err(PreprocessError::Configuration(
            "At least one raw survey file is required".to_string(),
        ));
    }

    let contract = schema::raw_input();
    let renamed = tables
        .iter()
        .map(rename_columns)
        .collect::<Result<Vec<_>>>()?;

    let columns: Vec<&str> = contract
        .columns
        .iter()
        .filter(|spec| {
            spec.required
                || renamed
                    .iter()
                    .any(|df| df.get_column_names().iter().any(|n| n.as_str() == spec.name))
        })
        .map(|spec| spec.name)
        .collect();

    let mut combined: Option<DataFrame> = None;
    for df in &renamed {
        let aligned = align_to_columns(df, &columns)?;
        match combined.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => combined = Some(aligned),
        }
    }

    let mut combined = combined.unwrap_or_default();
    let ids: Vec<i64> = (0..combined.height() as i64).collect();
    combined.insert_column(0, Column::new(INDEX_COLUMN.into(), ids))?;

    contract.validate(&combined)
}

/// Read every file, combine them and validate against RawInput.
pub fn load_raw_data(paths: &[PathBuf]) -> Result<DataFrame> {
    let tables = paths
        .iter()
        .map(|path| read_table(path, None))
        .collect::<Result<Vec<_>>>()?;

    let data = combine_raw_tables(&tables)?;
    info!(
        "Read {} files with a total of {} records",
        paths.len(),
        data.height()
    );
    Ok(data)
}

fn align_to_columns(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let height = df.height();
    let aligned = columns
        .iter()
        .map(|name| match df.column(name) {
            Ok(column) => Ok(column.cast(&DataType::String)?),
            Err(_) => {
                debug!("Column '{}' missing in source file, filling with nulls", name);
                Ok(Column::full_null((*name).into(), height, &DataType::String))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::new(aligned)?)
}
