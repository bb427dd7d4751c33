//! Column extraction helpers shared by the stages

use polars::prelude::*;

use crate::error::Result;

/// Convert a column to a Vec of `Option<String>`, stringifying non-text dtypes
pub fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Convert a numeric column to a Vec of `Option<f64>`
pub fn column_to_f64_vec(col: &Column) -> Result<Vec<Option<f64>>> {
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Convert an integer column to a Vec of `Option<i64>`
pub fn column_to_i64_vec(col: &Column) -> Result<Vec<Option<i64>>> {
    let cast = col.cast(&DataType::Int64)?;
    Ok(cast.i64()?.into_iter().collect())
}

/// Keep the rows whose mask entry is `true`, preserving order
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}
