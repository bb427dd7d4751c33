//! Cleaning of the salary target
//!
//! Rows without a salary are dropped, then salaries outside
//! `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` are removed. Row ids of the kept rows are
//! unchanged so targets can later be matched to features by id.

use polars::prelude::*;
use tracing::info;

use super::values::{column_to_f64_vec, filter_rows};
use super::Processor;
use crate::error::{PreprocessError, Result};
use crate::schema::{self, SALARY_YEARLY};

/// Multiplier of the interquartile range defining the outlier fences
pub const IQR_FACTOR: f64 = 1.5;

/// Target cleaning stage
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetCleaner;

impl Processor for TargetCleaner {
    type Output = DataFrame;

    fn name(&self) -> &'static str {
        "clean-targets"
    }

    fn execute(&self, data: &DataFrame) -> Result<DataFrame> {
        clean_targets(data)
    }
}

/// Validate raw rows, drop null targets and outliers, and return the
/// CleanedTargets table.
pub fn clean_targets(data: &DataFrame) -> Result<DataFrame> {
    let raw = schema::raw_input();
    let data = raw.validate(data)?;
    if data.column(SALARY_YEARLY).is_err() {
        return Err(PreprocessError::violation(raw.name, SALARY_YEARLY, "is missing"));
    }

    let salary = column_to_f64_vec(data.column(SALARY_YEARLY)?)?;
    let keep: Vec<bool> = salary.iter().map(Option::is_some).collect();
    let without_nulls = filter_rows(&data, &keep)?;
    info!(
        "Dropped {} records without target",
        data.height() - without_nulls.height()
    );

    let cleaned = remove_outliers(&without_nulls)?;
    schema::cleaned_targets().validate(&cleaned)
}

/// Keep rows whose salary lies within the inclusive IQR fences.
///
/// Quartiles use linear interpolation between closest ranks.
pub fn remove_outliers(data: &DataFrame) -> Result<DataFrame> {
    let salary = column_to_f64_vec(data.column(SALARY_YEARLY)?)?;

    let mut sorted: Vec<f64> = salary.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return Ok(data.clone());
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FACTOR * iqr;
    let upper = q3 + IQR_FACTOR * iqr;

    let keep: Vec<bool> = salary
        .iter()
        .map(|v| matches!(v, Some(s) if *s >= lower && *s <= upper))
        .collect();
    let cleaned = filter_rows(data, &keep)?;

    info!(
        "Dropped {} records to keep target in range [{:.0},{:.0}]",
        data.height() - cleaned.height(),
        lower,
        upper
    );
    Ok(cleaned)
}

/// Quantile of already sorted values with linear interpolation.
///
/// `sorted` must be non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
