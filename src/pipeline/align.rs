//! Matching features and targets by row id

use std::collections::HashMap;

use polars::prelude::*;
use tracing::info;

use super::values::{column_to_f64_vec, column_to_i64_vec, filter_rows};
use crate::error::Result;
use crate::schema::{INDEX_COLUMN, SALARY_YEARLY};

/// Inner-join features and targets on `id`.
///
/// Both stages may have dropped different rows, so alignment is by id,
/// never by position. The result keeps the feature columns and order and
/// appends `Salary_Yearly`.
pub fn align_features_and_targets(features: &DataFrame, targets: &DataFrame) -> Result<DataFrame> {
    let target_ids = column_to_i64_vec(targets.column(INDEX_COLUMN)?)?;
    let salaries = column_to_f64_vec(targets.column(SALARY_YEARLY)?)?;
    let by_id: HashMap<i64, Option<f64>> = target_ids
        .into_iter()
        .zip(salaries)
        .filter_map(|(id, salary)| id.map(|id| (id, salary)))
        .collect();

    let feature_ids = column_to_i64_vec(features.column(INDEX_COLUMN)?)?;
    let keep: Vec<bool> = feature_ids
        .iter()
        .map(|id| id.is_some_and(|id| by_id.contains_key(&id)))
        .collect();

    let matched_salaries: Vec<Option<f64>> = feature_ids
        .iter()
        .flatten()
        .filter_map(|id| by_id.get(id).copied())
        .collect();

    let matched = filter_rows(features, &keep)?;
    let aligned = matched.hstack(&[Column::new(SALARY_YEARLY.into(), matched_salaries)])?;

    info!(
        "Matched {} of {} feature rows with targets",
        aligned.height(),
        features.height()
    );
    Ok(aligned)
}
