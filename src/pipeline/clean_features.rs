//! Row-level cleaning of the raw survey features
//!
//! Steps run in a fixed order because later steps read the results of
//! earlier ones:
//! 1. years of experience parsed and clamped to start at age 18
//! 2. seniority removed from the position name
//! 3. timestamp reduced to the calendar year
//! 4. categorical values lowercased, trimmed and harmonized
//! 5. (train) rows with required nulls and duplicate rows dropped
//! 6. (train) rare categorical values grouped into "other"
//! 7. validation against the CleanedFeatures contract

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike};
use polars::prelude::*;
use tracing::{debug, info};

use super::values::{column_to_f64_vec, column_to_string_vec, filter_rows};
use super::{CleanerConfig, Mode, Processor};
use crate::error::Result;
use crate::mappings::MappingTables;
use crate::schema::{
    self, parse_timestamp_millis, SemanticType, AGE, POSITION, SENIORITY, TIMESTAMP, WORKING_AGE,
    YEAR, YEARS_OF_EXPERIENCE,
};

/// Label assigned to grouped rare values
pub const OTHER_LABEL: &str = "other";

/// Tolerance when deciding whether `percentage * rows` is a whole number
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Feature cleaning stage bound to a mode and the mapping tables
#[derive(Debug, Clone)]
pub struct FeatureCleaner<'a> {
    mode: Mode,
    mappings: &'a MappingTables,
    config: CleanerConfig,
}

impl<'a> FeatureCleaner<'a> {
    /// Create a cleaner. The configuration is checked here so a bad
    /// percentage fails before any row is touched.
    pub fn new(mode: Mode, mappings: &'a MappingTables, config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mode,
            mappings,
            config,
        })
    }
}

impl Processor for FeatureCleaner<'_> {
    type Output = DataFrame;

    fn name(&self) -> &'static str {
        "clean-features"
    }

    fn execute(&self, data: &DataFrame) -> Result<DataFrame> {
        clean_features(data, self.mode, self.mappings, &self.config)
    }
}

/// Clean raw features according to the mode
pub fn clean_features(
    data: &DataFrame,
    mode: Mode,
    mappings: &MappingTables,
    config: &CleanerConfig,
) -> Result<DataFrame> {
    match mode {
        Mode::Train => clean_features_train(data, mappings, config),
        Mode::Inference => clean_features_inference(data, mappings),
    }
}

/// Full cleaning including null/duplicate removal and cardinality reduction
pub fn clean_features_train(
    data: &DataFrame,
    mappings: &MappingTables,
    config: &CleanerConfig,
) -> Result<DataFrame> {
    config.validate()?;
    let contract = schema::cleaned_features();

    let cleaned = normalize_rows(data, mappings)?;

    let subset: Vec<&str> = contract
        .column_names()
        .into_iter()
        .filter(|c| *c != TIMESTAMP)
        .collect();
    let cleaned =
        remove_null_and_duplicate_records(&cleaned, &contract.non_nullable_columns(), &subset)?;

    let cleaned = reduce_cardinality(&cleaned, &contract.category_columns(), config.percentage)?;

    contract.validate(&cleaned)
}

/// Row-level cleaning only; every input row is kept
pub fn clean_features_inference(data: &DataFrame, mappings: &MappingTables) -> Result<DataFrame> {
    let cleaned = normalize_rows(data, mappings)?;
    schema::cleaned_features().validate(&cleaned)
}

/// Steps shared by both modes: raw validation plus steps 1-4
fn normalize_rows(data: &DataFrame, mappings: &MappingTables) -> Result<DataFrame> {
    let mut cleaned = schema::raw_input().validate(data)?;

    let experience = clean_years_of_experience_column(
        cleaned.column(YEARS_OF_EXPERIENCE)?,
        cleaned.column(AGE)?,
    )?;
    cleaned.with_column(experience)?;

    let position = clean_position_column(cleaned.column(POSITION)?, cleaned.column(SENIORITY)?)?;
    cleaned.with_column(position)?;

    let year = timestamp_to_year(cleaned.column(TIMESTAMP)?)?;
    cleaned.with_column(year)?;

    unify_row_values(
        &cleaned,
        &schema::cleaned_features().category_columns(),
        mappings,
    )
}

/// Parse years of experience and make experience start at age 18 at the
/// earliest.
///
/// A comma is accepted as decimal separator. Values that cannot be parsed
/// become null. Where `age - experience < 18` the experience is overwritten
/// with `age - 18`.
pub fn clean_years_of_experience_column(experience: &Column, age: &Column) -> Result<Column> {
    let raw = column_to_string_vec(experience)?;
    let ages = column_to_f64_vec(age)?;

    let mut unparsable = 0usize;
    let cleaned: Vec<Option<f64>> = raw
        .iter()
        .zip(ages.iter())
        .map(|(value, age)| {
            let parsed = value.as_deref().and_then(parse_decimal);
            if value.is_some() && parsed.is_none() {
                unparsable += 1;
            }
            match (parsed, age) {
                (Some(exp), Some(age)) if age - exp < WORKING_AGE => Some(age - WORKING_AGE),
                (parsed, _) => parsed,
            }
        })
        .collect();

    if unparsable > 0 {
        debug!(
            "Replaced {} unparsable '{}' value(s) with null",
            unparsable, YEARS_OF_EXPERIENCE
        );
    }
    info!("Cleaned column '{}'", YEARS_OF_EXPERIENCE);

    Ok(Column::new(YEARS_OF_EXPERIENCE.into(), cleaned))
}

/// Remove the seniority level from the position name.
///
/// - null position stays null
/// - null seniority keeps the position unchanged
/// - otherwise every exact occurrence of the seniority is removed and the
///   result trimmed
pub fn clean_position_column(position: &Column, seniority: &Column) -> Result<Column> {
    let positions = column_to_string_vec(position)?;
    let seniorities = column_to_string_vec(seniority)?;

    let cleaned: Vec<Option<String>> = positions
        .into_iter()
        .zip(seniorities.iter())
        .map(|(position, seniority)| match (position, seniority) {
            (None, _) => None,
            (Some(position), None) => Some(position),
            (Some(position), Some(seniority)) if seniority.is_empty() => Some(position),
            (Some(position), Some(seniority)) => {
                Some(position.replace(seniority.as_str(), "").trim().to_string())
            }
        })
        .collect();

    info!("Cleaned column '{}'", POSITION);
    Ok(Column::new(POSITION.into(), cleaned))
}

/// Reduce a timestamp column to its calendar year; nulls propagate.
pub fn timestamp_to_year(timestamp: &Column) -> Result<Column> {
    let millis: Vec<Option<i64>> = match timestamp.dtype() {
        DataType::String => timestamp
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp_millis))
            .collect(),
        _ => {
            let datetimes = timestamp.cast(&SemanticType::Timestamp.dtype())?;
            let physical = datetimes.cast(&DataType::Int64)?;
            physical.i64()?.into_iter().collect()
        }
    };

    let years: Vec<Option<i64>> = millis
        .into_iter()
        .map(|ms| ms.and_then(DateTime::from_timestamp_millis).map(|dt| dt.year() as i64))
        .collect();

    let distinct: HashSet<i64> = years.iter().flatten().copied().collect();
    info!("Transformed column '{}' to years", TIMESTAMP);
    debug!("Got data from following years: {:?}", distinct);

    Ok(Column::new(YEAR.into(), years))
}

/// Harmonize categorical values: lowercase and trim, apply the literal
/// table, then the regex table, and turn blank strings into null.
pub fn unify_row_values(
    data: &DataFrame,
    columns: &[&str],
    mappings: &MappingTables,
) -> Result<DataFrame> {
    let mut unified = data.clone();

    for name in columns {
        let values = column_to_string_vec(data.column(name)?)?;
        let mapped: Vec<Option<String>> = values
            .iter()
            .map(|value| {
                value.as_deref().and_then(|v| {
                    let lowered = v.trim().to_lowercase();
                    let replaced = mappings.apply(name, &lowered);
                    if replaced.trim().is_empty() {
                        None
                    } else {
                        Some(replaced.to_string())
                    }
                })
            })
            .collect();

        unified.with_column(Column::new((*name).into(), mapped))?;
    }

    info!("Applied mappings, lowering and replacement of empty strings with null");
    Ok(unified)
}

/// Drop rows with nulls in `non_nullable`, then rows duplicating an earlier
/// row over `subset`. The first occurrence of a duplicate is kept.
pub fn remove_null_and_duplicate_records(
    data: &DataFrame,
    non_nullable: &[&str],
    subset: &[&str],
) -> Result<DataFrame> {
    let height = data.height();
    let mut keep = vec![true; height];

    for name in non_nullable {
        let values = column_to_string_vec(data.column(name)?)?;
        for (row, value) in values.iter().enumerate() {
            if value.is_none() {
                keep[row] = false;
            }
        }
    }
    let null_drops = keep.iter().filter(|k| !**k).count();

    let subset_values = subset
        .iter()
        .map(|name| column_to_string_vec(data.column(name)?))
        .collect::<Result<Vec<_>>>()?;

    let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
    let mut duplicate_drops = 0usize;
    for row in 0..height {
        if !keep[row] {
            continue;
        }
        let key: Vec<Option<String>> = subset_values.iter().map(|c| c[row].clone()).collect();
        if !seen.insert(key) {
            keep[row] = false;
            duplicate_drops += 1;
        }
    }

    info!(
        "Removed {} null values and {} duplicates.",
        null_drops, duplicate_drops
    );
    filter_rows(data, &keep)
}

/// Number of records a value needs to avoid being grouped:
/// `ceil(percentage * rows)`, robust to float noise on whole numbers.
pub fn min_records(percentage: f64, rows: usize) -> usize {
    let exact = percentage * rows as f64;
    let rounded = exact.round();
    if (exact - rounded).abs() < THRESHOLD_EPSILON {
        rounded as usize
    } else {
        exact.ceil() as usize
    }
}

/// Group rare categorical values into [`OTHER_LABEL`].
///
/// A value is rare when its count is below `ceil(percentage * rows)`. A
/// column is only relabeled when at least two of its values are rare; a
/// single rare value is left untouched. Nulls are neither counted nor
/// replaced.
pub fn reduce_cardinality(data: &DataFrame, columns: &[&str], percentage: f64) -> Result<DataFrame> {
    let threshold = min_records(percentage, data.height());
    let mut reduced = data.clone();

    for name in columns {
        let values = column_to_string_vec(data.column(name)?)?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_default() += 1;
        }

        let rare: HashSet<String> = counts
            .iter()
            .filter(|(_, count)| **count < threshold)
            .map(|(value, _)| value.to_string())
            .collect();

        if rare.len() < 2 {
            continue;
        }

        let grouped: Vec<Option<String>> = values
            .iter()
            .map(|value| {
                value.as_ref().map(|v| {
                    if rare.contains(v) {
                        OTHER_LABEL.to_string()
                    } else {
                        v.clone()
                    }
                })
            })
            .collect();

        reduced.with_column(Column::new((*name).into(), grouped))?;
        info!("Successfully grouped {} levels in category {}", rare.len(), name);
    }

    Ok(reduced)
}

fn parse_decimal(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(values: &[Option<&str>], ages: &[Option<f64>]) -> Vec<Option<f64>> {
        let exp = Column::new("e".into(), values.to_vec());
        let age = Column::new("a".into(), ages.to_vec());
        let cleaned = clean_years_of_experience_column(&exp, &age).unwrap();
        column_to_f64_vec(&cleaned).unwrap()
    }

    #[test]
    fn test_experience_comma_decimal_and_clamp() {
        let actual = experience(
            &[Some("15,3"), Some("12"), Some("3,5"), None],
            &[Some(35.0), Some(28.0), Some(25.0), Some(40.0)],
        );
        assert_eq!(actual, vec![Some(15.3), Some(10.0), Some(3.5), None]);
    }

    #[test]
    fn test_experience_missing_age_keeps_value() {
        let actual = experience(
            &[Some("2.5"), None, Some("17")],
            &[Some(18.0), None, None],
        );
        assert_eq!(actual, vec![Some(0.0), None, Some(17.0)]);
    }

    #[test]
    fn test_experience_unparsable_becomes_null() {
        let actual = experience(&[Some("a lot"), Some(""), Some("nan")], &[Some(30.0); 3]);
        assert_eq!(actual, vec![None, None, None]);
    }

    #[test]
    fn test_timestamp_to_year_from_strings() {
        let ts = Column::new("Timestamp".into(), [Some("2022/05/13"), None, Some("2019-06-03")]);
        let years = timestamp_to_year(&ts).unwrap();
        assert_eq!(years.name().as_str(), YEAR);
        assert_eq!(
            years.i64().unwrap().into_iter().collect::<Vec<_>>(),
            vec![Some(2022), None, Some(2019)]
        );
    }

    #[test]
    fn test_min_records_ceil() {
        assert_eq!(min_records(0.4, 6), 3);
        assert_eq!(min_records(0.02, 4), 1);
        assert_eq!(min_records(0.1, 30), 3);
        assert_eq!(min_records(0.5, 4), 2);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 4 "), Some(4.0));
        assert_eq!(parse_decimal("1,5"), Some(1.5));
        assert_eq!(parse_decimal("inf"), None);
    }
}
