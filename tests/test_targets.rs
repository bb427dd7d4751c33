//! Tests for target cleaning, transformation and alignment

use polars::prelude::*;
use salaryprep::mappings::MappingTables;
use salaryprep::pipeline::*;
use salaryprep::PreprocessError;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn raw_with_salaries(salaries: &[Option<f64>]) -> DataFrame {
    let n = salaries.len();
    let ids: Vec<i64> = (0..n as i64).collect();
    df! {
        "id" => ids,
        "Timestamp" => vec!["2021-01-01"; n],
        "Age" => vec![30.0f64; n],
        "Gender" => vec!["male"; n],
        "City" => vec!["Berlin"; n],
        "Seniority" => vec!["Senior"; n],
        "Position" => vec!["Developer"; n],
        "Years_of_Experience" => vec!["5"; n],
        "Company_Size" => vec!["100+"; n],
        "Company_Type" => vec!["Product"; n],
        "Salary_Yearly" => salaries.to_vec(),
    }
    .unwrap()
}

#[test]
fn test_clean_targets_drops_outlier() {
    let raw = raw_with_salaries(&[
        Some(500000.0),
        Some(120000.0),
        Some(55000.0),
        Some(40000.0),
        Some(31000.0),
    ]);

    let cleaned = clean_targets(&raw).unwrap();

    assert_eq!(cleaned.get_column_names(), &["id", "Salary_Yearly"]);
    assert_eq!(i64_values(&cleaned, "id"), vec![Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(
        f64_values(&cleaned, "Salary_Yearly"),
        vec![Some(120000.0), Some(55000.0), Some(40000.0), Some(31000.0)]
    );
}

#[test]
fn test_clean_targets_drops_nulls_before_quartiles() {
    let raw = raw_with_salaries(&[Some(50000.0), None, Some(60000.0), Some(55000.0), None]);

    let cleaned = clean_targets(&raw).unwrap();
    assert_eq!(i64_values(&cleaned, "id"), vec![Some(0), Some(2), Some(3)]);
}

#[test]
fn test_clean_targets_keeps_survey_rows() {
    let cleaned = clean_targets(&create_raw_survey_dataframe()).unwrap();
    assert_shape(&cleaned, 4, 2);
}

#[test]
fn test_clean_targets_requires_salary() {
    let result = clean_targets(&create_inference_dataframe());
    assert!(matches!(
        result,
        Err(PreprocessError::SchemaViolation { ref column, .. }) if column == "Salary_Yearly"
    ));
}

#[test]
fn test_clean_targets_all_null() {
    let raw = raw_with_salaries(&[None, None]);
    let cleaned = clean_targets(&raw).unwrap();
    assert_eq!(cleaned.height(), 0);
}

#[test]
fn test_transform_targets_is_identity_on_clean_data() {
    let cleaned = clean_targets(&create_raw_survey_dataframe()).unwrap();
    let transformed = TargetTransformer.execute(&cleaned).unwrap();
    assert!(transformed.equals(&cleaned));
}

#[test]
fn test_align_features_and_targets() {
    let mappings = MappingTables::survey().unwrap();
    let raw = raw_with_salaries(&[
        Some(500000.0),
        Some(120000.0),
        Some(55000.0),
        Some(40000.0),
        Some(31000.0),
    ]);

    let cleaned = clean_features(&raw, Mode::Train, &mappings, &CleanerConfig::default()).unwrap();
    // Identical answers collapse to the first row
    assert_eq!(i64_values(&cleaned, "id"), vec![Some(0)]);

    let (features, _) = fit_transform_features(&cleaned).unwrap();
    let targets = transform_targets(&clean_targets(&raw).unwrap()).unwrap();

    // id 0 was removed as a salary outlier, so nothing matches
    let aligned = align_features_and_targets(&features, &targets).unwrap();
    assert_eq!(aligned.height(), 0);
    assert_has_columns(&aligned, &["id", "Gender", "Salary_Yearly"]);
}
