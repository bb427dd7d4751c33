//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Four raw survey rows already merged into the RawInput shape.
///
/// Every row survives train cleaning; the expected vocabulary is
/// - Gender: diverse, female, male
/// - City: berlin, cologne
/// - Seniority: junior, mid, senior
/// - Position: data scientist, engineer, manager, software developer
/// - Company_Size: 1-10, 1-100, 100, 100+
/// - Company_Type: consulting or agency, product, startup
pub fn create_raw_survey_dataframe() -> DataFrame {
    df! {
        "id" => [0i64, 1, 2, 3],
        "Timestamp" => ["2020-01-01 00:00:00", "2020-09-15 12:30:00", "2022-01-22 08:00:00", "2021-08-29 17:45:10"],
        "Age" => [24.0f64, 40.0, 34.0, 33.0],
        "Gender" => ["male", "female", "diverse", "female"],
        "City" => ["Berlin", "Cologne", "Berlin", "Cologne"],
        "Seniority" => ["Mid", "Junior", "Senior", "Mid"],
        "Position" => ["Developer", "Engineer", "Data Scientist", "Manager"],
        "Years_of_Experience" => ["4", "20", "10", "9"],
        "Company_Size" => ["100+", "1-10", "100", "50-100"],
        "Company_Type" => ["Product", "Startup", "Consulting", "Product"],
        "Salary_Yearly" => [100000.0f64, 50000.0, 55000.0, 65000.0],
    }
    .unwrap()
}

/// One unseen survey answer for inference, without a salary
pub fn create_inference_dataframe() -> DataFrame {
    df! {
        "id" => [0i64],
        "Timestamp" => ["2023-03-01"],
        "Age" => [30.0f64],
        "Gender" => ["F"],
        "City" => ["Köln"],
        "Seniority" => ["Senior"],
        "Position" => ["Senior Python Developer"],
        "Years_of_Experience" => ["5,5"],
        "Company_Size" => ["51-100"],
        "Company_Type" => ["Bank"],
    }
    .unwrap()
}

/// Survey file using the early header spellings
pub fn create_survey_file_early() -> DataFrame {
    df! {
        "Timestamp" => ["2020-01-01 00:00:00", "2020-09-15 12:30:00"],
        "Age" => [24i64, 40],
        "Gender" => ["male", "female"],
        "City" => ["Berlin", "Cologne"],
        "Seniority level" => ["Mid", "Junior"],
        "Position (without seniority)" => ["Developer", "Engineer"],
        "Years of experience" => ["4", "20"],
        "Yearly brutto salary (without bonus and stocks) in EUR" => [100000i64, 50000],
        "Company size" => ["100+", "1-10"],
        "Company type" => ["Product", "Startup"],
    }
    .unwrap()
}

/// Survey file using the later header spellings, with padded headers
pub fn create_survey_file_late() -> DataFrame {
    df! {
        "Zeitstempel" => ["22.01.2022 08:00:00", "29.08.2021 17:45:10"],
        "Age " => [34i64, 33],
        "Gender" => ["diverse", "female"],
        "City" => ["Berlin", "Cologne"],
        "Your level" => ["Senior", "Mid"],
        "Position (without seniority)" => ["Data Scientist", "Manager"],
        "Total years of experience" => ["10", "9"],
        "Current Salary" => [55000.0f64, 65000.0],
        "Company size" => ["100", "50-100"],
        "Company type" => ["Consulting", "Product"],
    }
    .unwrap()
}

/// Raw table of `rows` random survey answers, for volume tests
pub fn create_large_raw_dataframe(rows: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let genders = ["male", "female", "diverse", "M", "F"];
    let cities = ["Berlin", "München", "Köln", "Hamburg", "Zurich", "Amsterdam"];
    let seniorities = ["Junior", "Middle", "Senior", "Lead"];
    let positions = ["Developer", "Python Developer", "Data Scientist", "PM", "QA"];
    let sizes = ["up to 10", "10-50", "50-100", "100-1000", "1000+"];
    let types = ["Product", "Startup", "Bank", "Agency", "University"];

    let gender = pick(&mut rng, &genders, rows);
    let city = pick(&mut rng, &cities, rows);
    let seniority = pick(&mut rng, &seniorities, rows);
    let position = pick(&mut rng, &positions, rows);
    let size = pick(&mut rng, &sizes, rows);
    let kind = pick(&mut rng, &types, rows);

    let age: Vec<f64> = (0..rows).map(|_| rng.gen_range(20..60) as f64).collect();
    let experience: Vec<String> = (0..rows)
        .map(|_| format!("{}", rng.gen_range(0..30)))
        .collect();
    let salary: Vec<f64> = (0..rows)
        .map(|_| rng.gen_range(30_000.0..120_000.0))
        .collect();
    let timestamp: Vec<String> = (0..rows)
        .map(|_| format!("{}-06-01 10:00:00", rng.gen_range(2018..2024)))
        .collect();

    DataFrame::new(vec![
        Column::new("id".into(), (0..rows as i64).collect::<Vec<_>>()),
        Column::new("Timestamp".into(), timestamp),
        Column::new("Age".into(), age),
        Column::new("Gender".into(), gender),
        Column::new("City".into(), city),
        Column::new("Seniority".into(), seniority),
        Column::new("Position".into(), position),
        Column::new("Years_of_Experience".into(), experience),
        Column::new("Company_Size".into(), size),
        Column::new("Company_Type".into(), kind),
        Column::new("Salary_Yearly".into(), salary),
    ])
    .unwrap()
}

fn pick<R: rand::Rng>(rng: &mut R, values: &[&str], rows: usize) -> Vec<String> {
    use rand::seq::SliceRandom;
    (0..rows)
        .map(|_| values.choose(rng).unwrap().to_string())
        .collect()
}

/// Create a temporary directory with a CSV file
pub fn create_temp_csv(df: &mut DataFrame, name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join(name);

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a Parquet file
pub fn create_temp_parquet(df: &mut DataFrame, name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join(name);

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

pub fn i64_values(df: &DataFrame, column: &str) -> Vec<Option<i64>> {
    df.column(column)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn str_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
