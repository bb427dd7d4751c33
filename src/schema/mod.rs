//! Schema contracts for every pipeline boundary
//!
//! The five survey contracts are built from [`TableContract`] data; there is
//! one generic validation routine and no per-schema types.

pub mod contract;

pub use contract::*;

pub const TIMESTAMP: &str = "Timestamp";
pub const YEAR: &str = "Year";
pub const AGE: &str = "Age";
pub const GENDER: &str = "Gender";
pub const CITY: &str = "City";
pub const SENIORITY: &str = "Seniority";
pub const POSITION: &str = "Position";
pub const YEARS_OF_EXPERIENCE: &str = "Years_of_Experience";
pub const COMPANY_SIZE: &str = "Company_Size";
pub const COMPANY_TYPE: &str = "Company_Type";
pub const SALARY_YEARLY: &str = "Salary_Yearly";

/// Youngest age at which working experience may start
pub const WORKING_AGE: f64 = 18.0;

/// Raw survey rows as loaded from the source files. Almost everything is
/// nullable text; the target is optional so inference rows validate too.
pub fn raw_input() -> TableContract {
    use SemanticType::*;

    TableContract::new(
        "RawInput",
        vec![
            ColumnSpec::new(TIMESTAMP, Timestamp),
            ColumnSpec::new(AGE, Float),
            ColumnSpec::new(GENDER, Text),
            ColumnSpec::new(CITY, Text),
            ColumnSpec::new(SENIORITY, Text),
            ColumnSpec::new(POSITION, Text),
            ColumnSpec::new(YEARS_OF_EXPERIENCE, Text),
            ColumnSpec::new(COMPANY_SIZE, Text),
            ColumnSpec::new(COMPANY_TYPE, Text),
            ColumnSpec::new(SALARY_YEARLY, Float).optional(),
        ],
    )
}

/// Output of the feature cleaner
pub fn cleaned_features() -> TableContract {
    use SemanticType::*;

    TableContract::new(
        "CleanedFeatures",
        vec![
            ColumnSpec::new(YEAR, Integer).non_nullable(),
            ColumnSpec::new(AGE, Integer)
                .non_nullable()
                .in_range(WORKING_AGE, 100.0),
            ColumnSpec::new(GENDER, Category).non_nullable(),
            ColumnSpec::new(CITY, Category),
            ColumnSpec::new(SENIORITY, Category),
            ColumnSpec::new(POSITION, Category),
            ColumnSpec::new(YEARS_OF_EXPERIENCE, Float).non_nullable(),
            ColumnSpec::new(COMPANY_SIZE, Category),
            ColumnSpec::new(COMPANY_TYPE, Category),
        ],
    )
    .with_check(TableCheck::AtMostOffset {
        left: YEARS_OF_EXPERIENCE,
        right: AGE,
        offset: WORKING_AGE,
    })
}

/// Output of the feature transformer: categoricals replaced by codes.
/// Codes are never null (missing values encode to -1).
pub fn transformed_features() -> TableContract {
    use SemanticType::*;

    TableContract::new(
        "TransformedFeatures",
        vec![
            ColumnSpec::new(YEAR, Integer).non_nullable(),
            ColumnSpec::new(AGE, Integer).non_nullable(),
            ColumnSpec::new(GENDER, Integer).non_nullable(),
            ColumnSpec::new(CITY, Integer).non_nullable(),
            ColumnSpec::new(SENIORITY, Integer).non_nullable(),
            ColumnSpec::new(POSITION, Integer).non_nullable(),
            ColumnSpec::new(YEARS_OF_EXPERIENCE, Float).non_nullable(),
            ColumnSpec::new(COMPANY_SIZE, Integer).non_nullable(),
            ColumnSpec::new(COMPANY_TYPE, Integer).non_nullable(),
        ],
    )
}

pub fn cleaned_targets() -> TableContract {
    TableContract::new(
        "CleanedTargets",
        vec![ColumnSpec::new(SALARY_YEARLY, SemanticType::Float).non_nullable()],
    )
}

pub fn transformed_targets() -> TableContract {
    TableContract::new(
        "TransformedTargets",
        vec![ColumnSpec::new(SALARY_YEARLY, SemanticType::Float).non_nullable()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_category_columns() {
        assert_eq!(
            cleaned_features().category_columns(),
            vec![
                GENDER,
                CITY,
                SENIORITY,
                POSITION,
                COMPANY_SIZE,
                COMPANY_TYPE
            ]
        );
    }

    #[test]
    fn test_cleaned_non_nullable_columns() {
        assert_eq!(
            cleaned_features().non_nullable_columns(),
            vec![YEAR, AGE, GENDER, YEARS_OF_EXPERIENCE]
        );
    }

    #[test]
    fn test_transformed_has_same_columns_as_cleaned() {
        assert_eq!(
            transformed_features().column_names(),
            cleaned_features().column_names()
        );
    }

    #[test]
    fn test_raw_target_is_optional() {
        let spec = raw_input().spec(SALARY_YEARLY).cloned().unwrap();
        assert!(!spec.required);
        assert!(spec.nullable);
    }
}
