//! Error types for the preprocessing pipeline

use thiserror::Error;

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Errors surfaced by the cleaning and transforming stages.
///
/// Cell-level parse failures are not represented here: they are recovered
/// to null inside the stage that encounters them.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// A table failed a structural, type, range or cross-column check.
    #[error("Schema violation in {contract}: column '{column}' {constraint}")]
    SchemaViolation {
        /// Name of the contract that rejected the table
        contract: String,
        /// Offending column (or the check name for cross-column checks)
        column: String,
        /// Human readable description of the violated constraint
        constraint: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl PreprocessError {
    /// Shorthand for building a [`PreprocessError::SchemaViolation`].
    pub fn violation(
        contract: impl Into<String>,
        column: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        PreprocessError::SchemaViolation {
            contract: contract.into(),
            column: column.into(),
            constraint: constraint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_schema_violation_display() {
        let err = PreprocessError::violation("CleanedFeatures", "Age", "has 2 values outside [18, 100]");
        assert_eq!(
            err.to_string(),
            "Schema violation in CleanedFeatures: column 'Age' has 2 values outside [18, 100]"
        );
    }

    #[test]
    fn test_configuration_display() {
        let err = PreprocessError::Configuration("vocabulary required".to_string());
        assert_eq!(err.to_string(), "Configuration error: vocabulary required");
    }

    #[test]
    fn test_io_error_source() {
        let err: PreprocessError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, PreprocessError::Io(_)));
        assert!(err.source().is_some());
    }
}
