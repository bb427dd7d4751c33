//! Generic table contract: declarative column constraints with coercion
//!
//! A [`TableContract`] is plain data. Validation checks the `id` index,
//! coerces every declared column to its semantic type, enforces
//! nullability, value ranges and cross-column checks, and returns a table
//! holding only the index and the declared columns in declared order.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{PreprocessError, Result};

/// Name of the row index column carried through every stage
pub const INDEX_COLUMN: &str = "id";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Semantic type of a contract column and the polars dtype it coerces to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// `Datetime(ms)`, parsed from strings when needed
    Timestamp,
    /// `Float64`
    Float,
    /// `Int64`; non-integral values are rejected
    Integer,
    /// Free text stored as `String`
    Text,
    /// Categorical value stored as `String`, eligible for encoding
    Category,
}

impl SemanticType {
    /// Polars dtype a validated column of this type carries
    pub fn dtype(&self) -> DataType {
        match self {
            SemanticType::Timestamp => DataType::Datetime(TimeUnit::Milliseconds, None),
            SemanticType::Float => DataType::Float64,
            SemanticType::Integer => DataType::Int64,
            SemanticType::Text | SemanticType::Category => DataType::String,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Timestamp => "timestamp",
            SemanticType::Float => "float",
            SemanticType::Integer => "integer",
            SemanticType::Text => "text",
            SemanticType::Category => "category",
        };
        write!(f, "{}", name)
    }
}

/// One declared column of a contract
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: SemanticType,
    pub nullable: bool,
    /// Optional columns may be absent from the table entirely
    pub required: bool,
    /// Inclusive bounds for numeric columns
    pub range: Option<(f64, f64)>,
}

impl ColumnSpec {
    /// A required, nullable column without range constraints
    pub fn new(name: &'static str, kind: SemanticType) -> Self {
        Self {
            name,
            kind,
            nullable: true,
            required: true,
            range: None,
        }
    }

    pub fn non_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn in_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }
}

/// Cross-column invariant evaluated row by row
#[derive(Debug, Clone, PartialEq)]
pub enum TableCheck {
    /// `left <= right - offset` for every row where both values are present
    AtMostOffset {
        left: &'static str,
        right: &'static str,
        offset: f64,
    },
}

/// Declarative contract for one table shape
#[derive(Debug, Clone, PartialEq)]
pub struct TableContract {
    pub name: &'static str,
    pub columns: Vec<ColumnSpec>,
    pub checks: Vec<TableCheck>,
}

impl TableContract {
    pub fn new(name: &'static str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name,
            columns,
            checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, check: TableCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// All declared column names in declared order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Columns declared with [`SemanticType::Category`]
    pub fn category_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.kind == SemanticType::Category)
            .map(|c| c.name)
            .collect()
    }

    pub fn non_nullable_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !c.nullable)
            .map(|c| c.name)
            .collect()
    }

    pub fn spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Validate and coerce a table against this contract.
    ///
    /// Returns the coerced table restricted to `id` plus the declared
    /// columns (absent optional columns are skipped). Re-validating the
    /// returned table yields an identical table.
    ///
    /// # Errors
    /// [`PreprocessError::SchemaViolation`] naming the column and constraint.
    pub fn validate(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(self.validate_index(df)?);

        for spec in &self.columns {
            let Ok(column) = df.column(spec.name) else {
                if spec.required {
                    return Err(self.violation(spec.name, "is missing"));
                }
                continue;
            };

            let coerced = self.coerce(spec, column)?;

            let nulls = coerced.null_count();
            if nulls > 0 && !spec.nullable {
                return Err(self.violation(
                    spec.name,
                    format!("contains {} null value(s) but is not nullable", nulls),
                ));
            }

            if let Some((min, max)) = spec.range {
                let values = coerced.cast(&DataType::Float64)?;
                let outside = values
                    .f64()?
                    .into_iter()
                    .flatten()
                    .filter(|v| *v < min || *v > max)
                    .count();
                if outside > 0 {
                    return Err(self.violation(
                        spec.name,
                        format!("has {} value(s) outside [{}, {}]", outside, min, max),
                    ));
                }
            }

            columns.push(coerced);
        }

        let validated = DataFrame::new(columns)?;
        for check in &self.checks {
            self.run_check(check, &validated)?;
        }

        Ok(validated)
    }

    fn validate_index(&self, df: &DataFrame) -> Result<Column> {
        let column = df
            .column(INDEX_COLUMN)
            .map_err(|_| self.violation(INDEX_COLUMN, "index is missing"))?;

        let index = column
            .as_materialized_series()
            .strict_cast(&DataType::Int64)
            .map_err(|_| self.violation(INDEX_COLUMN, "index must be integer"))?;

        let ids = index.i64()?;
        if ids.null_count() > 0 {
            return Err(self.violation(INDEX_COLUMN, "index contains null values"));
        }

        let mut previous: Option<i64> = None;
        for id in ids.into_no_null_iter() {
            if let Some(prev) = previous {
                if id == prev {
                    return Err(self.violation(
                        INDEX_COLUMN,
                        format!("index is not unique (duplicate {})", id),
                    ));
                }
                if id < prev {
                    return Err(self.violation(INDEX_COLUMN, "index is not sorted ascending"));
                }
            }
            previous = Some(id);
        }

        Ok(Column::from(index))
    }

    fn coerce(&self, spec: &ColumnSpec, column: &Column) -> Result<Column> {
        let series = column.as_materialized_series();
        let coerced = match spec.kind {
            SemanticType::Timestamp => coerce_timestamp(series),
            SemanticType::Float => series.strict_cast(&DataType::Float64).ok(),
            SemanticType::Integer => coerce_integer(series),
            SemanticType::Text | SemanticType::Category => series.cast(&DataType::String).ok(),
        }
        .ok_or_else(|| {
            self.violation(
                spec.name,
                format!("cannot be coerced from {} to {}", series.dtype(), spec.kind),
            )
        })?;

        Ok(Column::from(coerced.with_name(spec.name.into())))
    }

    fn run_check(&self, check: &TableCheck, df: &DataFrame) -> Result<()> {
        match check {
            TableCheck::AtMostOffset {
                left,
                right,
                offset,
            } => {
                let (Ok(l), Ok(r)) = (df.column(left), df.column(right)) else {
                    return Err(self.violation(
                        *left,
                        format!("check against '{}' needs both columns", right),
                    ));
                };
                let l = l.cast(&DataType::Float64)?;
                let r = r.cast(&DataType::Float64)?;

                let failing = l
                    .f64()?
                    .into_iter()
                    .zip(r.f64()?.into_iter())
                    .filter(|pair| matches!(pair, (Some(a), Some(b)) if *a > *b - offset))
                    .count();

                if failing > 0 {
                    return Err(self.violation(
                        *left,
                        format!(
                            "must be <= {} - {} ({} row(s) fail)",
                            right, offset, failing
                        ),
                    ));
                }
                Ok(())
            }
        }
    }

    fn violation(&self, column: impl Into<String>, constraint: impl Into<String>) -> PreprocessError {
        PreprocessError::violation(self.name, column, constraint)
    }
}

/// Parse a timestamp string into epoch milliseconds.
///
/// Accepts date-only values (midnight) and date-times with optional
/// fractional seconds.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let value = value.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

fn coerce_timestamp(series: &Series) -> Option<Series> {
    let target = SemanticType::Timestamp.dtype();

    match series.dtype() {
        DataType::String => {
            let ca = series.str().ok()?;
            let mut millis: Vec<Option<i64>> = Vec::with_capacity(ca.len());
            for value in ca.into_iter() {
                match value {
                    None => millis.push(None),
                    Some(s) if s.trim().is_empty() => millis.push(None),
                    Some(s) => millis.push(Some(parse_timestamp_millis(s)?)),
                }
            }
            Series::new(series.name().clone(), millis).cast(&target).ok()
        }
        DataType::Null => series.cast(&target).ok(),
        _ => series.strict_cast(&target).ok(),
    }
}

fn coerce_integer(series: &Series) -> Option<Series> {
    if series.dtype().is_integer() {
        return series.strict_cast(&DataType::Int64).ok();
    }

    let floats = series.strict_cast(&DataType::Float64).ok()?;
    let non_integral = floats
        .f64()
        .ok()?
        .into_iter()
        .flatten()
        .any(|v| !v.is_finite() || v.fract() != 0.0);
    if non_integral {
        return None;
    }

    floats.cast(&DataType::Int64).ok()
}
