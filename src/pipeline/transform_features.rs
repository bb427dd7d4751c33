//! Categorical encoding of cleaned features
//!
//! Training learns a [`Vocabulary`] (sorted distinct values per categorical
//! column) and encodes each value by its position. Inference applies a
//! previously persisted vocabulary without changing it:
//! - known value → its index
//! - null → `-1`
//! - unseen value → `len(labels)`, a bucket distinct from every real code

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::values::column_to_string_vec;
use super::{Mode, Processor};
use crate::error::{PreprocessError, Result};
use crate::schema;

/// Code assigned to missing values
pub const NULL_CODE: i64 = -1;

/// Ordered known labels per categorical column.
///
/// Serialized as a plain `{column: [label, ...]}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    labels: BTreeMap<String, Vec<String>>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting columns that list a label twice.
    pub fn new(labels: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let vocabulary = Self { labels };
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Labels must be unique within a column, otherwise two codes would
    /// decode to the same value.
    pub fn validate(&self) -> Result<()> {
        for (column, labels) in &self.labels {
            let mut seen = HashSet::with_capacity(labels.len());
            if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
                return Err(PreprocessError::Configuration(format!(
                    "Vocabulary for column '{}' lists label '{}' more than once",
                    column, dup
                )));
            }
        }
        Ok(())
    }

    pub fn labels(&self, column: &str) -> Option<&[String]> {
        self.labels.get(column).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Code of `value` in `column`, or `None` if the column is unknown
    pub fn encode(&self, column: &str, value: Option<&str>) -> Option<i64> {
        self.labels(column)
            .map(|labels| encode_based_on_labels(value, labels))
    }

    /// Reverse a code. Null and unseen-bucket codes decode to `None`.
    pub fn decode(&self, column: &str, code: i64) -> Option<&str> {
        let labels = self.labels(column)?;
        usize::try_from(code)
            .ok()
            .and_then(|i| labels.get(i))
            .map(String::as_str)
    }

    fn insert(&mut self, column: &str, labels: Vec<String>) {
        self.labels.insert(column.to_string(), labels);
    }
}

/// Encode one value by its index in `labels`.
pub fn encode_based_on_labels(value: Option<&str>, labels: &[String]) -> i64 {
    match value {
        None => NULL_CODE,
        Some(v) => labels
            .iter()
            .position(|l| l == v)
            .unwrap_or(labels.len()) as i64,
    }
}

/// Result of the transforming stage
#[derive(Debug, Clone)]
pub struct EncodedFeatures {
    pub features: DataFrame,
    /// Set in train mode only: the vocabulary to persist for inference
    pub learned: Option<Vocabulary>,
}

/// Feature transforming stage.
///
/// In inference mode the vocabulary is mandatory and checked at
/// construction, before any row is processed.
#[derive(Debug, Clone)]
pub struct FeatureTransformer<'a> {
    mode: Mode,
    vocabulary: Option<&'a Vocabulary>,
}

impl<'a> FeatureTransformer<'a> {
    pub fn new(mode: Mode, vocabulary: Option<&'a Vocabulary>) -> Result<Self> {
        if mode == Mode::Inference {
            require_vocabulary(vocabulary)?;
        }
        Ok(Self { mode, vocabulary })
    }
}

impl Processor for FeatureTransformer<'_> {
    type Output = EncodedFeatures;

    fn name(&self) -> &'static str {
        "transform-features"
    }

    fn execute(&self, data: &DataFrame) -> Result<EncodedFeatures> {
        transform_features(data, self.mode, self.vocabulary)
    }
}

/// Encode cleaned features according to the mode
pub fn transform_features(
    data: &DataFrame,
    mode: Mode,
    vocabulary: Option<&Vocabulary>,
) -> Result<EncodedFeatures> {
    match mode {
        Mode::Train => {
            let (features, learned) = fit_transform_features(data)?;
            Ok(EncodedFeatures {
                features,
                learned: Some(learned),
            })
        }
        Mode::Inference => {
            let vocabulary = require_vocabulary(vocabulary)?;
            Ok(EncodedFeatures {
                features: transform_features_with_vocabulary(data, vocabulary)?,
                learned: None,
            })
        }
    }
}

/// Learn the vocabulary from `data` and encode it.
pub fn fit_transform_features(data: &DataFrame) -> Result<(DataFrame, Vocabulary)> {
    let contract = schema::cleaned_features();
    let data = contract.validate(data)?;

    let mut encoded = data.clone();
    let mut vocabulary = Vocabulary::default();

    for column in contract.category_columns() {
        let values = column_to_string_vec(data.column(column)?)?;
        let labels: Vec<String> = values
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let codes = encode_column(&values, &labels);
        encoded.with_column(Column::new(column.into(), codes))?;
        info!("Successfully encoded column {}", column);

        vocabulary.insert(column, labels);
    }

    let features = schema::transformed_features().validate(&encoded)?;
    Ok((features, vocabulary))
}

/// Encode `data` with a vocabulary learned during training.
///
/// # Errors
/// [`PreprocessError::Configuration`] if the vocabulary is malformed or
/// lacks a categorical column; raised before any row is encoded.
pub fn transform_features_with_vocabulary(
    data: &DataFrame,
    vocabulary: &Vocabulary,
) -> Result<DataFrame> {
    let contract = schema::cleaned_features();
    vocabulary.validate()?;
    for column in contract.category_columns() {
        if vocabulary.labels(column).is_none() {
            return Err(PreprocessError::Configuration(format!(
                "Vocabulary has no labels for column '{}'",
                column
            )));
        }
    }

    let data = contract.validate(data)?;
    let mut encoded = data.clone();

    for column in contract.category_columns() {
        let labels = vocabulary.labels(column).unwrap_or_default();
        let values = column_to_string_vec(data.column(column)?)?;

        let codes = encode_column(&values, labels);
        encoded.with_column(Column::new(column.into(), codes))?;
        info!("Successfully encoded column {}", column);

        if values.iter().all(Option::is_none) {
            warn!(
                "Column {} only contains null values. Encoding with {} successful.",
                column, NULL_CODE
            );
        }
    }

    schema::transformed_features().validate(&encoded)
}

fn encode_column(values: &[Option<String>], labels: &[String]) -> Vec<i64> {
    let index: HashMap<&str, i64> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i as i64))
        .collect();
    let unseen = labels.len() as i64;

    values
        .iter()
        .map(|value| match value {
            None => NULL_CODE,
            Some(v) => index.get(v.as_str()).copied().unwrap_or(unseen),
        })
        .collect()
}

fn require_vocabulary(vocabulary: Option<&Vocabulary>) -> Result<&Vocabulary> {
    vocabulary.ok_or_else(|| {
        PreprocessError::Configuration(
            "A vocabulary learned in training is mandatory in mode 'inference'".to_string(),
        )
    })
}
