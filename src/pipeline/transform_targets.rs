//! Transformation of the salary target

use polars::prelude::*;

use super::Processor;
use crate::error::Result;
use crate::schema;

/// Target transforming stage.
///
/// Currently a validated pass-through: the extension point for scaling or
/// encoding the target later.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetTransformer;

impl Processor for TargetTransformer {
    type Output = DataFrame;

    fn name(&self) -> &'static str {
        "transform-targets"
    }

    fn execute(&self, data: &DataFrame) -> Result<DataFrame> {
        transform_targets(data)
    }
}

pub fn transform_targets(data: &DataFrame) -> Result<DataFrame> {
    let cleaned = schema::cleaned_targets().validate(data)?;
    schema::transformed_targets().validate(&cleaned)
}
