//! Common seam for the four processing stages

use polars::prelude::*;

use super::EncodedFeatures;
use crate::error::Result;

/// A pipeline stage that turns a validated table into its next shape.
///
/// Every stage validates its input against its entry contract and its
/// output against its exit contract, so a stage never hands ill-typed data
/// downstream. Stages hold no mutable state; running one twice on the same
/// input gives the same output.
pub trait Processor {
    /// What the stage produces; the feature transformer also returns the
    /// vocabulary it learned.
    type Output: StageOutput;

    /// Short stage name used in logs and summaries
    fn name(&self) -> &'static str;

    fn execute(&self, data: &DataFrame) -> Result<Self::Output>;
}

/// Anything a stage returns exposes the table it produced
pub trait StageOutput {
    fn table(&self) -> &DataFrame;
}

impl StageOutput for DataFrame {
    fn table(&self) -> &DataFrame {
        self
    }
}

impl StageOutput for EncodedFeatures {
    fn table(&self) -> &DataFrame {
        &self.features
    }
}
