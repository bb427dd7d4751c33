//! Pipeline module - cleaning and transforming stages
//!
//! Raw → RawInput contract → feature cleaner → CleanedFeatures contract →
//! feature transformer → TransformedFeatures contract, with a parallel and
//! simpler path for the salary target.

pub mod align;
pub mod clean_features;
pub mod clean_targets;
pub mod loader;
pub mod processor;
pub mod transform_features;
pub mod transform_targets;
pub mod values;

pub use align::*;
pub use clean_features::*;
pub use clean_targets::*;
pub use loader::*;
pub use processor::*;
pub use transform_features::*;
pub use transform_targets::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};

/// Default share of rows under which a categorical value counts as rare
pub const DEFAULT_PERCENTAGE: f64 = 0.02;

/// Execution mode, fixed for one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Drop bad rows, reduce cardinality and learn the vocabulary
    Train,
    /// Keep every row and apply a previously learned vocabulary
    Inference,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => write!(f, "train"),
            Mode::Inference => write!(f, "inference"),
        }
    }
}

impl FromStr for Mode {
    type Err = PreprocessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "train" => Ok(Mode::Train),
            "inference" => Ok(Mode::Inference),
            other => Err(PreprocessError::Configuration(format!(
                "Unknown mode '{}'. Use 'train' or 'inference'",
                other
            ))),
        }
    }
}

/// Tunables of the feature cleaner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Values rarer than `ceil(percentage * rows)` are grouped into "other"
    pub percentage: f64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            percentage: DEFAULT_PERCENTAGE,
        }
    }
}

impl CleanerConfig {
    pub fn new(percentage: f64) -> Result<Self> {
        let config = Self { percentage };
        config.validate()?;
        Ok(config)
    }

    /// The percentage must lie strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if self.percentage > 0.0 && self.percentage < 1.0 {
            Ok(())
        } else {
            Err(PreprocessError::Configuration(format!(
                "percentage must be in (0, 1), got {}",
                self.percentage
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("train".parse::<Mode>().unwrap(), Mode::Train);
        assert_eq!("INFERENCE".parse::<Mode>().unwrap(), Mode::Inference);
        assert!(matches!(
            "predict".parse::<Mode>(),
            Err(PreprocessError::Configuration(_))
        ));
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [Mode::Train, Mode::Inference] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_cleaner_config_bounds() {
        assert_eq!(CleanerConfig::default().percentage, 0.02);
        assert!(CleanerConfig::new(0.4).is_ok());
        assert!(CleanerConfig::new(0.0).is_err());
        assert!(CleanerConfig::new(1.0).is_err());
    }
}
