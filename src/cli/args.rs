//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{Mode, DEFAULT_PERCENTAGE};

/// salaryprep - Clean and encode salary survey data for model training and inference
#[derive(Parser, Debug)]
#[command(name = "salaryprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge raw survey files with differing headers into one raw table
    Load {
        /// Raw survey files (CSV or Parquet), one per survey year
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output table (CSV or Parquet, determined by extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Clean raw features into the CleanedFeatures table
    CleanFeatures {
        /// Raw table produced by `load`
        #[arg(short, long)]
        input: PathBuf,

        /// Output table (CSV or Parquet)
        #[arg(short, long)]
        output: PathBuf,

        /// Execution mode: "train" drops bad rows and groups rare values, "inference" keeps every row
        #[arg(short, long, default_value = "train", value_parser = parse_mode)]
        mode: Mode,

        /// Share of rows (0 to 1, exclusive) under which a categorical value is grouped into "other"
        #[arg(long, default_value_t = DEFAULT_PERCENTAGE, value_parser = validate_percentage)]
        percentage: f64,
    },

    /// Encode cleaned features as integers
    TransformFeatures {
        /// Cleaned feature table
        #[arg(short, long)]
        input: PathBuf,

        /// Output table (CSV or Parquet)
        #[arg(short, long)]
        output: PathBuf,

        /// Execution mode: "train" learns the vocabulary, "inference" applies it
        #[arg(short, long, default_value = "train", value_parser = parse_mode)]
        mode: Mode,

        /// Vocabulary file (.json or .bin). Written in train mode, read in inference mode.
        #[arg(short, long)]
        labels_path: PathBuf,
    },

    /// Drop missing salaries and salary outliers
    CleanTargets {
        /// Raw table produced by `load`
        #[arg(short, long)]
        input: PathBuf,

        /// Output table (CSV or Parquet)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate cleaned targets into the TransformedTargets table
    TransformTargets {
        /// Cleaned target table
        #[arg(short, long)]
        input: PathBuf,

        /// Output table (CSV or Parquet)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the full pipeline from raw survey files to model-ready tables
    Preprocess {
        /// Raw survey files (CSV or Parquet)
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output directory for features, targets and the aligned dataset
        #[arg(short, long)]
        output: PathBuf,

        /// Execution mode: targets are only processed in train mode
        #[arg(short, long, default_value = "train", value_parser = parse_mode)]
        mode: Mode,

        /// Vocabulary file (.json or .bin). Defaults to `<output>/labels.json`.
        #[arg(short, long)]
        labels_path: Option<PathBuf>,

        /// Share of rows (0 to 1, exclusive) under which a categorical value is grouped into "other"
        #[arg(long, default_value_t = DEFAULT_PERCENTAGE, value_parser = validate_percentage)]
        percentage: f64,
    },
}

impl Commands {
    /// Stage name shown in the banner
    pub fn title(&self) -> &'static str {
        match self {
            Commands::Load { .. } => "Load Raw Data",
            Commands::CleanFeatures { .. } => "Clean Features",
            Commands::TransformFeatures { .. } => "Transform Features",
            Commands::CleanTargets { .. } => "Clean Targets",
            Commands::TransformTargets { .. } => "Transform Targets",
            Commands::Preprocess { .. } => "Preprocess",
        }
    }
}

/// Vocabulary path used by `preprocess` when none is given
pub fn default_labels_path(output_dir: &Path) -> PathBuf {
    output_dir.join("labels.json")
}

/// Parser for the mode parameter
pub fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

/// Validator for the percentage parameter
pub fn validate_percentage(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "percentage must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}
