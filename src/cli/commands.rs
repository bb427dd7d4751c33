//! Subcommand execution: reads inputs, runs the stages and writes outputs

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use super::{default_labels_path, Commands};
use crate::io::{read_object, read_table, write_object, write_table};
use crate::mappings::MappingTables;
use crate::pipeline::{
    align_features_and_targets, load_raw_data, CleanerConfig, FeatureCleaner, FeatureTransformer,
    Mode, Processor, StageOutput, TargetCleaner, TargetTransformer, Vocabulary,
};
use crate::report::{display_vocabulary, PipelineSummary};
use crate::utils::{
    create_spinner, finish_with_error, finish_with_success, print_info, print_loaded,
    print_saved, print_step_header, print_step_time, ConfigEntry,
};

/// File names written by `preprocess` into its output directory
pub const FEATURES_FILE: &str = "features.parquet";
pub const TARGETS_FILE: &str = "targets.parquet";
pub const DATASET_FILE: &str = "dataset.parquet";

/// Execute one subcommand and return the summary of the stages it ran
pub fn run(command: &Commands) -> Result<PipelineSummary> {
    let mut summary = PipelineSummary::new();

    match command {
        Commands::Load { input, output } => {
            let data = load_step(input, &mut summary)?;
            save_table(data, output, &mut summary)?;
        }
        Commands::CleanFeatures {
            input,
            output,
            mode,
            percentage,
        } => {
            let mappings = MappingTables::survey()?;
            let cleaner = FeatureCleaner::new(*mode, &mappings, CleanerConfig::new(*percentage)?)?;
            let data = read_input(input)?;
            let cleaned = run_stage(&cleaner, &data, &mut summary)?;
            save_table(cleaned, output, &mut summary)?;
        }
        Commands::TransformFeatures {
            input,
            output,
            mode,
            labels_path,
        } => {
            let vocabulary = load_vocabulary_for(*mode, labels_path)?;
            let transformer = FeatureTransformer::new(*mode, vocabulary.as_ref())?;
            let data = read_input(input)?;
            let encoded = run_stage(&transformer, &data, &mut summary)?;
            if let Some(learned) = &encoded.learned {
                save_vocabulary(learned, labels_path, &mut summary)?;
            }
            save_table(encoded.features, output, &mut summary)?;
        }
        Commands::CleanTargets { input, output } => {
            let data = read_input(input)?;
            let cleaned = run_stage(&TargetCleaner, &data, &mut summary)?;
            save_table(cleaned, output, &mut summary)?;
        }
        Commands::TransformTargets { input, output } => {
            let data = read_input(input)?;
            let transformed = run_stage(&TargetTransformer, &data, &mut summary)?;
            save_table(transformed, output, &mut summary)?;
        }
        Commands::Preprocess {
            input,
            output,
            mode,
            labels_path,
            percentage,
        } => {
            let labels_path = labels_path
                .clone()
                .unwrap_or_else(|| default_labels_path(output));
            run_preprocess(input, output, *mode, &labels_path, *percentage, &mut summary)?;
        }
    }

    Ok(summary)
}

/// Features always; targets and the aligned dataset in train mode only
fn run_preprocess(
    inputs: &[PathBuf],
    output_dir: &Path,
    mode: Mode,
    labels_path: &Path,
    percentage: f64,
    summary: &mut PipelineSummary,
) -> Result<()> {
    let mappings = MappingTables::survey()?;
    let cleaner = FeatureCleaner::new(mode, &mappings, CleanerConfig::new(percentage)?)?;
    let vocabulary = load_vocabulary_for(mode, labels_path)?;
    let transformer = FeatureTransformer::new(mode, vocabulary.as_ref())?;

    let raw = load_step(inputs, summary)?;
    let cleaned = run_stage(&cleaner, &raw, summary)?;
    let encoded = run_stage(&transformer, &cleaned, summary)?;

    if let Some(learned) = &encoded.learned {
        save_vocabulary(learned, labels_path, summary)?;
    }

    if mode == Mode::Inference {
        print_info("Inference mode: targets are not processed");
        return save_table(encoded.features, &output_dir.join(FEATURES_FILE), summary);
    }

    let cleaned_targets = run_stage(&TargetCleaner, &raw, summary)?;
    let targets = run_stage(&TargetTransformer, &cleaned_targets, summary)?;
    let dataset = align_features_and_targets(&encoded.features, &targets)
        .context("Failed to match features with targets")?;
    info!("Aligned dataset has {} records", dataset.height());

    save_table(encoded.features, &output_dir.join(FEATURES_FILE), summary)?;
    save_table(targets, &output_dir.join(TARGETS_FILE), summary)?;
    save_table(dataset, &output_dir.join(DATASET_FILE), summary)
}

/// Run one stage with a spinner and record it in the summary
fn run_stage<P: Processor>(
    processor: &P,
    data: &DataFrame,
    summary: &mut PipelineSummary,
) -> Result<P::Output> {
    print_step_header(summary.stages.len() + 1, processor.name());

    let start = Instant::now();
    let spinner = create_spinner(&format!("Running {}...", processor.name()));
    let output = match processor.execute(data) {
        Ok(output) => output,
        Err(e) => {
            finish_with_error(&spinner, &format!("{} failed", processor.name()));
            return Err(e).with_context(|| format!("Stage '{}' failed", processor.name()));
        }
    };

    let rows_out = output.table().height();
    finish_with_success(
        &spinner,
        &format!("{} rows in, {} rows out", data.height(), rows_out),
    );

    let elapsed = start.elapsed();
    summary.record(processor.name(), data.height(), rows_out, elapsed);
    print_step_time(elapsed);
    Ok(output)
}

fn load_step(inputs: &[PathBuf], summary: &mut PipelineSummary) -> Result<DataFrame> {
    print_step_header(summary.stages.len() + 1, "load");

    let start = Instant::now();
    let spinner = create_spinner("Reading raw survey files...");
    let data = match load_raw_data(inputs) {
        Ok(data) => data,
        Err(e) => {
            finish_with_error(&spinner, "Loading failed");
            return Err(e).context("Failed to load raw survey files");
        }
    };
    finish_with_success(
        &spinner,
        &format!("Read {} file(s), {} rows", inputs.len(), data.height()),
    );

    let elapsed = start.elapsed();
    summary.record("load", data.height(), data.height(), elapsed);
    print_step_time(elapsed);
    Ok(data)
}

fn read_input(path: &Path) -> Result<DataFrame> {
    let data = read_table(path, None)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    print_loaded(path, data.height());
    Ok(data)
}

fn save_table(mut data: DataFrame, path: &Path, summary: &mut PipelineSummary) -> Result<()> {
    write_table(&mut data, path)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    print_saved(path);
    summary.add_output(path.display().to_string());
    Ok(())
}

/// Inference needs the vocabulary before any row is read
fn load_vocabulary_for(mode: Mode, labels_path: &Path) -> Result<Option<Vocabulary>> {
    match mode {
        Mode::Train => Ok(None),
        Mode::Inference => {
            let vocabulary: Vocabulary = read_object(labels_path, None).with_context(|| {
                format!("Failed to read vocabulary: {}", labels_path.display())
            })?;
            vocabulary.validate()?;
            Ok(Some(vocabulary))
        }
    }
}

fn save_vocabulary(
    vocabulary: &Vocabulary,
    labels_path: &Path,
    summary: &mut PipelineSummary,
) -> Result<()> {
    write_object(vocabulary, labels_path)
        .with_context(|| format!("Failed to write vocabulary: {}", labels_path.display()))?;
    display_vocabulary(vocabulary);
    print_saved(labels_path);
    summary.add_output(labels_path.display().to_string());
    Ok(())
}

/// Configuration card lines for a subcommand
pub fn config_entries(command: &Commands) -> Vec<ConfigEntry<'static>> {
    match command {
        Commands::Load { input, output } => vec![
            inputs_entry(input),
            ConfigEntry::path("Output:", output),
        ],
        Commands::CleanFeatures {
            input,
            output,
            mode,
            percentage,
        } => vec![
            ConfigEntry::path("Input:", input),
            ConfigEntry::path("Output:", output),
            ConfigEntry::new("Mode:", mode),
            ConfigEntry::new("Percentage:", format!("{:.1}%", percentage * 100.0)),
        ],
        Commands::TransformFeatures {
            input,
            output,
            mode,
            labels_path,
        } => vec![
            ConfigEntry::path("Input:", input),
            ConfigEntry::path("Output:", output),
            ConfigEntry::new("Mode:", mode),
            ConfigEntry::path("Labels:", labels_path),
        ],
        Commands::CleanTargets { input, output } | Commands::TransformTargets { input, output } => {
            vec![
                ConfigEntry::path("Input:", input),
                ConfigEntry::path("Output:", output),
            ]
        }
        Commands::Preprocess {
            input,
            output,
            mode,
            labels_path,
            percentage,
        } => {
            let labels = labels_path
                .clone()
                .unwrap_or_else(|| default_labels_path(output));
            vec![
                inputs_entry(input),
                ConfigEntry::path("Output dir:", output),
                ConfigEntry::new("Mode:", mode),
                ConfigEntry::path("Labels:", &labels),
                ConfigEntry::new("Percentage:", format!("{:.1}%", percentage * 100.0)),
            ]
        }
    }
}

fn inputs_entry(inputs: &[PathBuf]) -> ConfigEntry<'static> {
    match inputs {
        [single] => ConfigEntry::path("Input:", single),
        many => ConfigEntry::new("Input:", format!("{} files", many.len())),
    }
}
