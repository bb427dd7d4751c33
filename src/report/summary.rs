//! Pipeline summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::Vocabulary;

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub name: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub elapsed: Duration,
}

impl StageRecord {
    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Summary of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub stages: Vec<StageRecord>,
    pub outputs: Vec<String>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, rows_in: usize, rows_out: usize, elapsed: Duration) {
        self.stages.push(StageRecord {
            name: name.to_string(),
            rows_in,
            rows_out,
            elapsed,
        });
    }

    pub fn add_output(&mut self, path: impl Into<String>) {
        self.outputs.push(path.into());
    }

    pub fn total_dropped(&self) -> usize {
        self.stages.iter().map(StageRecord::dropped).sum()
    }

    pub fn total_time(&self) -> Duration {
        self.stages.iter().map(|s| s.elapsed).sum()
    }

    /// Render the stage table without printing it
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Rows In").add_attribute(Attribute::Bold),
            Cell::new("Rows Out").add_attribute(Attribute::Bold),
            Cell::new("Dropped").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
        ]);

        for stage in &self.stages {
            let dropped = stage.dropped();
            table.add_row(vec![
                Cell::new(&stage.name),
                Cell::new(stage.rows_in),
                Cell::new(stage.rows_out).fg(Color::Green),
                Cell::new(dropped).fg(if dropped == 0 {
                    Color::White
                } else {
                    Color::Red
                }),
                Cell::new(format!("{:.2}s", stage.elapsed.as_secs_f64())),
            ]);
        }

        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(""),
            Cell::new(self.total_dropped()).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64()))
                .add_attribute(Attribute::Bold),
        ]);
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PIPELINE SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.outputs.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("💾").cyan(),
                style("OUTPUTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for output in &self.outputs {
                println!("      {} {}", style("•").dim(), output);
            }
        }
    }
}

/// Print the learned labels per categorical column
pub fn display_vocabulary(vocabulary: &Vocabulary) {
    println!();
    println!(
        "    {} {}",
        style("🔤").cyan(),
        style("VOCABULARY").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Labels").add_attribute(Attribute::Bold),
        Cell::new("Unseen Code").add_attribute(Attribute::Bold),
    ]);

    for column in vocabulary.columns() {
        let labels = vocabulary.labels(column).unwrap_or_default();
        table.add_row(vec![
            Cell::new(column),
            Cell::new(labels.join(", ")),
            Cell::new(labels.len()).fg(Color::Yellow),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
