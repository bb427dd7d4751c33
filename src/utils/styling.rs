//! Terminal styling for the pipeline output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");

/// One line of the configuration card
pub struct ConfigEntry<'a> {
    pub label: &'a str,
    pub value: String,
}

impl<'a> ConfigEntry<'a> {
    pub fn new(label: &'a str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }

    pub fn path(label: &'a str, path: &Path) -> Self {
        Self::new(label, truncate_path(path, 36))
    }
}

pub fn print_banner(version: &str, command: &str) {
    println!();
    println!(
        "    {} {}",
        style("salaryprep").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style(format!("Salary survey preprocessing · {}", command)).dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(entries: &[ConfigEntry<'_>]) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style(format!("{}Configuration", GEAR)).cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    for entry in entries {
        println!(
            "    │  {:<14} {:<37}│",
            entry.label,
            truncate_string(&entry.value, 36)
        );
    }
    println!("    └{}┘", line);
    println!();
}

pub fn print_step_header(step_num: usize, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

pub fn print_saved(path: &Path) {
    println!("    {} {}", SAVE, style(path.display()).dim());
}

pub fn print_loaded(path: &Path, rows: usize) {
    println!(
        "    {} {} {}",
        FOLDER,
        path.display(),
        style(format!("({} rows)", rows)).dim()
    );
}

pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("completed in {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Preprocessing complete!").green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of long values; counts characters, not bytes.
fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}
