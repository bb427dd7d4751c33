//! Spinner helpers using indicatif

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for a pipeline stage of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("    {spinner:.cyan} {msg}") {
        pb.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

pub fn finish_with_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("❌ {}", message));
}
