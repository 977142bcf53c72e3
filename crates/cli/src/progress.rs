//! Progress indicators
//!
//! Provides progress bars and spinners for long-running operations.

use fuzzy_lookup_search::ProgressObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn pair_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {human_pos}/{human_len} pairs ({per_sec}, {eta})")
        .unwrap()
        .progress_chars("█▓░")
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with an error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {}", message));
}

/// Engine progress observer that drives an `indicatif` bar
///
/// Created hidden; the bar is sized and shown when scoring starts.
pub struct MatchProgress {
    bar: ProgressBar,
    visible: bool,
}

impl MatchProgress {
    /// Observer drawing to stderr
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            visible: true,
        }
    }

    /// Observer that counts but never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            visible: false,
        }
    }

    /// The underlying bar
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for MatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for MatchProgress {
    fn on_start(&self, total: u64) {
        self.bar.set_length(total);
        if self.visible {
            self.bar.set_style(pair_style());
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
            self.bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn on_scored(&self, count: u64) {
        self.bar.inc(count);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}
