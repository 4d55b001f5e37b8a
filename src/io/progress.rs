//! Progress display for batch training with automatic batching for large sets

use crate::analysis::training::TrainingSummary;
use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Coordinates progress display while training images are processed
///
/// Shows one line per recent file plus, for large batches, a single bar
/// counting processed files.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    /// Stores (`filename`, `status`) for rolling window display
    file_states: Vec<(String, String)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static FILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{prefix:>24} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            file_states: Vec::new(),
        }
    }

    /// Initialize progress bars based on file count
    pub fn initialize(&mut self, file_count: usize) {
        let batch_bar = ProgressBar::new(file_count as u64);
        batch_bar.set_style(BATCH_STYLE.clone());
        self.batch_bar = Some(self.multi_progress.add(batch_bar));

        for _ in 0..file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new_spinner();
            bar.set_style(FILE_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Show a file as being trained on
    pub fn start_file(&mut self, index: usize, path: &Path) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.set_state(index, display_name, "training".to_string());
    }

    /// Mark a file as trained
    pub fn complete_file(&mut self, index: usize, summary: &TrainingSummary) {
        let status = format!(
            "✓ {} region(s), {} observation(s)",
            summary.regions, summary.observations
        );
        self.finish_state(index, status);
    }

    /// Mark a file as skipped after an error
    pub fn fail_file(&mut self, index: usize) {
        self.finish_state(index, "✗ skipped".to_string());
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }

    fn finish_state(&mut self, index: usize, status: String) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        let name = self
            .file_states
            .get(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        self.set_state(index, name, status);
    }

    fn set_state(&mut self, index: usize, name: String, status: String) {
        if index >= self.file_states.len() {
            self.file_states
                .resize(index + 1, (String::new(), String::new()));
        }
        if let Some(state) = self.file_states.get_mut(index) {
            *state = (name, status);
        }
        self.update_bars();
    }

    /// Update all progress lines to show the last N active files
    fn update_bars(&self) {
        let active_files: Vec<&(String, String)> = self
            .file_states
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .collect();

        let start_idx = active_files
            .len()
            .saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible_files = active_files.get(start_idx..).unwrap_or(&[]);

        for (bar, (name, status)) in self.file_bars.iter().zip(visible_files.iter().copied()) {
            bar.set_prefix(name.clone());
            bar.set_message(status.clone());
        }

        for bar in self.file_bars.iter().skip(visible_files.len()) {
            bar.set_prefix(String::new());
            bar.set_message(String::new());
        }
    }
}
