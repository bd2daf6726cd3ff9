//! Progress indicators for brocade CLI.

use indicatif::{ProgressBar, ProgressStyle};
use reconcile::{ApplyResult, ProgressCallback};

use crate::ui;

/// Drives an indicatif bar from executor progress events.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.bar = Some(bar);
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        let Some(bar) = &self.bar else {
            return;
        };
        bar.set_message(format!("{} {}", ui::result_symbol(result), id));
        bar.inc(1);
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
