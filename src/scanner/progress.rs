//! Scan progress tracking.
//!
//! Counts completed ports against a fixed total. Cloning yields another handle
//! on the same counters, so a UI can observe a running scan.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

#[derive(Debug)]
struct Counters {
    completed: AtomicU64,
    total: AtomicU64,
}

/// Thread-safe completion counter with an optional terminal progress bar.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    counters: Arc<Counters>,
    bar: ProgressBar,
}

impl ProgressReporter {
    /// A reporter with no visible output.
    pub fn hidden() -> Self {
        Self {
            counters: Arc::new(Counters {
                completed: AtomicU64::new(0),
                total: AtomicU64::new(0),
            }),
            bar: ProgressBar::hidden(),
        }
    }

    /// A reporter that draws a progress bar on stderr.
    pub fn with_bar() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self {
            bar,
            ..Self::hidden()
        }
    }

    /// Reset the counters for a scan of `total` ports.
    pub fn start(&self, total: u64) {
        self.counters.completed.store(0, Ordering::SeqCst);
        self.counters.total.store(total, Ordering::SeqCst);
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    /// Record one finished port. Returns the new completed count.
    pub fn advance(&self) -> u64 {
        let completed = self.counters.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.bar.inc(1);
        completed
    }

    /// Show a status note next to the bar.
    pub fn note(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// The note currently shown next to the bar.
    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn completed(&self) -> u64 {
        self.counters.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.counters.total.load(Ordering::SeqCst)
    }

    pub fn is_done(&self) -> bool {
        self.completed() >= self.total()
    }

    /// Stop drawing, leaving the final state on screen.
    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(message.into());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::hidden()
    }
}
