//! Progress display for long-running provisioning steps
//!
//! Each step shows a spinner while it runs and ends with a buildpack-style
//! status line carrying the elapsed wall-clock time:
//!
//! ```text
//! -----> Expanding Tomcat 7.0.42 to .tomcat (1.2s)
//! ```
//!
//! Timing is purely informational.

use std::time::{Duration, Instant};

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;

/// Prefix of every status line
const STATUS_ARROW: &str = "----->";

/// Spinner bracketing a single step
pub struct StepProgress {
    spinner: ProgressBar,
    label: String,
    started: Instant,
}

impl StepProgress {
    /// Start a step with the given label
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(label.clone());
        spinner.enable_steady_tick(Duration::from_millis(120));

        tracing::debug!(step = %label, "started");

        Self {
            spinner,
            label,
            started: Instant::now(),
        }
    }

    /// Finish the step and print its status line
    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.spinner.finish_and_clear();

        eprintln!(
            "{} {} {}",
            Style::new().green().bold().apply_to(STATUS_ARROW),
            self.label,
            Style::new().dim().apply_to(format_duration(elapsed))
        );
        tracing::info!(step = %self.label, elapsed_ms = elapsed.as_millis() as u64, "finished");

        elapsed
    }

    /// Abandon the step after a failure
    pub fn abandon(self) {
        let elapsed = self.started.elapsed();
        self.spinner.abandon();
        tracing::warn!(step = %self.label, elapsed_ms = elapsed.as_millis() as u64, "failed");
    }
}

/// Run `operation` bracketed by a [`StepProgress`]
pub fn timed<T>(label: impl Into<String>, operation: impl FnOnce() -> Result<T>) -> Result<T> {
    let step = StepProgress::start(label);
    match operation() {
        Ok(value) => {
            step.finish();
            Ok(value)
        }
        Err(e) => {
            step.abandon();
            Err(e)
        }
    }
}

/// Format an elapsed duration as `(1.2s)`
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        format!("({seconds:.1}s)")
    } else {
        let minutes = (seconds / 60.0).floor();
        format!("({}m {:.1}s)", minutes as u64, seconds - minutes * 60.0)
    }
}
