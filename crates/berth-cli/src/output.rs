//! Formatted output helpers for CLI commands.
//!
//! Provides colored outcome markers and human-readable durations.

use std::time::Duration;

use berth_deploy::ApplyOutcome;

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";
pub const YELLOW: &str = "\x1b[33m";
pub const RED: &str = "\x1b[31m";
pub const RESET: &str = "\x1b[0m";

/// Returns the marker and label printed for an apply outcome.
#[must_use]
pub const fn outcome_marker(outcome: ApplyOutcome) -> (&'static str, &'static str) {
    match outcome {
        ApplyOutcome::Created => ("+", "created"),
        ApplyOutcome::Updated => ("~", "updated"),
        ApplyOutcome::Skipped => ("!", "skipped, owned by another stack"),
    }
}

/// Returns the color used for an apply outcome.
#[must_use]
pub const fn outcome_color(outcome: ApplyOutcome) -> &'static str {
    match outcome {
        ApplyOutcome::Created => GREEN,
        ApplyOutcome::Updated => CYAN,
        ApplyOutcome::Skipped => YELLOW,
    }
}

/// Formats a duration as minutes and seconds (e.g., "2m 05s").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
