//! Human-readable time formatting
//!
//! Track durations are shown the way music players show them: `M:SS` below
//! one hour, `H:MM:SS` from one hour up.

use std::time::Duration;

const SECONDS_PER_HOUR: u64 = 3600;

/// Format a track duration for display.
///
/// Sub-second remainders are truncated.
///
/// # Examples
///
/// ```
/// use bcdl_common::human_time::format_track_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_track_duration(Duration::from_secs(225)), "3:45");
/// assert_eq!(format_track_duration(Duration::from_secs(7)), "0:07");
/// assert_eq!(format_track_duration(Duration::from_secs(3661)), "1:01:01");
/// ```
pub fn format_track_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / SECONDS_PER_HOUR;
    let mins = (total % SECONDS_PER_HOUR) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format an optional duration, using `--:--` when unknown.
pub fn format_optional_duration(duration: Option<Duration>) -> String {
    duration
        .map(format_track_duration)
        .unwrap_or_else(|| "--:--".to_string())
}
