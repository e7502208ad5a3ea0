//! Duration parsing utilities.

use std::time::Duration;

use anyhow::Context;

/// Parse a duration string like "1h", "30m", "300s", "300" into seconds.
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration_to_secs(s: &str) -> anyhow::Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (num_str, unit, scale) = if let Some(num_str) = s.strip_suffix('h') {
        (num_str, "hours", 3600)
    } else if let Some(num_str) = s.strip_suffix('m') {
        (num_str, "minutes", 60)
    } else if let Some(num_str) = s.strip_suffix('s') {
        (num_str, "seconds", 1)
    } else {
        (s, "duration", 1)
    };

    let value: u64 = num_str
        .parse()
        .with_context(|| format!("Invalid {unit} value: {num_str}"))?;
    value
        .checked_mul(scale)
        .with_context(|| format!("Duration too large: {s}"))
}

/// Parse a run duration for the CLI. Zero is rejected.
pub fn parse_run_duration(s: &str) -> anyhow::Result<Duration> {
    let secs = parse_duration_to_secs(s)?;
    if secs == 0 {
        anyhow::bail!("Duration must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
