//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use regex::Regex;
use serde_json::Value;
use sf_core::temporal::parse_timestamp_ms;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a time argument as epoch milliseconds.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z", "2026-01-15 10:30", "2026-01-15"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_time_arg(s: &str) -> Result<i64> {
    if let Some(ms) = parse_timestamp_ms(s) {
        return Ok(ms);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid time: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    Ok((Utc::now() - duration).timestamp_millis())
}

/// Reads a JSON document from a file, or from stdin when no path (or `-`)
/// is given.
pub fn read_json_input(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };

    serde_json::from_str(&text).context("failed to parse JSON payload")
}

/// Formats milliseconds as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if >= 1 minute, "Xs" below that.
/// Negative totals keep their sign.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return format!("-{}", format_duration(ms.saturating_neg()));
    }
    let total_seconds = ms / 1000;
    let total_minutes = total_seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if total_minutes >= 1 {
        format!("{minutes}m")
    } else {
        format!("{total_seconds}s")
    }
}
