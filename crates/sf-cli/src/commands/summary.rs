//! Summary command for resource event durations.
//!
//! Classifies a resource event payload, keeps the events that overlap the
//! requested window and prints per-group, per-resource totals.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use sf_core::temporal::format_query_timestamp;
use sf_core::{DurationSummary, ResourceEvent, classify_resource_events, summarize_durations};

use crate::Config;
use crate::commands::util::{format_duration, parse_time_arg, read_json_input};

/// Grouping applied before the per-resource split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One group per resource.
    Resource,
    /// Alarm, delay, job, stoppage or plain event.
    Kind,
    /// Alarm text, delay reason, job key or stoppage cause.
    Marker,
    /// UTC calendar day of the event start.
    Day,
}

impl GroupBy {
    const fn label(self) -> &'static str {
        match self {
            Self::Resource => "RESOURCE",
            Self::Kind => "KIND",
            Self::Marker => "MARKER",
            Self::Day => "DAY",
        }
    }
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// JSON file of resource events; stdin when omitted or "-".
    pub input: Option<PathBuf>,

    /// Grouping key (defaults to the configured `group_by`).
    #[arg(long, value_enum)]
    pub by: Option<GroupBy>,

    /// Only count events ending after this time (ISO 8601 or "2 hours ago").
    #[arg(long)]
    pub after: Option<String>,

    /// Only count events starting before this time.
    #[arg(long)]
    pub before: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &SummaryArgs, config: &Config) -> Result<()> {
    let payload = read_json_input(args.input.as_deref())?;
    let events =
        classify_resource_events(payload).context("failed to classify resource events")?;

    let after = args.after.as_deref().map(parse_time_arg).transpose()?;
    let before = args.before.as_deref().map(parse_time_arg).transpose()?;
    let total = events.len();
    let events: Vec<ResourceEvent> = events
        .into_iter()
        .filter(|event| event.span().overlaps(after, before))
        .collect();
    tracing::debug!(total, kept = events.len(), ?after, ?before, "filtered resource events");

    let group_by = args.by.unwrap_or(config.group_by);
    let summary = summarize_durations(Some(events.as_slice()), |event| group_key(group_by, event));

    if args.json || config.summary_json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        let window = format_window(after, before);
        write!(
            writer,
            "{}",
            format_summary(summary.as_ref(), group_by, window.as_deref())
        )?;
    }
    Ok(())
}

fn group_key(group_by: GroupBy, event: &ResourceEvent) -> String {
    match group_by {
        GroupBy::Resource => event.span().resource.clone(),
        GroupBy::Kind => event.kind().to_string(),
        GroupBy::Marker => event.marker().unwrap_or_else(|| "(none)".to_string()),
        GroupBy::Day => DateTime::<Utc>::from_timestamp_millis(event.span().start).map_or_else(
            || "(out of range)".to_string(),
            |start| start.date_naive().to_string(),
        ),
    }
}

fn format_window(after: Option<i64>, before: Option<i64>) -> Option<String> {
    if after.is_none() && before.is_none() {
        return None;
    }
    let bound = |ms: Option<i64>| {
        ms.and_then(format_query_timestamp)
            .unwrap_or_else(|| "(open)".to_string())
    };
    Some(format!("{} .. {}", bound(after), bound(before)))
}

/// Formats the human-readable summary.
///
/// Per-resource lines are listed under each group unless the grouping is by
/// resource already.
pub fn format_summary(
    summary: Option<&DurationSummary>,
    group_by: GroupBy,
    window: Option<&str>,
) -> String {
    let mut output = String::new();

    let header = format!("DURATION BY {}", group_by.label());
    writeln!(output, "{header}").unwrap();
    writeln!(output, "{}", "─".repeat(header.chars().count())).unwrap();
    if let Some(window) = window {
        writeln!(output, "Window: {window}").unwrap();
    }

    let Some(summary) = summary else {
        writeln!(output, "No resource events in range.").unwrap();
        return output;
    };

    for (key, resources) in summary.iter() {
        writeln!(
            output,
            "{key:<32} {:>8}",
            format_duration(summary.total_for(key))
        )
        .unwrap();
        if group_by != GroupBy::Resource {
            for (resource, total_ms) in resources {
                writeln!(output, "  {resource:<30} {:>8}", format_duration(*total_ms)).unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_duration(summary.grand_total())).unwrap();
    output
}
