//! Classify command for turning raw payloads into tagged entries.
//!
//! Reads a JSON array captured from the services, normalizes its dates and
//! prints one JSON object per entry with a `kind` tag.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use sf_core::temporal::{normalize_events, unparsed_time_fields};
use sf_core::{
    ScheduledEntity, classify_entities, classify_resource_events, contrasting_color,
    parse_inbox_groups,
};

use crate::Config;
use crate::commands::util::read_json_input;

/// Payload shapes understood by `sf classify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    /// Jobs, stoppages and search results.
    Entities,
    /// Alarm, delay, job and stoppage events per resource.
    ResourceEvents,
    /// Inbox jobs grouped by resource group.
    Inbox,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// JSON file to read; stdin when omitted or "-".
    pub input: Option<PathBuf>,

    /// Shape of the payload.
    #[arg(long, value_enum, default_value_t = PayloadKind::Entities)]
    pub kind: PayloadKind,

    /// Order entries by start time (unscheduled entries last).
    #[arg(long)]
    pub sort: bool,

    /// Fail on `start`/`end` text that is not a date.
    #[arg(long)]
    pub strict_dates: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ClassifyArgs, config: &Config) -> Result<()> {
    let mut payload = read_json_input(args.input.as_deref())?;

    if args.strict_dates || config.strict_dates {
        normalize_events(&mut payload);
        check_dates(&payload)?;
    }

    match args.kind {
        PayloadKind::Entities => {
            let mut entities =
                classify_entities(payload).context("failed to classify entries")?;
            if args.sort {
                entities.sort_by_key(|entity| (entity.start().is_none(), entity.start()));
            }
            for entity in &entities {
                writeln!(writer, "{}", entity_line(entity)?)?;
            }
        }
        PayloadKind::ResourceEvents => {
            let mut events =
                classify_resource_events(payload).context("failed to classify resource events")?;
            if args.sort {
                events.sort_by_key(|event| event.span().start);
            }
            for event in &events {
                writeln!(writer, "{}", serde_json::to_string(event)?)?;
            }
        }
        PayloadKind::Inbox => {
            let groups = parse_inbox_groups(payload).context("failed to parse inbox groups")?;
            for group in &groups {
                writeln!(writer, "{}", serde_json::to_string(group)?)?;
            }
        }
    }

    Ok(())
}

/// An entity as printed, with a `foreground` color when it has a
/// background color.
#[derive(Serialize)]
struct EntityLine<'a> {
    #[serde(flatten)]
    entity: &'a ScheduledEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    foreground: Option<&'static str>,
}

fn entity_line(entity: &ScheduledEntity) -> Result<String> {
    let foreground = entity
        .color()
        .and_then(|color| match contrasting_color(color) {
            Ok(foreground) => Some(foreground),
            Err(err) => {
                tracing::warn!(id = %entity.id(), error = %err, "skipping foreground for bad color");
                None
            }
        });
    Ok(serde_json::to_string(&EntityLine { entity, foreground })?)
}

fn check_dates(payload: &Value) -> Result<()> {
    let Some(items) = payload.as_array() else {
        return Ok(());
    };
    for (index, item) in items.iter().enumerate() {
        if let Some(event) = item.as_object() {
            let fields = unparsed_time_fields(event);
            if !fields.is_empty() {
                bail!("entry {index}: unparsable date in {}", fields.join(", "));
            }
        }
    }
    Ok(())
}
