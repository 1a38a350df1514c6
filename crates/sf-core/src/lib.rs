//! Core logic for shop-floor scheduling payloads.
//!
//! This crate contains the pure transformations applied to data fetched from
//! the Live and PE services:
//! - Identifier codec: composite identifiers to and from flat wire keys
//! - Temporal normalization: ISO-8601 text to epoch milliseconds
//! - Classification: untyped entries to jobs, stoppages, inbox entries and
//!   resource events
//! - Summaries: per-resource duration totals
//! - Color contrast: legible text color for a background

pub mod classify;
pub mod color;
mod error;
pub mod id;
pub mod model;
pub mod summary;
pub mod temporal;

pub use classify::{
    classify_entities, classify_entity, classify_resource_event, classify_resource_events,
    parse_inbox_groups,
};
pub use color::contrasting_color;
pub use error::{ClassificationError, FormatError};
pub use id::{Id, IdPart, decode, encode, id_to_string};
pub use model::{
    AlarmEvent, DelayEvent, EventSpan, InboxGroup, InboxJob, Job, Parameter, ResourceEvent,
    ResourceJobEvent, ScheduledEntity, Stoppage,
};
pub use summary::{DurationSummary, TimedEvent, summarize_durations};
pub use temporal::{normalize, normalize_event_times, normalize_events};
