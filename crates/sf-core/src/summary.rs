//! Duration totals over resource events.
//!
//! Groups events by a caller-chosen key and, within each group, by resource
//! name, summing `end - start`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{EventSpan, ResourceEvent, Stoppage};

/// An event with a time range attributed to a resource.
///
/// This trait lets the aggregation run over classified events, bare spans,
/// or test fixtures alike.
pub trait TimedEvent {
    /// Start, epoch milliseconds.
    fn start_ms(&self) -> i64;

    /// End, epoch milliseconds.
    fn end_ms(&self) -> i64;

    /// Name of the resource the time is attributed to.
    fn resource(&self) -> &str;

    /// Elapsed milliseconds, negative for a reversed range. Saturates at the
    /// `i64` bounds.
    fn duration_ms(&self) -> i64 {
        self.end_ms().saturating_sub(self.start_ms())
    }
}

impl TimedEvent for EventSpan {
    fn start_ms(&self) -> i64 {
        self.start
    }

    fn end_ms(&self) -> i64 {
        self.end
    }

    fn resource(&self) -> &str {
        &self.resource
    }
}

impl TimedEvent for Stoppage {
    fn start_ms(&self) -> i64 {
        self.span.start
    }

    fn end_ms(&self) -> i64 {
        self.span.end
    }

    fn resource(&self) -> &str {
        &self.span.resource
    }
}

impl TimedEvent for ResourceEvent {
    fn start_ms(&self) -> i64 {
        self.span().start
    }

    fn end_ms(&self) -> i64 {
        self.span().end
    }

    fn resource(&self) -> &str {
        &self.span().resource
    }
}

/// Accumulated durations: group key → resource → milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DurationSummary(BTreeMap<String, BTreeMap<String, i64>>);

impl DurationSummary {
    /// Total for one resource within one group.
    pub fn get(&self, key: &str, resource: &str) -> Option<i64> {
        self.0.get(key)?.get(resource).copied()
    }

    /// Sum over all resources of one group; zero for an unknown group.
    /// Saturates at the `i64` bounds.
    pub fn total_for(&self, key: &str) -> i64 {
        self.0
            .get(key)
            .map_or(0, |resources| resources.values().fold(0, |sum, ms| sum.saturating_add(*ms)))
    }

    /// Sum over every group. Saturates at the `i64` bounds.
    pub fn grand_total(&self) -> i64 {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .fold(0, |sum, ms| sum.saturating_add(*ms))
    }

    /// Groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, i64>)> {
        self.0.iter().map(|(key, resources)| (key.as_str(), resources))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(key, resource, total)` triples whose total came out negative.
    pub fn negative_entries(&self) -> Vec<(&str, &str, i64)> {
        self.iter()
            .flat_map(|(key, resources)| {
                resources
                    .iter()
                    .filter(|(_, total)| **total < 0)
                    .map(move |(resource, total)| (key, resource.as_str(), *total))
            })
            .collect()
    }
}

/// Sums event durations per `(key_of(event), event.resource())`.
///
/// Returns `None` for absent or empty input, so "no data" stays distinct
/// from a summary of zero-length events.
pub fn summarize_durations<E, K, F>(events: Option<&[E]>, key_of: F) -> Option<DurationSummary>
where
    E: TimedEvent,
    K: Into<String>,
    F: Fn(&E) -> K,
{
    let events = events.filter(|events| !events.is_empty())?;

    let mut totals: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for event in events {
        // end >= start is the caller's contract and is not checked here;
        // reversed ranges subtract. A candidate for a validation error.
        let duration_ms = event.duration_ms();
        let total = totals
            .entry(key_of(event).into())
            .or_default()
            .entry(event.resource().to_string())
            .or_insert(0);
        let current = *total;
        *total = current.checked_add(duration_ms).unwrap_or_else(|| {
            tracing::warn!(
                resource = event.resource(),
                current,
                duration_ms,
                "duration total overflows, saturating"
            );
            current.saturating_add(duration_ms)
        });
    }

    let summary = DurationSummary(totals);
    for (key, resource, total_ms) in summary.negative_entries() {
        tracing::warn!(key, resource, total_ms, "accumulated duration is negative");
    }
    tracing::debug!(
        events = events.len(),
        groups = summary.len(),
        "summarized event durations"
    );
    Some(summary)
}
