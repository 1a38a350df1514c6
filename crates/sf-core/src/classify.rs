//! Structural classification of untyped payloads.
//!
//! No discriminant sent by the server is trusted. The variant is chosen by
//! which marker fields are present, checked in a fixed priority order, so any
//! consumer holding the same JSON reaches the same answer. A marker whose
//! value is `null` counts as absent.

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ClassificationError, json_type_name};
use crate::model::{
    AlarmEvent, DelayEvent, EventSpan, InboxGroup, InboxJob, Job, ResourceEvent,
    ResourceJobEvent, ScheduledEntity, Stoppage,
};
use crate::temporal::normalize_event_times;

/// Marker fields of the resource event stream, in priority order.
pub const RESOURCE_EVENT_MARKERS: [&str; 4] = ["alarm", "delay", "job", "stoppage"];

/// Classifies one jobs/stoppages/search entry.
///
/// Priority: a `stoppage` field selects [`ScheduledEntity::Stoppage`]
/// whatever else is present; then a `start` selects
/// [`ScheduledEntity::Job`]; an entry without `start` but with an `id` is an
/// inbox entry. Anything else is rejected rather than guessed.
pub fn classify_entity(value: Value) -> Result<ScheduledEntity, ClassificationError> {
    let fields = into_object(value)?;

    if has_field(&fields, "stoppage") {
        return build(fields, "stoppage").map(ScheduledEntity::Stoppage);
    }
    if has_field(&fields, "start") {
        return build::<Job>(fields, "job").map(ScheduledEntity::Job);
    }
    if has_field(&fields, "id") {
        return build::<InboxJob>(fields, "inbox").map(ScheduledEntity::Inbox);
    }
    Err(unrecognized(&fields))
}

/// Classifies one resource event.
///
/// Priority: `alarm`, `delay`, `job`, `stoppage`; an event with none of them
/// is a generic occupancy span.
pub fn classify_resource_event(value: Value) -> Result<ResourceEvent, ClassificationError> {
    let fields = into_object(value)?;

    let marker = RESOURCE_EVENT_MARKERS
        .into_iter()
        .find(|marker| has_field(&fields, marker));

    match marker {
        Some("alarm") => build::<AlarmEvent>(fields, "alarm").map(ResourceEvent::Alarm),
        Some("delay") => build::<DelayEvent>(fields, "delay").map(ResourceEvent::Delay),
        Some("job") => build::<ResourceJobEvent>(fields, "job").map(ResourceEvent::Job),
        Some(_) => build::<Stoppage>(fields, "stoppage").map(ResourceEvent::Stoppage),
        None => build::<EventSpan>(fields, "event").map(ResourceEvent::Generic),
    }
}

/// Normalizes and classifies every entry of a jobs/stoppages/search payload.
pub fn classify_entities(payload: Value) -> Result<Vec<ScheduledEntity>, ClassificationError> {
    classify_batch(payload, classify_entity)
}

/// Normalizes and classifies every entry of a resource event payload.
pub fn classify_resource_events(payload: Value) -> Result<Vec<ResourceEvent>, ClassificationError> {
    classify_batch(payload, classify_resource_event)
}

/// Parses an inbox payload and back-fills each job's resource from its
/// group.
pub fn parse_inbox_groups(payload: Value) -> Result<Vec<InboxGroup>, ClassificationError> {
    if !payload.is_array() {
        return Err(ClassificationError::NotAnArray {
            found: json_type_name(&payload),
        });
    }
    let mut groups: Vec<InboxGroup> =
        serde_json::from_value(payload).map_err(|source| ClassificationError::InvalidShape {
            variant: "inbox group",
            source,
        })?;
    for group in &mut groups {
        group.backfill_resources();
    }
    tracing::debug!(groups = groups.len(), "parsed inbox groups");
    Ok(groups)
}

fn classify_batch<T, F>(payload: Value, classify: F) -> Result<Vec<T>, ClassificationError>
where
    T: Send,
    F: Fn(Value) -> Result<T, ClassificationError> + Sync,
{
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(ClassificationError::NotAnArray {
                found: json_type_name(&other),
            });
        }
    };

    let count = items.len();
    let classified = items
        .into_par_iter()
        .enumerate()
        .map(|(index, mut item)| {
            if let Value::Object(event) = &mut item {
                normalize_event_times(event);
            }
            classify(item).map_err(|source| ClassificationError::Item {
                index,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count, "classified payload entries");
    Ok(classified)
}

fn into_object(value: Value) -> Result<Map<String, Value>, ClassificationError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ClassificationError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

fn has_field(fields: &Map<String, Value>, name: &str) -> bool {
    fields.get(name).is_some_and(|value| !value.is_null())
}

fn build<T: DeserializeOwned>(
    fields: Map<String, Value>,
    variant: &'static str,
) -> Result<T, ClassificationError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|source| ClassificationError::InvalidShape { variant, source })
}

fn unrecognized(fields: &Map<String, Value>) -> ClassificationError {
    ClassificationError::Unrecognized {
        fields: fields.keys().cloned().collect(),
    }
}
