//! Scheduling entities and resource events.
//!
//! Wire payloads carry no discriminant; [`crate::classify`] picks the variant
//! from the fields present. On output every variant carries a `kind` tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::Id;

/// A machine parameter attached to a job. Only `command` is named; the
/// services send other keys too, and they are kept as they came.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An unscheduled (backlog) job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxJob {
    pub id: Id,
    /// Resource (machine group) the job is queued for. Inbox payloads often
    /// omit it per item; see [`InboxGroup::backfill_resources`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    /// Background color as hex text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Standard duration in milliseconds.
    #[serde(
        default,
        deserialize_with = "millis::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub standard_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

/// A job placed on the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(flatten)]
    pub entry: InboxJob,
    /// Scheduled start, epoch milliseconds.
    #[serde(deserialize_with = "millis::deserialize")]
    pub start: i64,
    /// Scheduled end, epoch milliseconds.
    #[serde(
        default,
        deserialize_with = "millis::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed: Option<bool>,
}

/// The time range and resource shared by every resource event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpan {
    /// Epoch milliseconds.
    #[serde(deserialize_with = "millis::deserialize")]
    pub start: i64,
    /// Epoch milliseconds.
    #[serde(deserialize_with = "millis::deserialize")]
    pub end: i64,
    pub resource: String,
}

impl EventSpan {
    /// Elapsed milliseconds. Not validated: a reversed span is negative.
    /// Saturates at the `i64` bounds.
    pub const fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true when the span intersects the half-open window
    /// `[after, before)`. Missing bounds are unbounded.
    pub fn overlaps(&self, after: Option<i64>, before: Option<i64>) -> bool {
        after.is_none_or(|after| self.end > after)
            && before.is_none_or(|before| self.start < before)
    }
}

/// A planned or recorded machine stoppage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stoppage {
    #[serde(flatten)]
    pub span: EventSpan,
    /// Stoppage cause.
    pub stoppage: String,
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A machine alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmEvent {
    #[serde(flatten)]
    pub span: EventSpan,
    pub alarm: String,
}

/// A recorded delay with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayEvent {
    #[serde(flatten)]
    pub span: EventSpan,
    pub delay: String,
}

/// A job occupying a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceJobEvent {
    #[serde(flatten)]
    pub span: EventSpan,
    pub job: Id,
}

/// Millisecond fields arrive as JSON integers or, from some endpoints, as
/// floats. Floats are truncated toward zero.
mod millis {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Number;

    /// 2^63, the first float above the `i64` range.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let number = Number::deserialize(deserializer)?;
        to_millis(&number)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<Number>::deserialize(deserializer)?
            .map(|number| to_millis(&number))
            .transpose()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "range is checked and truncation toward zero is intended"
    )]
    fn to_millis<E: Error>(number: &Number) -> Result<i64, E> {
        if let Some(ms) = number.as_i64() {
            return Ok(ms);
        }
        number
            .as_f64()
            .filter(|ms| (-I64_BOUND..I64_BOUND).contains(ms))
            .map(|ms| ms.trunc() as i64)
            .ok_or_else(|| E::custom(format!("{number} is out of range for milliseconds")))
    }
}

/// Entries of the jobs, stoppages and search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduledEntity {
    Job(Job),
    Stoppage(Stoppage),
    Inbox(InboxJob),
}

impl ScheduledEntity {
    /// Tag used in serialized output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Job(_) => "job",
            Self::Stoppage(_) => "stoppage",
            Self::Inbox(_) => "inbox",
        }
    }

    pub const fn id(&self) -> &Id {
        match self {
            Self::Job(job) => &job.entry.id,
            Self::Stoppage(stoppage) => &stoppage.id,
            Self::Inbox(entry) => &entry.id,
        }
    }

    /// Returns the job when this entry is on the schedule.
    pub const fn as_job(&self) -> Option<&Job> {
        match self {
            Self::Job(job) => Some(job),
            _ => None,
        }
    }

    pub const fn is_stoppage(&self) -> bool {
        matches!(self, Self::Stoppage(_))
    }

    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Job(job) => job.entry.resource.as_deref(),
            Self::Stoppage(stoppage) => Some(&stoppage.span.resource),
            Self::Inbox(entry) => entry.resource.as_deref(),
        }
    }

    /// Background color, for jobs and inbox entries that carry one.
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Job(job) => job.entry.color.as_deref(),
            Self::Stoppage(_) => None,
            Self::Inbox(entry) => entry.color.as_deref(),
        }
    }

    /// Start time used for ordering; inbox entries have none.
    pub const fn start(&self) -> Option<i64> {
        match self {
            Self::Job(job) => Some(job.start),
            Self::Stoppage(stoppage) => Some(stoppage.span.start),
            Self::Inbox(_) => None,
        }
    }
}

/// Entries of the resource event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceEvent {
    Alarm(AlarmEvent),
    Delay(DelayEvent),
    Job(ResourceJobEvent),
    Stoppage(Stoppage),
    #[serde(rename = "event")]
    Generic(EventSpan),
}

impl ResourceEvent {
    pub const fn span(&self) -> &EventSpan {
        match self {
            Self::Alarm(event) => &event.span,
            Self::Delay(event) => &event.span,
            Self::Job(event) => &event.span,
            Self::Stoppage(event) => &event.span,
            Self::Generic(span) => span,
        }
    }

    /// Tag used in serialized output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Alarm(_) => "alarm",
            Self::Delay(_) => "delay",
            Self::Job(_) => "job",
            Self::Stoppage(_) => "stoppage",
            Self::Generic(_) => "event",
        }
    }

    /// The value of the marker field that selected the variant: alarm text,
    /// delay reason, job key or stoppage cause.
    pub fn marker(&self) -> Option<String> {
        match self {
            Self::Alarm(event) => Some(event.alarm.clone()),
            Self::Delay(event) => Some(event.delay.clone()),
            Self::Job(event) => Some(event.job.to_key()),
            Self::Stoppage(event) => Some(event.stoppage.clone()),
            Self::Generic(_) => None,
        }
    }
}

/// Inbox jobs grouped by resource group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxGroup {
    pub group: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<InboxJob>>,
}

impl InboxGroup {
    /// Fills in each job's resource with the group name where the server
    /// omitted it. Resources already present are kept.
    pub fn backfill_resources(&mut self) {
        for job in self.jobs.iter_mut().flatten() {
            if job.resource.is_none() {
                job.resource = Some(self.group.clone());
            }
        }
    }

    /// Number of jobs in the group.
    pub fn job_count(&self) -> usize {
        self.jobs.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::id::IdPart;

    fn span(start: i64, end: i64) -> EventSpan {
        EventSpan {
            start,
            end,
            resource: "M1".to_string(),
        }
    }

    #[test]
    fn span_duration_keeps_sign_and_saturates() {
        assert_eq!(span(100, 250).duration_ms(), 150);
        assert_eq!(span(250, 100).duration_ms(), -150);
        assert_eq!(span(i64::MIN, i64::MAX).duration_ms(), i64::MAX);
    }

    #[test]
    fn millisecond_fields_accept_floats() {
        let job: Job = serde_json::from_value(json!({
            "id": "J",
            "start": 1_738_152_000_000.0,
            "end": 1_738_152_000_999.9,
            "standardTime": 90.5,
        }))
        .unwrap();
        assert_eq!(job.start, 1_738_152_000_000);
        assert_eq!(job.end, Some(1_738_152_000_999));
        assert_eq!(job.entry.standard_time, Some(90));

        let span: EventSpan =
            serde_json::from_value(json!({"start": -1.5, "end": 2.0, "resource": "M1"})).unwrap();
        assert_eq!((span.start, span.end), (-1, 2));
    }

    #[test]
    fn millisecond_fields_reject_out_of_range_and_text() {
        assert!(serde_json::from_value::<EventSpan>(
            json!({"start": 1e20, "end": 0, "resource": "M1"})
        )
        .is_err());
        assert!(serde_json::from_value::<EventSpan>(
            json!({"start": u64::MAX, "end": 0, "resource": "M1"})
        )
        .is_err());
        assert!(serde_json::from_value::<EventSpan>(
            json!({"start": "soon", "end": 0, "resource": "M1"})
        )
        .is_err());
    }

    #[test]
    fn parameters_keep_unknown_keys() {
        let entry: InboxJob = serde_json::from_value(json!({
            "id": "J",
            "parameters": [
                {"command": "M3 S1200"},
                {"name": "speed", "value": "3"},
            ],
        }))
        .unwrap();

        let parameters = entry.parameters.as_ref().unwrap();
        assert_eq!(parameters[0].command.as_deref(), Some("M3 S1200"));
        assert!(parameters[0].extra.is_empty());
        assert_eq!(parameters[1].command, None);
        assert_eq!(parameters[1].extra["name"], "speed");
        assert_eq!(
            serde_json::to_value(&entry).unwrap()["parameters"],
            json!([{"command": "M3 S1200"}, {"name": "speed", "value": "3"}])
        );
    }

    #[test]
    fn span_overlap_is_half_open() {
        let s = span(100, 200);
        assert!(s.overlaps(None, None));
        assert!(s.overlaps(Some(150), Some(160)));
        assert!(!s.overlaps(Some(200), None));
        assert!(!s.overlaps(None, Some(100)));
        assert!(s.overlaps(Some(199), Some(101)));
    }

    #[test]
    fn job_serializes_with_kind_and_camel_case() {
        let job = ScheduledEntity::Job(Job {
            entry: InboxJob {
                id: Id::composite::<_, IdPart>(["J".into(), 7.into()]),
                resource: Some("Press".to_string()),
                blocked: None,
                color: Some("#ff0000".to_string()),
                notes: None,
                parameters: None,
                standard_time: Some(60_000),
                props: None,
            },
            start: 0,
            end: Some(60_000),
            committed: Some(true),
        });

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "job",
                "id": ["J", 7],
                "resource": "Press",
                "color": "#ff0000",
                "standardTime": 60_000,
                "start": 0,
                "end": 60_000,
                "committed": true,
            })
        );
    }

    #[test]
    fn generic_event_is_tagged_event() {
        let value = serde_json::to_value(ResourceEvent::Generic(span(1, 2))).unwrap();
        assert_eq!(
            value,
            json!({"kind": "event", "start": 1, "end": 2, "resource": "M1"})
        );
    }

    #[test]
    fn marker_uses_key_form_for_jobs() {
        let event = ResourceEvent::Job(ResourceJobEvent {
            span: span(0, 1),
            job: Id::composite::<_, IdPart>(["J".into(), 7.into(), 0.into()]),
        });
        assert_eq!(event.marker().as_deref(), Some("J@7"));
        assert_eq!(ResourceEvent::Generic(span(0, 1)).marker(), None);
    }

    #[test]
    fn backfill_keeps_existing_resources() {
        let mut group: InboxGroup = serde_json::from_value(json!({
            "group": "Lathes",
            "resources": ["L1", "L2"],
            "jobs": [
                {"id": "a"},
                {"id": "b", "resource": "L2"},
            ],
        }))
        .unwrap();
        group.backfill_resources();

        let jobs = group.jobs.as_ref().unwrap();
        assert_eq!(jobs[0].resource.as_deref(), Some("Lathes"));
        assert_eq!(jobs[1].resource.as_deref(), Some("L2"));
        assert_eq!(group.job_count(), 2);
    }

    #[test]
    fn backfill_without_jobs_is_noop() {
        let mut group: InboxGroup =
            serde_json::from_value(json!({"group": "Empty", "resources": []})).unwrap();
        group.backfill_resources();
        assert_eq!(group.job_count(), 0);
        assert!(group.jobs.is_none());
    }
}
