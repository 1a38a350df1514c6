//! Date normalization for event payloads.
//!
//! The services send `start`/`end` either as ISO-8601 text or as epoch
//! milliseconds. Everything downstream works on epoch milliseconds, so text
//! that parses is rewritten to an integer and anything else is left alone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Fields rewritten by [`normalize_event_times`].
pub const TIME_FIELDS: [&str; 2] = ["start", "end"];

/// Offset-carrying forms not covered by RFC 3339: space separator, `+hhmm`,
/// hour-only `+hh` and minute precision.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
];

/// Offset-less forms; these are read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses ISO-8601 text into epoch milliseconds.
///
/// Accepts RFC 3339 (`Z` or numeric offset), offset-less date-times with a
/// `T` or space separator, and bare `YYYY-MM-DD` dates.
pub fn parse_timestamp_ms(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.timestamp_millis());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Some(expanded) = expand_hour_only(text) {
        return NaiveDateTime::parse_from_str(&expanded, "%Y-%m-%dT%H:%M")
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// `YYYY-MM-DDTHH` (or with a space) as `YYYY-MM-DDTHH:00`; chrono needs the
/// minutes.
fn expand_hour_only(text: &str) -> Option<String> {
    let (date, time) = text.split_at_checked(10)?;
    let hour = time.strip_prefix(['T', ' '])?;
    (hour.len() == 2 && hour.bytes().all(|b| b.is_ascii_digit()))
        .then(|| format!("{date}T{hour}:00"))
}

/// Converts date text to epoch milliseconds, returning anything else as is.
///
/// Never fails: unparsable text passes through for the caller to detect.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(text) => match parse_timestamp_ms(&text) {
            Some(ms) => Value::from(ms),
            None => {
                // Silent pass-through keeps compatibility with existing
                // consumers; a candidate for a MalformedDate error.
                tracing::trace!(value = %text, "leaving unparsable date text unchanged");
                Value::String(text)
            }
        },
        other => other,
    }
}

/// Normalizes the `start` and `end` fields of one event object in place.
pub fn normalize_event_times(event: &mut Map<String, Value>) {
    for field in TIME_FIELDS {
        if let Some(slot) = event.get_mut(field) {
            *slot = normalize(slot.take());
        }
    }
}

/// Normalizes every event object in a payload: an array of objects or a
/// single object. Other values are untouched.
pub fn normalize_events(payload: &mut Value) {
    match payload {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(event) = item {
                    normalize_event_times(event);
                }
            }
        }
        Value::Object(event) => normalize_event_times(event),
        _ => {}
    }
}

/// Names of the time fields still holding text after normalization.
pub fn unparsed_time_fields(event: &Map<String, Value>) -> Vec<&'static str> {
    TIME_FIELDS
        .into_iter()
        .filter(|field| event.get(*field).is_some_and(Value::is_string))
        .collect()
}

/// Formats epoch milliseconds as RFC 3339 UTC text, as used for the
/// services' `after`/`before` query parameters.
pub fn format_query_timestamp(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const JAN_29_NOON_MS: i64 = 1_738_152_000_000;

    #[test]
    fn parses_utc_suffix() {
        assert_eq!(
            parse_timestamp_ms("2025-01-29T12:00:00Z"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29T12:00:00.250Z"),
            Some(JAN_29_NOON_MS + 250)
        );
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(
            parse_timestamp_ms("2025-01-29T14:00:00+02:00"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29 14:00:00+02:00"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29T14:00:00+0200"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29T14:00:00+02"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29T10:00-02"),
            Some(JAN_29_NOON_MS)
        );
    }

    #[test]
    fn parses_naive_forms_as_utc() {
        assert_eq!(
            parse_timestamp_ms("2025-01-29T12:00:00"),
            Some(JAN_29_NOON_MS)
        );
        assert_eq!(
            parse_timestamp_ms("2025-01-29 12:00:00.5"),
            Some(JAN_29_NOON_MS + 500)
        );
        assert_eq!(parse_timestamp_ms("2025-01-29T12:00"), Some(JAN_29_NOON_MS));
        assert_eq!(parse_timestamp_ms("2025-01-29T12"), Some(JAN_29_NOON_MS));
        assert_eq!(parse_timestamp_ms("2025-01-29 12"), Some(JAN_29_NOON_MS));
        assert_eq!(parse_timestamp_ms("2025-01-29T1"), None);
        assert_eq!(
            parse_timestamp_ms("2025-01-29"),
            Some(JAN_29_NOON_MS - 12 * 3_600_000)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp_ms("yesterday"), None);
        assert_eq!(parse_timestamp_ms(""), None);
        assert_eq!(parse_timestamp_ms("2025-13-40T00:00:00Z"), None);
    }

    #[test]
    fn normalize_converts_text() {
        assert_eq!(
            normalize(json!("2025-01-29T12:00:00Z")),
            json!(JAN_29_NOON_MS)
        );
    }

    #[test]
    fn normalize_passes_through_malformed_and_non_text() {
        assert_eq!(normalize(json!("not a date")), json!("not a date"));
        assert_eq!(normalize(json!(null)), json!(null));
        assert_eq!(normalize(json!(true)), json!(true));
        assert_eq!(normalize(json!(42)), json!(42));
    }

    #[test]
    fn normalize_is_idempotent() {
        for value in [
            json!("2025-01-29T12:00:00Z"),
            json!("garbage"),
            json!(JAN_29_NOON_MS),
        ] {
            let once = normalize(value);
            let twice = normalize(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn normalize_event_times_touches_only_time_fields() {
        let mut payload = json!({
            "start": "2025-01-29T12:00:00Z",
            "end": JAN_29_NOON_MS + 60_000,
            "resource": "2025-01-29T12:00:00Z",
        });
        normalize_events(&mut payload);
        assert_eq!(
            payload,
            json!({
                "start": JAN_29_NOON_MS,
                "end": JAN_29_NOON_MS + 60_000,
                "resource": "2025-01-29T12:00:00Z",
            })
        );
    }

    #[test]
    fn normalize_events_handles_arrays_and_missing_fields() {
        let mut payload = json!([
            {"id": "inbox-1"},
            {"start": "2025-01-29T12:00:00Z"},
            "not-an-object",
        ]);
        normalize_events(&mut payload);
        assert_eq!(
            payload,
            json!([
                {"id": "inbox-1"},
                {"start": JAN_29_NOON_MS},
                "not-an-object",
            ])
        );
    }

    #[test]
    fn unparsed_fields_are_reported() {
        let mut payload = json!({"start": "soon", "end": "2025-01-29T12:00:00Z"});
        normalize_events(&mut payload);
        let Value::Object(event) = payload else {
            panic!("expected object");
        };
        assert_eq!(unparsed_time_fields(&event), vec!["start"]);
    }

    #[test]
    fn query_timestamp_round_trips() {
        let text = format_query_timestamp(JAN_29_NOON_MS + 7).unwrap();
        assert_eq!(text, "2025-01-29T12:00:00.007Z");
        assert_eq!(normalize(json!(text)), json!(JAN_29_NOON_MS + 7));
    }
}
