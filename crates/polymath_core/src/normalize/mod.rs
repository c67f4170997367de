//! Boundary repair of raw topic records.
//!
//! # Responsibility
//! - Turn loosely-shaped JSON (legacy storage, imports) into valid `Topic`s.
//! - Be the only path by which un-normalized data enters the core.
//!
//! # Invariants
//! - Never fails: every input yields a topic satisfying the model invariants.
//! - Idempotent: re-normalizing a serialized `Topic` returns the same value.

use crate::model::settings::integer_list;
use crate::model::topic::{Intervals, Topic, TopicId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Title given to records that arrive without one.
pub const UNTITLED_TOPIC: &str = "Untitled topic";

static ISO_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").expect("valid iso day regex"));

/// Normalizes one raw record.
///
/// `today` fills missing dates and must be the caller's snapshot for the
/// current pass.
pub fn normalize_topic(raw: &Value, today: NaiveDate) -> Topic {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .and_then(TopicId::parse)
        .unwrap_or_else(TopicId::generate);

    let title = text_field(raw, "title")
        .map(str::trim)
        .unwrap_or(UNTITLED_TOPIC)
        .to_string();

    let domain = label_field(raw, "domain");
    let sub_domain = domain.as_ref().and_then(|_| label_field(raw, "subDomain"));

    let notes = text_field(raw, "notes").map(str::to_string);

    let intervals = raw
        .get("intervals")
        .and_then(integer_list)
        .map(Intervals::lenient)
        .unwrap_or_default();

    Topic {
        id,
        title,
        domain,
        sub_domain,
        notes,
        start_date: date_field(raw, "startDate").unwrap_or(today),
        intervals,
        created_at: date_field(raw, "createdAt").unwrap_or(today),
        updated_at: date_field(raw, "updatedAt").unwrap_or(today),
    }
}

/// Normalizes a batch, preserving input order.
pub fn normalize_topics(raw: &[Value], today: NaiveDate) -> Vec<Topic> {
    raw.iter().map(|value| normalize_topic(value, today)).collect()
}

/// Parses a calendar day, truncating any time-of-day suffix.
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    let captures = ISO_DAY_RE.captures(raw)?;
    NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
}

/// Non-blank string field, untrimmed.
fn text_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn label_field(raw: &Value, key: &str) -> Option<String> {
    text_field(raw, key).map(|value| value.trim().to_string())
}

fn date_field(raw: &Value, key: &str) -> Option<NaiveDate> {
    raw.get(key).and_then(Value::as_str).and_then(parse_calendar_day)
}

#[cfg(test)]
mod tests {
    use super::{normalize_topic, parse_calendar_day, UNTITLED_TOPIC};
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let today = day(2024, 3, 1);
        let topic = normalize_topic(&json!({ "id": "t-1", "title": "Graphs" }), today);

        assert_eq!(topic.id.as_str(), "t-1");
        assert_eq!(topic.domain, None);
        assert_eq!(topic.sub_domain, None);
        assert_eq!(topic.notes, None);
        assert!(topic.intervals.is_empty());
        assert_eq!(topic.start_date, today);
        assert_eq!(topic.created_at, today);
        assert_eq!(topic.updated_at, today);
    }

    #[test]
    fn repairs_intervals_and_orphan_sub_domain() {
        let topic = normalize_topic(
            &json!({
                "id": "t-2",
                "title": "Sets",
                "domain": "  ",
                "subDomain": "Algebra",
                "intervals": [30, 3, 3, -2, 10.5, 10]
            }),
            day(2024, 3, 1),
        );
        assert_eq!(topic.domain, None);
        assert_eq!(topic.sub_domain, None);
        assert_eq!(topic.intervals.as_slice(), &[3, 10, 30]);
    }

    #[test]
    fn non_numeric_interval_lists_become_empty() {
        let today = day(2024, 3, 1);
        for intervals in [json!("3,10"), json!([3, "10"]), json!(null), json!({ "a": 1 })] {
            let topic = normalize_topic(&json!({ "title": "x", "intervals": intervals }), today);
            assert!(topic.intervals.is_empty());
        }
    }

    #[test]
    fn missing_identity_fields_are_generated() {
        let topic = normalize_topic(&json!(42), day(2024, 3, 1));
        assert!(!topic.id.as_str().is_empty());
        assert_eq!(topic.title, UNTITLED_TOPIC);
    }

    #[test]
    fn parse_calendar_day_truncates_time_of_day() {
        assert_eq!(parse_calendar_day("2024-01-31"), Some(day(2024, 1, 31)));
        assert_eq!(
            parse_calendar_day("2024-01-31T23:59:59.000Z"),
            Some(day(2024, 1, 31))
        );
        assert_eq!(parse_calendar_day("2024-02-30"), None);
        assert_eq!(parse_calendar_day("31/01/2024"), None);
    }

    #[test]
    fn normalizing_serialized_output_is_a_no_op() {
        let once = normalize_topic(
            &json!({
                "id": "t-3",
                "title": "  Ratios ",
                "domain": "Finance",
                "subDomain": " Analysis ",
                "notes": "<b>keep</b>  ",
                "startDate": "2024-01-01T08:00:00Z",
                "intervals": [10, 3]
            }),
            day(2024, 3, 1),
        );
        let twice = normalize_topic(&serde_json::to_value(&once).unwrap(), day(2030, 1, 1));
        assert_eq!(once, twice);
        assert_eq!(once.title, "Ratios");
        assert_eq!(once.sub_domain.as_deref(), Some("Analysis"));
        assert_eq!(once.notes.as_deref(), Some("<b>keep</b>  "));
    }
}
