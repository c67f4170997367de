//! Active/completed classification.
//!
//! Status is derived on every call and never stored. A topic without
//! intervals is always active.

use crate::model::topic::Topic;
use crate::schedule::scheduler::last_revision_date;
use chrono::NaiveDate;

/// Derived lifecycle state of a saved topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicStatus {
    /// Has a revision today or later, or has no intervals at all.
    Active,
    /// Every revision lies before today.
    Completed,
}

/// Whether the last revision of `topic` is strictly before `today`.
pub fn is_completed(topic: &Topic, today: NaiveDate) -> bool {
    last_revision_date(topic).is_some_and(|last| last < today)
}

pub fn status_of(topic: &Topic, today: NaiveDate) -> TopicStatus {
    if is_completed(topic, today) {
        TopicStatus::Completed
    } else {
        TopicStatus::Active
    }
}

/// Splits topics into `(active, completed)`, keeping input order in each.
pub fn partition_by_status<'a>(
    topics: impl IntoIterator<Item = &'a Topic>,
    today: NaiveDate,
) -> (Vec<&'a Topic>, Vec<&'a Topic>) {
    let (completed, active): (Vec<&Topic>, Vec<&Topic>) = topics
        .into_iter()
        .partition(|topic| is_completed(topic, today));
    (active, completed)
}

#[cfg(test)]
mod tests {
    use super::{is_completed, partition_by_status, status_of, TopicStatus};
    use crate::model::topic::{Intervals, Topic, TopicId};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn topic(intervals: &[i64]) -> Topic {
        let start = day(2024, 1, 1);
        Topic {
            id: TopicId::generate(),
            title: "Probability".to_string(),
            domain: None,
            sub_domain: None,
            notes: None,
            start_date: start,
            intervals: Intervals::lenient(intervals.iter().copied()),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn completed_only_after_last_revision_day() {
        let topic = topic(&[3, 10, 30]);
        assert!(!is_completed(&topic, day(2024, 1, 5)));
        assert!(!is_completed(&topic, day(2024, 1, 31)));
        assert!(is_completed(&topic, day(2024, 2, 1)));
        assert_eq!(status_of(&topic, day(2024, 2, 1)), TopicStatus::Completed);
    }

    #[test]
    fn unscheduled_topics_are_never_completed() {
        let topic = topic(&[]);
        assert!(!is_completed(&topic, day(1999, 1, 1)));
        assert!(!is_completed(&topic, day(2999, 1, 1)));
        assert_eq!(status_of(&topic, day(2999, 1, 1)), TopicStatus::Active);
    }

    #[test]
    fn partition_keeps_order_within_groups() {
        let done_a = topic(&[1]);
        let open = topic(&[100]);
        let done_b = topic(&[2]);
        let topics = [done_a.clone(), open.clone(), done_b.clone()];

        let (active, completed) = partition_by_status(&topics, day(2024, 2, 1));
        assert_eq!(active, vec![&open]);
        assert_eq!(completed, vec![&done_a, &done_b]);
    }
}
