//! Per-topic revision date derivation.

use crate::model::topic::Topic;
use chrono::{Days, NaiveDate};

/// One scheduled review occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision<'a> {
    pub date: NaiveDate,
    pub topic: &'a Topic,
}

/// Closest revision dates around a reference day, exclusive on both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjacentRevisions {
    pub previous: Option<NaiveDate>,
    pub next: Option<NaiveDate>,
}

/// Returns `start_date + offset` for every interval, ascending.
///
/// The output length equals `topic.intervals.len()` for any normalized topic.
pub fn compute_revision_dates(topic: &Topic) -> Vec<NaiveDate> {
    let mut dates = topic
        .intervals
        .iter()
        .filter_map(|offset| {
            topic
                .start_date
                .checked_add_days(Days::new(u64::from(offset)))
        })
        .collect::<Vec<_>>();
    dates.sort_unstable();
    dates
}

/// Pairs every revision date with its topic.
pub fn revisions(topic: &Topic) -> Vec<Revision<'_>> {
    compute_revision_dates(topic)
        .into_iter()
        .map(|date| Revision { date, topic })
        .collect()
}

/// Latest revision date, or `None` for a topic without intervals.
pub fn last_revision_date(topic: &Topic) -> Option<NaiveDate> {
    compute_revision_dates(topic).last().copied()
}

/// Finds the revisions strictly before and strictly after `reference`.
///
/// A revision falling exactly on `reference` is reported as neither.
pub fn adjacent_revisions(topic: &Topic, reference: NaiveDate) -> AdjacentRevisions {
    let dates = compute_revision_dates(topic);
    AdjacentRevisions {
        previous: dates.iter().rev().find(|date| **date < reference).copied(),
        next: dates.iter().find(|date| **date > reference).copied(),
    }
}
