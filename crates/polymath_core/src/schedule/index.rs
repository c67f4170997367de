//! Library-wide revision index keyed by calendar day.
//!
//! # Responsibility
//! - Answer "which topics are due on day X" for calendar dots and today lists.
//! - Provide dashboard counts over the same data.
//!
//! # Invariants
//! - `query(day)` contains a topic iff `day` is one of its revision dates.
//! - Topics listed for one day keep the order of the source collection.
//! - The index borrows its topics and is rebuilt per pass; it is never cached
//!   across store writes.

use crate::model::topic::Topic;
use crate::schedule::scheduler::compute_revision_dates;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

/// Days ahead of today counted by `DashboardStats::upcoming_week`.
const UPCOMING_WINDOW_DAYS: u64 = 7;

/// Summary counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_topics: usize,
    /// Revisions falling on `today`.
    pub revisions_today: usize,
    /// Revisions falling on `today + 1 ..= today + 7`.
    pub upcoming_week: usize,
}

/// Calendar-day → topics map built from a topic snapshot.
#[derive(Debug, Clone, Default)]
pub struct RevisionIndex<'a> {
    by_day: BTreeMap<NaiveDate, Vec<&'a Topic>>,
    topic_count: usize,
}

impl<'a> RevisionIndex<'a> {
    /// Flattens every topic's revisions into the index.
    pub fn build(topics: impl IntoIterator<Item = &'a Topic>) -> Self {
        let mut index = Self::default();
        for topic in topics {
            index.topic_count += 1;
            for date in compute_revision_dates(topic) {
                index.by_day.entry(date).or_default().push(topic);
            }
        }
        index
    }

    /// Topics with a revision on `day`, in source order.
    pub fn query(&self, day: NaiveDate) -> &[&'a Topic] {
        self.by_day
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_revision(&self, day: NaiveDate) -> bool {
        !self.query(day).is_empty()
    }

    /// Number of revisions in the inclusive day range.
    pub fn count_between(&self, first: NaiveDate, last: NaiveDate) -> usize {
        if first > last {
            return 0;
        }
        self.by_day
            .range(first..=last)
            .map(|(_, topics)| topics.len())
            .sum()
    }

    /// Days of one month carrying at least one revision, ascending.
    ///
    /// Returns an empty list for an invalid `month`.
    pub fn marked_days_in_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };
        self.by_day
            .range(first..)
            .take_while(|(day, _)| day.year() == year && day.month() == month)
            .map(|(day, _)| *day)
            .collect()
    }

    /// Dashboard counters relative to `today`.
    pub fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        let upcoming_week = match (
            today.checked_add_days(Days::new(1)),
            today.checked_add_days(Days::new(UPCOMING_WINDOW_DAYS)),
        ) {
            (Some(first), Some(last)) => self.count_between(first, last),
            _ => 0,
        };

        DashboardStats {
            total_topics: self.topic_count,
            revisions_today: self.query(today).len(),
            upcoming_week,
        }
    }

    /// Every `(day, topics)` entry in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[&'a Topic])> + '_ {
        self.by_day
            .iter()
            .map(|(day, topics)| (*day, topics.as_slice()))
    }
}
