//! Topic domain model.
//!
//! # Responsibility
//! - Define the canonical record a user schedules revisions for.
//! - Own the interval-set invariants shared by drafts, settings and history.
//!
//! # Invariants
//! - `id` is stable and never reassigned; `created_at` never changes after creation.
//! - `intervals` is ascending, duplicate-free and only holds values in
//!   `1..=MAX_INTERVAL_DAYS`.
//! - `sub_domain` is `None` whenever `domain` is `None`.
//!
//! A `Topic` is only ever produced by the normalizer or the topic service,
//! which is why it serializes but does not implement `Deserialize`.

use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Largest accepted day offset (roughly one hundred years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Opaque topic identifier.
///
/// Fresh ids are UUID v4 strings; imported ids are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Generates a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id, returning `None` when it is blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TopicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input-boundary validation failures for topic and interval edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is blank after trimming.
    EmptyTitle,
    /// A saved topic needs at least one interval.
    NoIntervals,
    /// Interval values must be `>= 1`.
    NonPositiveInterval(i64),
    /// Interval values must be `<= MAX_INTERVAL_DAYS`.
    IntervalTooLarge(i64),
    /// The interval is already part of the set.
    DuplicateInterval(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::NoIntervals => write!(f, "at least one interval is required"),
            Self::NonPositiveInterval(value) => {
                write!(f, "interval must be a positive number of days, got {value}")
            }
            Self::IntervalTooLarge(value) => write!(
                f,
                "interval must be at most {MAX_INTERVAL_DAYS} days, got {value}"
            ),
            Self::DuplicateInterval(value) => write!(f, "interval {value} is already present"),
        }
    }
}

impl Error for ValidationError {}

/// Ascending, duplicate-free set of day offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Intervals(Vec<u32>);

impl Intervals {
    /// Builds a set from user input, rejecting the first invalid value.
    ///
    /// Order of `values` does not matter; the result is sorted.
    pub fn try_from_values(values: &[i64]) -> Result<Self, ValidationError> {
        let mut intervals = Self::default();
        for &value in values {
            intervals.insert(value)?;
        }
        Ok(intervals)
    }

    /// Builds a set by dropping every value that cannot be a day offset.
    ///
    /// Used for persisted or imported data, where repair beats rejection.
    pub fn lenient(values: impl IntoIterator<Item = i64>) -> Self {
        let mut days = values
            .into_iter()
            .filter_map(|value| checked_day_offset(value).ok())
            .collect::<Vec<_>>();
        days.sort_unstable();
        days.dedup();
        Self(days)
    }

    /// Adds one offset, keeping the set sorted.
    pub fn insert(&mut self, value: i64) -> Result<(), ValidationError> {
        let day = checked_day_offset(value)?;
        match self.0.binary_search(&day) {
            Ok(_) => Err(ValidationError::DuplicateInterval(day)),
            Err(position) => {
                self.0.insert(position, day);
                Ok(())
            }
        }
    }

    /// Removes one offset. Returns whether it was present.
    pub fn remove(&mut self, day: u32) -> bool {
        match self.0.binary_search(&day) {
            Ok(position) => {
                self.0.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest offset, if any.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }
}

fn checked_day_offset(value: i64) -> Result<u32, ValidationError> {
    if value < 1 {
        return Err(ValidationError::NonPositiveInterval(value));
    }
    match u32::try_from(value) {
        Ok(day) if day <= MAX_INTERVAL_DAYS => Ok(day),
        _ => Err(ValidationError::IntervalTooLarge(value)),
    }
}

/// Canonical topic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub domain: Option<String>,
    /// Only meaningful when `domain` is set.
    pub sub_domain: Option<String>,
    /// Opaque markup; never interpreted by the core.
    pub notes: Option<String>,
    pub start_date: NaiveDate,
    pub intervals: Intervals,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
}

impl Topic {
    /// Display label: `domain`, `domain/subDomain`, or `None`.
    ///
    /// Labels may themselves contain `/`, so this is never parsed back;
    /// filters work on the structured pair.
    pub fn domain_key(&self) -> Option<String> {
        let domain = self.domain.as_deref()?;
        Some(match self.sub_domain.as_deref() {
            Some(sub_domain) => format!("{domain}/{sub_domain}"),
            None => domain.to_string(),
        })
    }
}

/// Current local calendar day.
///
/// Callers take this once per evaluation pass and pass it down.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{Intervals, TopicId, ValidationError, MAX_INTERVAL_DAYS};

    #[test]
    fn try_from_values_sorts_and_rejects_bad_values() {
        let intervals = Intervals::try_from_values(&[30, 3, 10]).unwrap();
        assert_eq!(intervals.as_slice(), &[3, 10, 30]);

        assert_eq!(
            Intervals::try_from_values(&[3, 0]).unwrap_err(),
            ValidationError::NonPositiveInterval(0)
        );
        assert_eq!(
            Intervals::try_from_values(&[3, 3]).unwrap_err(),
            ValidationError::DuplicateInterval(3)
        );
        assert_eq!(
            Intervals::try_from_values(&[i64::from(MAX_INTERVAL_DAYS) + 1]).unwrap_err(),
            ValidationError::IntervalTooLarge(i64::from(MAX_INTERVAL_DAYS) + 1)
        );
    }

    #[test]
    fn lenient_drops_invalid_values_and_duplicates() {
        let intervals = Intervals::lenient([7, -1, 0, 7, 2, 99_999_999]);
        assert_eq!(intervals.as_slice(), &[2, 7]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut intervals = Intervals::lenient([1, 2]);
        assert!(intervals.remove(1));
        assert!(!intervals.remove(1));
        assert_eq!(intervals.as_slice(), &[2]);
    }

    #[test]
    fn topic_id_parse_rejects_blank() {
        assert!(TopicId::parse("  ").is_none());
        assert_eq!(TopicId::parse(" abc ").unwrap().as_str(), "abc");
        assert_ne!(TopicId::generate(), TopicId::generate());
    }
}
