//! Library query pipeline.
//!
//! # Invariants
//! - Output length is at most the input length.
//! - With every filter empty the output is a stable reordering of the input.
//! - Sorting is stable: ties keep the order produced by the previous stage.

use crate::model::topic::Topic;
use crate::schedule::completion::is_completed;
use chrono::NaiveDate;
use log::debug;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Category filter over the structured `(domain, sub_domain)` pair.
///
/// Labels are compared verbatim, so a domain such as `I/O` is never split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DomainSelection {
    #[default]
    All,
    /// Matches the domain regardless of sub-domain.
    Domain(String),
    /// Matches the exact `(domain, sub_domain)` pair.
    DomainAndSub { domain: String, sub_domain: String },
}

impl DomainSelection {
    /// Builds a selection from the two picker values.
    ///
    /// A blank domain selects everything; a blank sub-domain selects the
    /// whole domain. A sub-domain without a domain is ignored.
    pub fn from_parts(domain: &str, sub_domain: &str) -> Self {
        let domain = domain.trim();
        let sub_domain = sub_domain.trim();
        match (domain.is_empty(), sub_domain.is_empty()) {
            (true, _) => Self::All,
            (false, true) => Self::Domain(domain.to_string()),
            (false, false) => Self::DomainAndSub {
                domain: domain.to_string(),
                sub_domain: sub_domain.to_string(),
            },
        }
    }

    pub fn matches(&self, topic: &Topic) -> bool {
        match self {
            Self::All => true,
            Self::Domain(domain) => topic.domain.as_deref() == Some(domain.as_str()),
            Self::DomainAndSub { domain, sub_domain } => {
                topic.domain.as_deref() == Some(domain.as_str())
                    && topic.sub_domain.as_deref() == Some(sub_domain.as_str())
            }
        }
    }
}

/// Completion filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    StartDate,
    /// Domain, then sub-domain; absent labels sort as "".
    Domain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

/// Full library query. `Default` passes every topic through unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryQuery {
    pub domain: DomainSelection,
    pub status: StatusFilter,
    /// Case-insensitive substring; trimmed before use.
    pub search: String,
    /// `None` keeps the order of the previous stage.
    pub sort: Option<SortSpec>,
}

/// Read-only result handed to the library renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryView<'a> {
    pub items: Vec<&'a Topic>,
    /// Equals `items.len()`.
    pub matched: usize,
    /// Size of the unfiltered input.
    pub total: usize,
}

impl LibraryView<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Runs domain → status → search → sort over `topics`.
///
/// `today` is the pass snapshot used by the status stage.
pub fn run_library_query<'a>(
    topics: &'a [Topic],
    query: &LibraryQuery,
    today: NaiveDate,
) -> LibraryView<'a> {
    let all = topics.iter().collect::<Vec<_>>();
    let by_domain = filter_by_domain(&all, &query.domain);
    let by_status = filter_by_status(&by_domain, query.status, today);
    let searched = search_topics(&by_status, &query.search);
    let items = match query.sort {
        Some(spec) => sort_topics(&searched, spec),
        None => searched,
    };

    debug!(
        "event=library_query module=library status=ok total={} matched={}",
        topics.len(),
        items.len()
    );

    LibraryView {
        matched: items.len(),
        total: topics.len(),
        items,
    }
}

pub fn filter_by_domain<'a>(topics: &[&'a Topic], selection: &DomainSelection) -> Vec<&'a Topic> {
    topics
        .iter()
        .copied()
        .filter(|topic| selection.matches(topic))
        .collect()
}

pub fn filter_by_status<'a>(
    topics: &[&'a Topic],
    status: StatusFilter,
    today: NaiveDate,
) -> Vec<&'a Topic> {
    topics
        .iter()
        .copied()
        .filter(|topic| match status {
            StatusFilter::All => true,
            StatusFilter::Active => !is_completed(topic, today),
            StatusFilter::Completed => is_completed(topic, today),
        })
        .collect()
}

pub fn search_topics<'a>(topics: &[&'a Topic], query: &str) -> Vec<&'a Topic> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return topics.to_vec();
    }
    topics
        .iter()
        .copied()
        .filter(|topic| search_text(topic).contains(&needle))
        .collect()
}

pub fn sort_topics<'a>(topics: &[&'a Topic], spec: SortSpec) -> Vec<&'a Topic> {
    let mut sorted = topics.to_vec();
    // `sort_by` is stable, and reversing the comparator keeps ties in place.
    sorted.sort_by(|left, right| {
        let ordering = match spec.key {
            SortKey::Title => compare_text(&left.title, &right.title),
            SortKey::StartDate => left.start_date.cmp(&right.start_date),
            SortKey::Domain => compare_text(
                left.domain.as_deref().unwrap_or(""),
                right.domain.as_deref().unwrap_or(""),
            )
            .then_with(|| {
                compare_text(
                    left.sub_domain.as_deref().unwrap_or(""),
                    right.sub_domain.as_deref().unwrap_or(""),
                )
            }),
        };
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

/// Lowercased, space-joined searchable fields; absent fields are skipped.
fn search_text(topic: &Topic) -> String {
    [
        Some(topic.title.as_str()),
        topic.domain.as_deref(),
        topic.sub_domain.as_deref(),
        topic.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Human ordering for labels.
///
/// Letters compare by base form first (accents and case ignored), then by
/// lowercased text with accents, then by exact text, so `Étude` lands
/// between `apple` and `Zeta` and equal labels stay deterministic.
pub(crate) fn compare_text(left: &str, right: &str) -> Ordering {
    base_letters(left)
        .cmp(base_letters(right))
        .then_with(|| {
            left.chars()
                .flat_map(char::to_lowercase)
                .cmp(right.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| left.cmp(right))
}

fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
}
