use chrono::{Days, NaiveDate};
use polymath_core::{
    adjacent_revisions, compute_revision_dates, is_completed, normalize_topic, run_library_query,
    DomainSelection, LibraryQuery, RevisionIndex, SortDirection, SortKey, SortSpec, StatusFilter,
    Topic,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn raw_topic() -> impl Strategy<Value = Value> {
    (
        prop::option::of("[A-Za-z ]{0,12}"),
        prop::option::of(prop::sample::select(vec!["Math", "Law", " ", "CS"])),
        prop::option::of(prop::sample::select(vec!["Algebra", "Basics", ""])),
        0u64..400,
        prop::collection::vec(-5i64..120, 0..6),
    )
        .prop_map(|(title, domain, sub_domain, start_offset, intervals)| {
            let start = base_day() + Days::new(start_offset);
            json!({
                "title": title,
                "domain": domain,
                "subDomain": sub_domain,
                "startDate": start.format("%Y-%m-%d").to_string(),
                "intervals": intervals,
            })
        })
}

fn topic() -> impl Strategy<Value = Topic> {
    raw_topic().prop_map(|raw| normalize_topic(&raw, base_day()))
}

fn sort_spec() -> impl Strategy<Value = Option<SortSpec>> {
    prop::option::of(
        (
            prop::sample::select(vec![SortKey::Title, SortKey::StartDate, SortKey::Domain]),
            prop::bool::ANY,
        )
            .prop_map(|(key, descending)| SortSpec {
                key,
                direction: if descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            }),
    )
}

proptest! {
    #[test]
    fn revision_dates_are_sorted_with_one_per_interval(topic in topic()) {
        let dates = compute_revision_dates(&topic);
        prop_assert_eq!(dates.len(), topic.intervals.len());
        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn topics_without_intervals_never_complete(
        raw in raw_topic(),
        unusable in prop::collection::vec(-5i64..=0, 0..4),
        offset in 0u64..100_000,
    ) {
        let mut raw = raw;
        raw["intervals"] = json!(unusable);
        let topic = normalize_topic(&raw, base_day());
        prop_assert!(topic.intervals.is_empty());
        prop_assert!(!is_completed(&topic, base_day() + Days::new(offset)));
    }

    #[test]
    fn normalize_is_idempotent(raw in raw_topic()) {
        let once = normalize_topic(&raw, base_day());
        let again = normalize_topic(&serde_json::to_value(&once).unwrap(), base_day());
        prop_assert_eq!(again, once);
    }

    #[test]
    fn index_query_matches_revision_dates(
        topics in prop::collection::vec(topic(), 0..8),
        offset in 0u64..600,
    ) {
        let day = base_day() + Days::new(offset);
        let index = RevisionIndex::build(&topics);
        let found = index.query(day);
        for topic in &topics {
            let scheduled = compute_revision_dates(topic).contains(&day);
            let listed = found.iter().any(|candidate| std::ptr::eq(*candidate, topic));
            prop_assert_eq!(scheduled, listed);
        }
    }

    #[test]
    fn library_output_never_grows(
        topics in prop::collection::vec(topic(), 0..10),
        domain in prop::sample::select(vec![("", ""), ("Math", ""), ("Math", "Algebra"), ("I/O", " ")]),
        status in prop::sample::select(vec![StatusFilter::All, StatusFilter::Active, StatusFilter::Completed]),
        search in "[a-z]{0,2}",
        sort in sort_spec(),
    ) {
        let query = LibraryQuery {
            domain: DomainSelection::from_parts(domain.0, domain.1),
            status,
            search,
            sort,
        };
        let view = run_library_query(&topics, &query, base_day() + Days::new(60));
        prop_assert!(view.items.len() <= topics.len());
        prop_assert_eq!(view.matched, view.items.len());
    }

    #[test]
    fn unfiltered_library_is_a_reordering_of_the_input(
        topics in prop::collection::vec(topic(), 0..10),
        sort in sort_spec(),
    ) {
        let query = LibraryQuery { sort, ..LibraryQuery::default() };
        let view = run_library_query(&topics, &query, base_day());
        prop_assert_eq!(view.items.len(), topics.len());
        for topic in &topics {
            prop_assert!(view.items.iter().any(|item| std::ptr::eq(*item, topic)));
        }
    }

    #[test]
    fn adjacent_revisions_never_return_the_reference(topic in topic(), offset in 0u64..600) {
        let reference = base_day() + Days::new(offset);
        let adjacent = adjacent_revisions(&topic, reference);
        prop_assert_ne!(adjacent.previous, Some(reference));
        prop_assert_ne!(adjacent.next, Some(reference));
    }
}
