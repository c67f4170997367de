use chrono::NaiveDate;
use polymath_core::{
    domain_options, normalize_topics, run_library_query, DomainSelection, LibraryQuery,
    SortKey, SortSpec, StatusFilter, Topic,
};
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn library() -> Vec<Topic> {
    let raw = json!([
        {"id": "1", "title": "Vectors", "domain": "Math", "subDomain": "Algebra",
         "startDate": "2024-05-30", "intervals": [3, 10]},
        {"id": "2", "title": "triangles", "domain": "Math", "subDomain": "Geometry",
         "startDate": "2024-01-01", "intervals": [3]},
        {"id": "3", "title": "Contracts", "domain": "Law",
         "startDate": "2024-05-01", "intervals": [7, 60], "notes": "offer and ACCEPTANCE"},
        {"id": "4", "title": "Inbox", "startDate": "2024-05-30"},
        {"id": "5", "title": "Matrices", "domain": "Math", "subDomain": "Algebra",
         "startDate": "2024-05-30", "intervals": [1]}
    ]);
    let items = raw.as_array().unwrap().clone();
    normalize_topics(&items, today())
}

fn ids(view_items: &[&Topic]) -> Vec<String> {
    view_items
        .iter()
        .map(|topic| topic.id.as_str().to_string())
        .collect()
}

#[test]
fn domain_and_sub_domain_select_the_exact_pair() {
    let topics = library();
    let query = LibraryQuery {
        domain: DomainSelection::from_parts("Math", "Algebra"),
        ..LibraryQuery::default()
    };
    let view = run_library_query(&topics, &query, today());
    assert_eq!(ids(&view.items), vec!["1", "5"]);
    assert_eq!(view.matched, 2);
    assert_eq!(view.total, 5);
}

#[test]
fn plain_domain_matches_every_sub_domain() {
    let topics = library();
    let query = LibraryQuery {
        domain: DomainSelection::from_parts("Math", ""),
        ..LibraryQuery::default()
    };
    let view = run_library_query(&topics, &query, today());
    assert_eq!(ids(&view.items), vec!["1", "2", "5"]);
}

#[test]
fn default_query_passes_everything_through_in_store_order() {
    let topics = library();
    let view = run_library_query(&topics, &LibraryQuery::default(), today());
    assert_eq!(ids(&view.items), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn status_filter_uses_the_pass_snapshot() {
    let topics = library();
    let completed = LibraryQuery {
        status: StatusFilter::Completed,
        ..LibraryQuery::default()
    };
    let active = LibraryQuery {
        status: StatusFilter::Active,
        ..LibraryQuery::default()
    };
    // Topic 2 revised on 2024-01-04; topic 5 on 2024-05-31.
    assert_eq!(
        ids(&run_library_query(&topics, &completed, today()).items),
        vec!["2", "5"]
    );
    assert_eq!(
        ids(&run_library_query(&topics, &active, today()).items),
        vec!["1", "3", "4"]
    );
}

#[test]
fn search_is_trimmed_case_insensitive_and_covers_notes() {
    let topics = library();
    let query = LibraryQuery {
        search: "  acceptance ".to_string(),
        ..LibraryQuery::default()
    };
    assert_eq!(ids(&run_library_query(&topics, &query, today()).items), vec!["3"]);

    let by_domain = LibraryQuery {
        search: "GEOMETRY".to_string(),
        ..LibraryQuery::default()
    };
    assert_eq!(ids(&run_library_query(&topics, &by_domain, today()).items), vec!["2"]);
}

#[test]
fn title_sort_ignores_case() {
    let topics = library();
    let query = LibraryQuery {
        sort: Some(SortSpec::ascending(SortKey::Title)),
        ..LibraryQuery::default()
    };
    assert_eq!(
        ids(&run_library_query(&topics, &query, today()).items),
        vec!["3", "4", "5", "2", "1"]
    );
}

#[test]
fn start_date_sort_is_stable_in_both_directions() {
    let topics = library();
    let ascending = LibraryQuery {
        sort: Some(SortSpec::ascending(SortKey::StartDate)),
        ..LibraryQuery::default()
    };
    let descending = LibraryQuery {
        sort: Some(SortSpec::descending(SortKey::StartDate)),
        ..LibraryQuery::default()
    };
    // Topics 1, 4 and 5 share 2024-05-30 and keep store order.
    assert_eq!(
        ids(&run_library_query(&topics, &ascending, today()).items),
        vec!["2", "3", "1", "4", "5"]
    );
    assert_eq!(
        ids(&run_library_query(&topics, &descending, today()).items),
        vec!["1", "4", "5", "3", "2"]
    );
}

#[test]
fn domain_sort_puts_unlabelled_topics_first() {
    let topics = library();
    let query = LibraryQuery {
        sort: Some(SortSpec::ascending(SortKey::Domain)),
        ..LibraryQuery::default()
    };
    assert_eq!(
        ids(&run_library_query(&topics, &query, today()).items),
        vec!["4", "3", "1", "5", "2"]
    );
}

#[test]
fn stages_combine_before_sorting() {
    let topics = library();
    let query = LibraryQuery {
        domain: DomainSelection::from_parts("Math", ""),
        status: StatusFilter::Active,
        search: "v".to_string(),
        sort: Some(SortSpec::descending(SortKey::Title)),
    };
    let view = run_library_query(&topics, &query, today());
    assert_eq!(ids(&view.items), vec!["1"]);
    assert!(!view.is_empty());
}

#[test]
fn domain_options_list_filters_in_first_seen_order() {
    let topics = library();
    let options = domain_options(&topics);
    assert_eq!(options.domains, vec!["Math", "Law"]);
    let pairs = options
        .pairs
        .iter()
        .map(|pair| (pair.domain.as_str(), pair.sub_domain.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(pairs, vec![("Math", "Algebra"), ("Math", "Geometry")]);

    let algebra = run_library_query(
        &topics,
        &LibraryQuery {
            domain: options.pairs[0].selection(),
            ..LibraryQuery::default()
        },
        today(),
    );
    assert_eq!(ids(&algebra.items), vec!["1", "5"]);
}

#[test]
fn slash_inside_a_label_is_not_a_separator() {
    let raw = json!([
        {"id": "io", "title": "Buffered reads", "domain": "I/O",
         "startDate": "2024-05-30", "intervals": [3]},
        {"id": "i-o", "title": "Letter O", "domain": "I", "subDomain": "O",
         "startDate": "2024-05-30", "intervals": [3]},
        {"id": "h", "title": "Hashing", "domain": "I", "subDomain": "Hash",
         "startDate": "2024-05-30", "intervals": [3]}
    ]);
    let topics = normalize_topics(raw.as_array().unwrap(), today());

    let whole_label = LibraryQuery {
        domain: DomainSelection::from_parts("I/O", ""),
        ..LibraryQuery::default()
    };
    assert_eq!(ids(&run_library_query(&topics, &whole_label, today()).items), vec!["io"]);

    let pair = LibraryQuery {
        domain: DomainSelection::from_parts("I", "O"),
        ..LibraryQuery::default()
    };
    assert_eq!(ids(&run_library_query(&topics, &pair, today()).items), vec!["i-o"]);

    // "I/O" and ("I", "O") render alike but sort as distinct pairs.
    let sorted = LibraryQuery {
        sort: Some(SortSpec::ascending(SortKey::Domain)),
        ..LibraryQuery::default()
    };
    assert_eq!(
        ids(&run_library_query(&topics, &sorted, today()).items),
        vec!["h", "i-o", "io"]
    );
}

#[test]
fn title_sort_places_accented_titles_by_base_letter() {
    let raw = json!([
        {"id": "z", "title": "Zeta", "startDate": "2024-05-30"},
        {"id": "e", "title": "Étude", "startDate": "2024-05-30"},
        {"id": "a", "title": "apple", "startDate": "2024-05-30"}
    ]);
    let topics = normalize_topics(raw.as_array().unwrap(), today());
    let query = LibraryQuery {
        sort: Some(SortSpec::ascending(SortKey::Title)),
        ..LibraryQuery::default()
    };
    assert_eq!(
        ids(&run_library_query(&topics, &query, today()).items),
        vec!["a", "e", "z"]
    );
}
