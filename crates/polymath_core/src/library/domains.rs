//! Filter and suggestion options derived from the library.

use crate::library::query::DomainSelection;
use crate::model::topic::Topic;
use std::collections::HashSet;

/// A `(domain, sub_domain)` combination present in the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainPair {
    pub domain: String,
    pub sub_domain: String,
}

impl DomainPair {
    /// Selection matching exactly this pair.
    pub fn selection(&self) -> DomainSelection {
        DomainSelection::DomainAndSub {
            domain: self.domain.clone(),
            sub_domain: self.sub_domain.clone(),
        }
    }
}

/// Distinct category labels, each list in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainOptions {
    /// Plain domain labels (filter dropdown and input suggestions).
    pub domains: Vec<String>,
    /// Pairs for topics that carry a sub-domain.
    pub pairs: Vec<DomainPair>,
}

impl DomainOptions {
    /// Sub-domains seen under `domain`, in first-seen order.
    pub fn sub_domains_of<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |pair| pair.domain == domain)
            .map(|pair| pair.sub_domain.as_str())
    }
}

pub fn domain_options<'a>(topics: impl IntoIterator<Item = &'a Topic>) -> DomainOptions {
    let mut options = DomainOptions::default();
    let mut seen_domains = HashSet::new();
    let mut seen_pairs = HashSet::new();

    for topic in topics {
        let Some(domain) = topic.domain.as_deref() else {
            continue;
        };
        if seen_domains.insert(domain) {
            options.domains.push(domain.to_string());
        }
        if let Some(sub_domain) = topic.sub_domain.as_deref() {
            if seen_pairs.insert((domain, sub_domain)) {
                options.pairs.push(DomainPair {
                    domain: domain.to_string(),
                    sub_domain: sub_domain.to_string(),
                });
            }
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::{domain_options, DomainPair};
    use crate::model::topic::{Intervals, Topic, TopicId};
    use chrono::NaiveDate;

    fn topic(domain: Option<&str>, sub_domain: Option<&str>) -> Topic {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Topic {
            id: TopicId::generate(),
            title: "t".to_string(),
            domain: domain.map(str::to_string),
            sub_domain: sub_domain.map(str::to_string),
            notes: None,
            start_date: day,
            intervals: Intervals::default(),
            created_at: day,
            updated_at: day,
        }
    }

    #[test]
    fn options_are_distinct_and_first_seen() {
        let topics = vec![
            topic(Some("Math"), Some("Algebra")),
            topic(None, None),
            topic(Some("Law"), None),
            topic(Some("Math"), Some("Geometry")),
            topic(Some("Math"), Some("Algebra")),
        ];
        let options = domain_options(&topics);
        assert_eq!(options.domains, vec!["Math", "Law"]);
        assert_eq!(
            options.pairs,
            vec![pair("Math", "Algebra"), pair("Math", "Geometry")]
        );
        assert_eq!(
            options.sub_domains_of("Math").collect::<Vec<_>>(),
            vec!["Algebra", "Geometry"]
        );
    }

    #[test]
    fn slash_in_labels_does_not_merge_pairs() {
        let topics = vec![topic(Some("I/O"), None), topic(Some("I"), Some("O"))];
        let options = domain_options(&topics);
        assert_eq!(options.domains, vec!["I/O", "I"]);
        assert_eq!(options.pairs, vec![pair("I", "O")]);
        assert_eq!(options.sub_domains_of("I/O").count(), 0);
    }

    fn pair(domain: &str, sub_domain: &str) -> DomainPair {
        DomainPair {
            domain: domain.to_string(),
            sub_domain: sub_domain.to_string(),
        }
    }
}
