//! Demo library used by the "load sample data" action.
//!
//! Dates are relative to `today` so the demo always shows something due
//! yesterday, today and tomorrow, plus completed and upcoming topics.

use crate::model::topic::{Intervals, Topic, TopicId};
use chrono::{Days, NaiveDate};

struct SampleSpec {
    title: &'static str,
    domain: &'static str,
    sub_domain: Option<&'static str>,
    started_days_ago: u64,
    intervals: &'static [i64],
    notes: Option<&'static str>,
}

const FEATURED: &[SampleSpec] = &[
    SampleSpec {
        title: "A place to begin",
        domain: "Learning",
        sub_domain: None,
        started_days_ago: 3,
        intervals: &[3, 7, 22],
        notes: Some("<b>Welcome.</b> Topics come back on the days you choose. Everything stays on this device and can be exported at any time."),
    },
    SampleSpec {
        title: "Ask yourself: is this useful?",
        domain: "Reflection",
        sub_domain: None,
        started_days_ago: 7,
        intervals: &[7, 14],
        notes: Some("<i>Keep what earns its place in your routine.</i>"),
    },
    SampleSpec {
        title: "What completed means",
        domain: "System",
        sub_domain: None,
        started_days_ago: 120,
        intervals: &[3, 7, 14, 30, 60, 90],
        notes: Some("No revisions remain. Edit the start date or intervals to bring it back."),
    },
    SampleSpec {
        title: "Why spaced repetition works",
        domain: "Cognition",
        sub_domain: Some("Memory"),
        started_days_ago: 30,
        intervals: &[7, 29, 31],
        notes: Some("Reconstructing an idea at growing gaps beats rereading it often."),
    },
    SampleSpec {
        title: "Systems thinking overview",
        domain: "Thinking",
        sub_domain: Some("Mental models"),
        started_days_ago: 5,
        intervals: &[5, 15, 30],
        notes: None,
    },
];

const FILLER: &[(&str, &str, Option<&str>)] = &[
    ("Linear Algebra", "Math", Some("Vectors")),
    ("Indian Constitution", "Law", None),
    ("Financial Ratios", "Finance", Some("Analysis")),
    ("Operating Systems", "CS", Some("Processes")),
    ("Behavioral Biases", "Psychology", None),
    ("Design Patterns", "CS", Some("Architecture")),
    ("Supply & Demand", "Economics", None),
    ("Time Value of Money", "Finance", None),
    ("Probability Basics", "Math", None),
    ("Corporate Governance", "Law", None),
    ("Memory Palace", "Learning", Some("Techniques")),
    ("Decision Trees", "Thinking", None),
    ("Micro vs Macro", "Economics", None),
];

const FILLER_LONG_INTERVALS: &[i64] = &[8, 15, 30, 60];
const FILLER_SHORT_INTERVALS: &[i64] = &[3, 10, 30];

/// Builds the demo library relative to `today`.
pub fn sample_topics(today: NaiveDate) -> Vec<Topic> {
    let featured = FEATURED.iter().map(|spec| build(spec, today));
    let filler = FILLER
        .iter()
        .enumerate()
        .map(|(position, &(title, domain, sub_domain))| {
            let spec = SampleSpec {
                title,
                domain,
                sub_domain,
                started_days_ago: (position as u64 + 2) * 2,
                intervals: if position % 3 == 0 {
                    FILLER_LONG_INTERVALS
                } else {
                    FILLER_SHORT_INTERVALS
                },
                notes: None,
            };
            build(&spec, today)
        });
    featured.chain(filler).collect()
}

fn build(spec: &SampleSpec, today: NaiveDate) -> Topic {
    Topic {
        id: TopicId::generate(),
        title: spec.title.to_string(),
        domain: Some(spec.domain.to_string()),
        sub_domain: spec.sub_domain.map(str::to_string),
        notes: spec.notes.map(str::to_string),
        start_date: today
            .checked_sub_days(Days::new(spec.started_days_ago))
            .unwrap_or(today),
        intervals: Intervals::lenient(spec.intervals.iter().copied()),
        created_at: today,
        updated_at: today,
    }
}
