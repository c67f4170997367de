//! Core domain logic for Polymath Companion.
//! This crate is the single source of truth for revision scheduling invariants.

pub mod db;
pub mod library;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod store;

pub use library::domains::{domain_options, DomainOptions, DomainPair};
pub use library::query::{
    run_library_query, DomainSelection, LibraryQuery, LibraryView, SortDirection, SortKey,
    SortSpec, StatusFilter,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::settings::{parse_interval_list, IntervalHistory, Settings};
pub use model::topic::{local_today, Intervals, Topic, TopicId, ValidationError};
pub use normalize::{normalize_topic, normalize_topics};
pub use repo::kv_repo::{KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use schedule::completion::{is_completed, partition_by_status, status_of, TopicStatus};
pub use schedule::index::{DashboardStats, RevisionIndex};
pub use schedule::scheduler::{
    adjacent_revisions, compute_revision_dates, last_revision_date, revisions, AdjacentRevisions,
    Revision,
};
pub use service::sample_data::sample_topics;
pub use service::topic_service::{TopicDraft, TopicService, TopicServiceError};
pub use store::topic_store::{ImportError, StoreError, StoreEvent, SubscriptionId, TopicStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
