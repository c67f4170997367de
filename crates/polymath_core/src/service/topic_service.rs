//! Topic use-case service.
//!
//! # Responsibility
//! - Turn form drafts into validated topics (add/edit) and delete topics.
//! - Serve the read use-cases: due lists, library, dashboard, calendar marks.
//! - Save settings, import, export and load the demo library.
//!
//! # Invariants
//! - A draft is validated completely before any store write.
//! - Edits keep `id` and `created_at`; they refresh `updated_at`.
//! - Every saved interval set is offered to the interval history. The
//!   history write is best-effort: once the topic is committed, a history
//!   failure is logged and the use-case still succeeds.

use crate::library::domains::{domain_options, DomainOptions};
use crate::library::query::{run_library_query, LibraryQuery, LibraryView};
use crate::model::settings::{parse_interval_list, Settings};
use crate::model::topic::{Intervals, Topic, TopicId, ValidationError};
use crate::repo::kv_repo::KvRepository;
use crate::schedule::index::{DashboardStats, RevisionIndex};
use crate::schedule::scheduler::{adjacent_revisions, AdjacentRevisions};
use crate::service::sample_data::sample_topics;
use crate::store::topic_store::{ImportError, StoreError, StoreResult, TopicStore};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for topic write use-cases.
#[derive(Debug)]
pub enum TopicServiceError {
    /// Draft failed input validation; nothing was written.
    Validation(ValidationError),
    /// Target topic does not exist.
    TopicNotFound(TopicId),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for TopicServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TopicServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::TopicNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for TopicServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TopicServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::TopicNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Add/edit form state before it becomes a topic.
///
/// Text fields hold raw input; blank values mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicDraft {
    pub title: String,
    pub domain: String,
    pub sub_domain: String,
    pub notes: String,
    /// `None` means "today" at save time.
    pub start_date: Option<NaiveDate>,
    pub intervals: Intervals,
}

impl TopicDraft {
    /// Prefills a draft from an existing topic for editing.
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            title: topic.title.clone(),
            domain: topic.domain.clone().unwrap_or_default(),
            sub_domain: topic.sub_domain.clone().unwrap_or_default(),
            notes: topic.notes.clone().unwrap_or_default(),
            start_date: Some(topic.start_date),
            intervals: topic.intervals.clone(),
        }
    }

    /// Adds one interval chip; rejects non-positive and duplicate values.
    pub fn add_interval(&mut self, value: i64) -> Result<(), ValidationError> {
        self.intervals.insert(value)
    }

    pub fn remove_interval(&mut self, day: u32) -> bool {
        self.intervals.remove(day)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.intervals.is_empty() {
            return Err(ValidationError::NoIntervals);
        }
        Ok(())
    }

    /// Builds the topic a valid draft saves as.
    fn to_topic(&self, id: TopicId, created_at: NaiveDate, today: NaiveDate) -> Topic {
        let domain = optional_text(&self.domain);
        let sub_domain = domain.as_ref().and_then(|_| optional_text(&self.sub_domain));
        Topic {
            id,
            title: self.title.trim().to_string(),
            domain,
            sub_domain,
            notes: optional_text(&self.notes),
            start_date: self.start_date.unwrap_or(today),
            intervals: self.intervals.clone(),
            created_at,
            updated_at: today,
        }
    }
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Use-case facade over a topic store.
pub struct TopicService<R: KvRepository> {
    store: TopicStore<R>,
}

impl<R: KvRepository> TopicService<R> {
    pub fn new(store: TopicStore<R>) -> Self {
        Self { store }
    }

    /// Loads the store from `repo` and wraps it.
    pub fn open(repo: R, today: NaiveDate) -> StoreResult<Self> {
        Ok(Self::new(TopicStore::load(repo, today)?))
    }

    pub fn store(&self) -> &TopicStore<R> {
        &self.store
    }

    /// Mutable store access, e.g. to subscribe to changes.
    pub fn store_mut(&mut self) -> &mut TopicStore<R> {
        &mut self.store
    }

    pub fn topics(&self) -> &[Topic] {
        self.store.topics()
    }

    /// Empty draft prefilled with the saved default intervals and domain.
    pub fn new_draft(&self, today: NaiveDate) -> TopicDraft {
        let settings = self.store.settings();
        TopicDraft {
            domain: settings.default_domain().unwrap_or_default().to_string(),
            start_date: Some(today),
            intervals: settings.default_intervals.clone(),
            ..TopicDraft::default()
        }
    }

    /// Saves a new topic and returns its id.
    pub fn create_topic(
        &mut self,
        draft: &TopicDraft,
        today: NaiveDate,
    ) -> Result<TopicId, TopicServiceError> {
        draft.validate()?;
        let topic = draft.to_topic(TopicId::generate(), today, today);
        let id = topic.id.clone();
        self.store.insert_topic(topic)?;
        self.remember_intervals(&draft.intervals);
        info!("event=topic_create module=service status=ok topic_id={id}");
        Ok(id)
    }

    /// Replaces an existing topic's editable fields.
    pub fn update_topic(
        &mut self,
        id: &TopicId,
        draft: &TopicDraft,
        today: NaiveDate,
    ) -> Result<Topic, TopicServiceError> {
        draft.validate()?;
        let existing = self
            .store
            .get(id)
            .ok_or_else(|| TopicServiceError::TopicNotFound(id.clone()))?;
        let updated = draft.to_topic(existing.id.clone(), existing.created_at, today);
        self.store.replace_topic(updated.clone())?;
        self.remember_intervals(&draft.intervals);
        info!("event=topic_update module=service status=ok topic_id={id}");
        Ok(updated)
    }

    fn remember_intervals(&mut self, intervals: &Intervals) {
        if let Err(err) = self.store.record_intervals(intervals) {
            warn!("event=interval_history_write module=service status=error error={err}");
        }
    }

    pub fn delete_topic(&mut self, id: &TopicId) -> Result<Topic, TopicServiceError> {
        let removed = self.store.remove_topic(id)?;
        info!("event=topic_delete module=service status=ok topic_id={id}");
        Ok(removed)
    }

    /// Saves settings from form input.
    ///
    /// `intervals_input` is comma-separated; unusable input falls back to the
    /// built-in defaults.
    pub fn save_settings(
        &mut self,
        intervals_input: &str,
        default_domain: &str,
    ) -> Result<Settings, TopicServiceError> {
        let settings = Settings {
            default_intervals: parse_interval_list(intervals_input),
            default_domain: default_domain.trim().to_string(),
        };
        self.store.set_settings(settings.clone())?;
        Ok(settings)
    }

    /// Replaces all topics with an imported JSON array.
    pub fn import_json(&mut self, payload: &str, today: NaiveDate) -> Result<usize, ImportError> {
        self.store.import_json(payload, today)
    }

    pub fn export_json(&self) -> StoreResult<String> {
        self.store.export_json()
    }

    /// Replaces all topics with the demo library.
    pub fn load_sample_data(&mut self, today: NaiveDate) -> StoreResult<usize> {
        self.store.replace_all(sample_topics(today))?;
        Ok(self.store.topics().len())
    }

    /// Topics with a revision on `day`, in store order.
    pub fn due_on(&self, day: NaiveDate) -> Vec<&Topic> {
        RevisionIndex::build(self.store.topics()).query(day).to_vec()
    }

    /// Calendar-dot days for one month.
    pub fn marked_days(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        RevisionIndex::build(self.store.topics()).marked_days_in_month(year, month)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        RevisionIndex::build(self.store.topics()).dashboard(today)
    }

    pub fn library(&self, query: &LibraryQuery, today: NaiveDate) -> LibraryView<'_> {
        run_library_query(self.store.topics(), query, today)
    }

    pub fn domain_options(&self) -> DomainOptions {
        domain_options(self.store.topics())
    }

    /// Previous/next revision of one topic around `reference`.
    pub fn adjacent_for(&self, id: &TopicId, reference: NaiveDate) -> Option<AdjacentRevisions> {
        self.store
            .get(id)
            .map(|topic| adjacent_revisions(topic, reference))
    }
}
