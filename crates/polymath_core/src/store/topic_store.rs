//! Topic store implementation.
//!
//! # Invariants
//! - Every held topic went through `normalize_topic` or the topic service.
//! - Topic ids are unique within the store.
//! - Subscribers run after the change is persisted, in subscription order.

use crate::model::settings::{IntervalHistory, Settings};
use crate::model::topic::{Intervals, Topic, TopicId};
use crate::normalize::normalize_topics;
use crate::repo::kv_repo::{KvRepository, RepoError};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TOPICS_KEY: &str = "topics";
pub const SETTINGS_KEY: &str = "settings";
pub const INTERVAL_HISTORY_KEY: &str = "intervalHistory";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for writes and backend access.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    Serialize(serde_json::Error),
    NotFound(TopicId),
    DuplicateId(TopicId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize store entry: {err}"),
            Self::NotFound(id) => write!(f, "topic not found: {id}"),
            Self::DuplicateId(id) => write!(f, "topic id already exists: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Import rejection. The store is untouched whenever this is returned.
#[derive(Debug)]
pub enum ImportError {
    /// Payload is not valid JSON.
    Parse(serde_json::Error),
    /// Payload parsed, but the top-level value is not an array.
    NotAnArray { found: &'static str },
    /// Payload was valid but persisting it failed.
    Store(StoreError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "import payload is not valid JSON: {err}"),
            Self::NotAnArray { found } => {
                write!(f, "import payload must be a JSON array, got {found}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NotAnArray { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Topic set changed; `count` is the new number of topics.
    TopicsChanged { count: usize },
    SettingsChanged,
    IntervalHistoryChanged,
}

/// Handle returned by [`TopicStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// In-memory view of the persisted entries, written through `R`.
pub struct TopicStore<R: KvRepository> {
    repo: R,
    topics: Vec<Topic>,
    settings: Settings,
    interval_history: IntervalHistory,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<R: KvRepository> TopicStore<R> {
    /// Loads every entry from `repo`, repairing what it finds.
    ///
    /// Topics are normalized with `today` and written back in canonical form;
    /// settings are merged over defaults and written back as well.
    pub fn load(repo: R, today: NaiveDate) -> StoreResult<Self> {
        let raw_topics = read_entry(&repo, TOPICS_KEY)?
            .and_then(|value| match value {
                Value::Array(items) => Some(items),
                other => {
                    warn!(
                        "event=storage_corrupt module=store status=recovered key={TOPICS_KEY} found={}",
                        json_kind(&other)
                    );
                    None
                }
            })
            .unwrap_or_default();
        let topics = dedupe_ids(normalize_topics(&raw_topics, today));

        let settings = read_entry(&repo, SETTINGS_KEY)?
            .map(|value| Settings::from_value(&value))
            .unwrap_or_default();
        let interval_history = read_entry(&repo, INTERVAL_HISTORY_KEY)?
            .map(|value| IntervalHistory::from_value(&value))
            .unwrap_or_default();

        write_entry(&repo, TOPICS_KEY, &topics)?;
        write_entry(&repo, SETTINGS_KEY, &settings)?;

        info!(
            "event=store_load module=store status=ok topics={} history={}",
            topics.len(),
            interval_history.entries().len()
        );

        Ok(Self {
            repo,
            topics,
            settings,
            interval_history,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// All topics in insertion order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| &topic.id == id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn interval_history(&self) -> &IntervalHistory {
        &self.interval_history
    }

    /// Appends a new topic.
    pub fn insert_topic(&mut self, topic: Topic) -> StoreResult<()> {
        if self.get(&topic.id).is_some() {
            return Err(StoreError::DuplicateId(topic.id));
        }
        let mut next = self.topics.clone();
        next.push(topic);
        self.commit_topics(next)
    }

    /// Replaces the topic with the same id, keeping its position.
    pub fn replace_topic(&mut self, topic: Topic) -> StoreResult<()> {
        let Some(position) = self.position(&topic.id) else {
            return Err(StoreError::NotFound(topic.id));
        };
        let mut next = self.topics.clone();
        next[position] = topic;
        self.commit_topics(next)
    }

    /// Removes a topic; its revisions disappear with it.
    pub fn remove_topic(&mut self, id: &TopicId) -> StoreResult<Topic> {
        let Some(position) = self.position(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        let mut next = self.topics.clone();
        let removed = next.remove(position);
        self.commit_topics(next)?;
        Ok(removed)
    }

    /// Replaces the whole topic set. Later duplicates of an id are dropped.
    pub fn replace_all(&mut self, topics: Vec<Topic>) -> StoreResult<()> {
        self.commit_topics(dedupe_ids(topics))
    }

    pub fn set_settings(&mut self, settings: Settings) -> StoreResult<()> {
        write_entry(&self.repo, SETTINGS_KEY, &settings)?;
        self.settings = settings;
        self.notify(StoreEvent::SettingsChanged);
        Ok(())
    }

    /// Records an interval set as most recently used.
    pub fn record_intervals(&mut self, intervals: &Intervals) -> StoreResult<()> {
        let mut next = self.interval_history.clone();
        next.record(intervals);
        if next == self.interval_history {
            return Ok(());
        }
        write_entry(&self.repo, INTERVAL_HISTORY_KEY, &next)?;
        self.interval_history = next;
        self.notify(StoreEvent::IntervalHistoryChanged);
        Ok(())
    }

    /// Replaces all topics with the normalized elements of a JSON array.
    ///
    /// Returns the number of imported topics. Anything but a JSON array is
    /// rejected as a whole.
    pub fn import_json(&mut self, payload: &str, today: NaiveDate) -> Result<usize, ImportError> {
        let value = serde_json::from_str::<Value>(payload).map_err(|err| {
            warn!("event=topics_import module=store status=error error_code=invalid_json");
            ImportError::Parse(err)
        })?;
        let items = match value {
            Value::Array(items) => items,
            other => {
                let found = json_kind(&other);
                warn!(
                    "event=topics_import module=store status=error error_code=not_an_array found={found}"
                );
                return Err(ImportError::NotAnArray { found });
            }
        };

        let imported = normalize_topics(&items, today);
        self.replace_all(imported)?;
        info!(
            "event=topics_import module=store status=ok count={}",
            self.topics.len()
        );
        Ok(self.topics.len())
    }

    /// Serializes all topics as a pretty-printed JSON array.
    pub fn export_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.topics)?)
    }

    /// Registers a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn position(&self, id: &TopicId) -> Option<usize> {
        self.topics.iter().position(|topic| &topic.id == id)
    }

    fn commit_topics(&mut self, next: Vec<Topic>) -> StoreResult<()> {
        write_entry(&self.repo, TOPICS_KEY, &next)?;
        self.topics = next;
        self.notify(StoreEvent::TopicsChanged {
            count: self.topics.len(),
        });
        Ok(())
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in &mut self.subscribers {
            listener(&event);
        }
    }
}

/// Reads and parses one entry. Unparseable JSON is treated as absent.
fn read_entry(repo: &impl KvRepository, key: &str) -> StoreResult<Option<Value>> {
    let Some(raw) = repo.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(
                "event=storage_corrupt module=store status=recovered key={key} error={err}"
            );
            Ok(None)
        }
    }
}

fn write_entry(repo: &impl KvRepository, key: &str, value: &impl Serialize) -> StoreResult<()> {
    let encoded = serde_json::to_string(value)?;
    repo.put(key, &encoded)?;
    Ok(())
}

fn dedupe_ids(topics: Vec<Topic>) -> Vec<Topic> {
    let mut seen = HashSet::new();
    let before = topics.len();
    let unique = topics
        .into_iter()
        .filter(|topic| seen.insert(topic.id.clone()))
        .collect::<Vec<_>>();
    if unique.len() != before {
        warn!(
            "event=duplicate_ids module=store status=recovered dropped={}",
            before - unique.len()
        );
    }
    unique
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoreEvent, TopicStore, SETTINGS_KEY, TOPICS_KEY};
    use crate::repo::kv_repo::{KvRepository, MemoryKvRepository};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn load_recovers_from_corrupted_entries() {
        let repo = MemoryKvRepository::new()
            .with_entry(TOPICS_KEY, "{not json")
            .with_entry(SETTINGS_KEY, "[oops");
        let store = TopicStore::load(&repo, today()).unwrap();

        assert!(store.topics().is_empty());
        assert_eq!(store.settings().default_intervals.as_slice(), &[3, 10, 30]);
        assert_eq!(repo.get(TOPICS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn load_treats_non_array_topics_as_empty() {
        let repo = MemoryKvRepository::new().with_entry(TOPICS_KEY, r#"{"a":1}"#);
        let store = TopicStore::load(&repo, today()).unwrap();
        assert!(store.topics().is_empty());
    }

    #[test]
    fn load_drops_duplicate_ids_keeping_the_first() {
        let repo = MemoryKvRepository::new().with_entry(
            TOPICS_KEY,
            r#"[{"id":"a","title":"one"},{"id":"a","title":"two"}]"#,
        );
        let store = TopicStore::load(&repo, today()).unwrap();
        assert_eq!(store.topics().len(), 1);
        assert_eq!(store.topics()[0].title, "one");
    }

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let repo = MemoryKvRepository::new();
        let mut store = TopicStore::load(&repo, today()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |event| sink.borrow_mut().push(*event));

        store.import_json(r#"[{"id":"a","title":"x"}]"#, today()).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.import_json("[]", today()).unwrap();

        assert_eq!(*seen.borrow(), vec![StoreEvent::TopicsChanged { count: 1 }]);
    }

    #[test]
    fn missing_topics_report_not_found() {
        let repo = MemoryKvRepository::new();
        let mut store = TopicStore::load(&repo, today()).unwrap();
        let id = crate::model::topic::TopicId::generate();
        assert!(matches!(
            store.remove_topic(&id),
            Err(StoreError::NotFound(missing)) if missing == id
        ));
    }
}
