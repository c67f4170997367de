//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate strings from the UI into core types and core errors into
//!   response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calendar days cross the boundary as `YYYY-MM-DD` strings.
//! - Each call opens the entry DB, loads the store, and drops both on return.

use chrono::NaiveDate;
use log::warn;
use polymath_core::db::open_db;
use polymath_core::normalize::parse_calendar_day;
use polymath_core::{
    compute_revision_dates, core_version as core_version_inner, init_logging as init_logging_inner,
    local_today, ping as ping_inner, status_of, DomainSelection, Intervals, LibraryQuery,
    SortDirection, SortKey, SortSpec, SqliteKvRepository, StatusFilter, Topic, TopicDraft,
    TopicId, TopicService, TopicStatus,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "polymath_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Topic row rendered by the due list and the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTopicItem {
    pub topic_id: String,
    pub title: String,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    /// Opaque markup, passed through untouched.
    pub notes: Option<String>,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    pub intervals: Vec<u32>,
    /// `active|completed`, evaluated against the call's snapshot day.
    pub status: String,
    /// First revision on or after the snapshot day, `YYYY-MM-DD`.
    pub next_revision: Option<String>,
}

/// List response envelope for due and library views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTopicListResponse {
    pub ok: bool,
    pub items: Vec<EntryTopicItem>,
    /// Number of topics before filtering.
    pub total: u32,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EntryTopicListResponse {
    fn failure(message: String) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            total: 0,
            message,
        }
    }
}

/// Generic action response envelope for write flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected topic ID, when the action targets one topic.
    pub topic_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, topic_id: Option<String>) -> Self {
        Self {
            ok: true,
            topic_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            topic_id: None,
            message: message.into(),
        }
    }
}

/// Dashboard counters for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDashboardResponse {
    pub ok: bool,
    pub total_topics: u32,
    pub revisions_today: u32,
    /// Revisions from tomorrow through seven days ahead.
    pub upcoming_week: u32,
    pub message: String,
}

/// Calendar marks for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCalendarResponse {
    pub ok: bool,
    /// Days with at least one revision, ascending, `YYYY-MM-DD`.
    pub marked_days: Vec<String>,
    pub message: String,
}

/// Export payload envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryExportResponse {
    pub ok: bool,
    /// Pretty-printed JSON array; empty on failure.
    pub payload: String,
    pub message: String,
}

/// Saved defaults used to prefill the add form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySettingsResponse {
    pub ok: bool,
    pub default_intervals: Vec<u32>,
    pub default_domain: Option<String>,
    pub message: String,
}

/// Prefilled form fields for the add or edit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraftResponse {
    pub ok: bool,
    /// Empty fields on failure.
    pub draft: EntryTopicInput,
    pub message: String,
}

impl EntryDraftResponse {
    fn failure(message: String) -> Self {
        Self {
            ok: false,
            draft: EntryTopicInput::default(),
            message,
        }
    }
}

/// One `(domain, sub_domain)` combination present in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDomainPair {
    pub domain: String,
    pub sub_domain: String,
}

/// Filter dropdown and input suggestion values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDomainOptionsResponse {
    pub ok: bool,
    /// Distinct domains, first-seen order.
    pub domains: Vec<String>,
    /// Distinct pairs, first-seen order.
    pub pairs: Vec<EntryDomainPair>,
    pub message: String,
}

/// Previous and next revision of one topic around a reference day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAdjacentResponse {
    pub ok: bool,
    /// Latest revision strictly before the reference day, `YYYY-MM-DD`.
    pub previous: Option<String>,
    /// Earliest revision strictly after the reference day, `YYYY-MM-DD`.
    pub next: Option<String>,
    pub message: String,
}

/// Recently used interval sets, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIntervalHistoryResponse {
    pub ok: bool,
    pub entries: Vec<Vec<u32>>,
    pub message: String,
}

/// Topic form fields as entered in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTopicInput {
    pub title: String,
    pub domain: String,
    pub sub_domain: String,
    pub notes: String,
    /// `YYYY-MM-DD`; `None` or blank means today.
    pub start_date: Option<String>,
    pub intervals: Vec<i64>,
}

/// Lists topics with a revision on `day` (`YYYY-MM-DD`, blank for today).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_topics_due(day: String) -> EntryTopicListResponse {
    let result = with_topic_service(|service, today| {
        let day = parse_day_or(&day, today)?;
        let items = service
            .due_on(day)
            .into_iter()
            .map(|topic| to_entry_topic_item(topic, today))
            .collect::<Vec<_>>();
        Ok((items, service.topics().len()))
    });
    match result {
        Ok((items, total)) => EntryTopicListResponse {
            ok: true,
            message: format!("{} revision(s) due.", items.len()),
            total: saturating_u32(total),
            items,
        },
        Err(err) => EntryTopicListResponse::failure(format!("entry_topics_due failed: {err}")),
    }
}

/// Runs the library query.
///
/// Input semantics:
/// - `domain`: blank selects every topic.
/// - `sub_domain`: blank selects the whole domain. Labels are matched
///   verbatim, so `/` inside a label has no special meaning.
/// - `status`: `all|active|completed` (blank means `all`).
/// - `sort_key`: `title|start_date|domain`; `None` keeps store order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_library(
    domain: String,
    sub_domain: String,
    status: String,
    search: String,
    sort_key: Option<String>,
    descending: bool,
) -> EntryTopicListResponse {
    let result = with_topic_service(|service, today| {
        let query = LibraryQuery {
            domain: DomainSelection::from_parts(&domain, &sub_domain),
            status: parse_status_filter(&status)?,
            search,
            sort: sort_key
                .as_deref()
                .map(|key| parse_sort_spec(key, descending))
                .transpose()?,
        };
        let view = service.library(&query, today);
        let items = view
            .items
            .iter()
            .map(|topic| to_entry_topic_item(topic, today))
            .collect::<Vec<_>>();
        Ok((items, view.total))
    });
    match result {
        Ok((items, total)) => EntryTopicListResponse {
            ok: true,
            message: if items.is_empty() {
                "No topics.".to_string()
            } else {
                format!("Showing {} of {} topic(s).", items.len(), total)
            },
            total: saturating_u32(total),
            items,
        },
        Err(err) => EntryTopicListResponse::failure(format!("entry_library failed: {err}")),
    }
}

/// Creates a topic from the add form.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created topic ID on success; validation failures write nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_create_topic(input: EntryTopicInput) -> EntryActionResponse {
    let result = with_topic_service(|service, today| {
        let draft = to_draft(&input)?;
        service
            .create_topic(&draft, today)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => EntryActionResponse::success("Topic created.", Some(id.to_string())),
        Err(err) => action_failure("entry_create_topic", err),
    }
}

/// Replaces the editable fields of an existing topic.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_update_topic(topic_id: String, input: EntryTopicInput) -> EntryActionResponse {
    let result = with_topic_service(|service, today| {
        let id = parse_topic_id(&topic_id)?;
        let draft = to_draft(&input)?;
        service
            .update_topic(&id, &draft, today)
            .map(|topic| topic.id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => EntryActionResponse::success("Topic updated.", Some(id.to_string())),
        Err(err) => action_failure("entry_update_topic", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete_topic(topic_id: String) -> EntryActionResponse {
    let result = with_topic_service(|service, _| {
        let id = parse_topic_id(&topic_id)?;
        service
            .delete_topic(&id)
            .map(|topic| topic.id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => EntryActionResponse::success("Topic deleted.", Some(id.to_string())),
        Err(err) => action_failure("entry_delete_topic", err),
    }
}

/// Saves default intervals (comma-separated) and default domain.
///
/// Unusable interval input falls back to the built-in defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_save_settings(intervals: String, default_domain: String) -> EntryActionResponse {
    let result = with_topic_service(|service, _| {
        service
            .save_settings(&intervals, &default_domain)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(settings) => {
            let days = settings
                .default_intervals
                .iter()
                .map(|day| day.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            EntryActionResponse::success(format!("Settings saved. Intervals: {days}."), None)
        }
        Err(err) => action_failure("entry_save_settings", err),
    }
}

/// Replaces every topic with the elements of a JSON array.
///
/// # FFI contract
/// - Anything but a JSON array is rejected and the library is left as is.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_import_json(payload: String) -> EntryActionResponse {
    let result = with_topic_service(|service, today| {
        service
            .import_json(&payload, today)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(count) => EntryActionResponse::success(format!("Imported {count} topic(s)."), None),
        Err(err) => action_failure("entry_import_json", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn entry_export_json() -> EntryExportResponse {
    let result = with_topic_service(|service, _| {
        let payload = service.export_json().map_err(|err| err.to_string())?;
        Ok((payload, service.topics().len()))
    });
    match result {
        Ok((payload, count)) => EntryExportResponse {
            ok: true,
            payload,
            message: format!("Exported {count} topic(s)."),
        },
        Err(err) => EntryExportResponse {
            ok: false,
            payload: String::new(),
            message: format!("entry_export_json failed: {err}"),
        },
    }
}

/// Replaces the library with the demo topics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_load_sample_data() -> EntryActionResponse {
    let result = with_topic_service(|service, today| {
        service
            .load_sample_data(today)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(count) => EntryActionResponse::success(format!("Loaded {count} sample topic(s)."), None),
        Err(err) => action_failure("entry_load_sample_data", err),
    }
}

/// Dashboard counters for `day` (`YYYY-MM-DD`, blank for today).
#[flutter_rust_bridge::frb(sync)]
pub fn entry_dashboard(day: String) -> EntryDashboardResponse {
    let result = with_topic_service(|service, today| {
        let day = parse_day_or(&day, today)?;
        Ok(service.dashboard(day))
    });
    match result {
        Ok(stats) => EntryDashboardResponse {
            ok: true,
            total_topics: saturating_u32(stats.total_topics),
            revisions_today: saturating_u32(stats.revisions_today),
            upcoming_week: saturating_u32(stats.upcoming_week),
            message: String::new(),
        },
        Err(err) => EntryDashboardResponse {
            ok: false,
            total_topics: 0,
            revisions_today: 0,
            upcoming_week: 0,
            message: format!("entry_dashboard failed: {err}"),
        },
    }
}

/// Calendar days of `year-month` that carry a revision.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_marked_days(year: i32, month: u32) -> EntryCalendarResponse {
    let result = with_topic_service(|service, _| Ok(service.marked_days(year, month)));
    match result {
        Ok(days) => EntryCalendarResponse {
            ok: true,
            marked_days: days.iter().map(NaiveDate::to_string).collect(),
            message: String::new(),
        },
        Err(err) => EntryCalendarResponse {
            ok: false,
            marked_days: Vec::new(),
            message: format!("entry_marked_days failed: {err}"),
        },
    }
}

/// Saved default intervals and default domain.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_settings() -> EntrySettingsResponse {
    let result = with_topic_service(|service, _| Ok(service.store().settings().clone()));
    match result {
        Ok(settings) => EntrySettingsResponse {
            ok: true,
            default_intervals: settings.default_intervals.as_slice().to_vec(),
            default_domain: settings.default_domain().map(str::to_string),
            message: String::new(),
        },
        Err(err) => EntrySettingsResponse {
            ok: false,
            default_intervals: Vec::new(),
            default_domain: None,
            message: format!("entry_settings failed: {err}"),
        },
    }
}

/// Add-form fields prefilled from settings, starting today.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_new_draft() -> EntryDraftResponse {
    let result = with_topic_service(|service, today| Ok(service.new_draft(today)));
    match result {
        Ok(draft) => EntryDraftResponse {
            ok: true,
            draft: to_entry_input(&draft),
            message: String::new(),
        },
        Err(err) => EntryDraftResponse::failure(format!("entry_new_draft failed: {err}")),
    }
}

/// Edit-form fields for an existing topic.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_edit_draft(topic_id: String) -> EntryDraftResponse {
    let result = with_topic_service(|service, _| {
        let id = parse_topic_id(&topic_id)?;
        service
            .store()
            .get(&id)
            .map(TopicDraft::from_topic)
            .ok_or_else(|| format!("topic not found: {id}"))
    });
    match result {
        Ok(draft) => EntryDraftResponse {
            ok: true,
            draft: to_entry_input(&draft),
            message: String::new(),
        },
        Err(err) => EntryDraftResponse::failure(format!("entry_edit_draft failed: {err}")),
    }
}

/// Domains and `(domain, sub_domain)` pairs for the filter and suggestions.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_domain_options() -> EntryDomainOptionsResponse {
    let result = with_topic_service(|service, _| Ok(service.domain_options()));
    match result {
        Ok(options) => EntryDomainOptionsResponse {
            ok: true,
            pairs: options
                .pairs
                .into_iter()
                .map(|pair| EntryDomainPair {
                    domain: pair.domain,
                    sub_domain: pair.sub_domain,
                })
                .collect(),
            domains: options.domains,
            message: String::new(),
        },
        Err(err) => EntryDomainOptionsResponse {
            ok: false,
            domains: Vec::new(),
            pairs: Vec::new(),
            message: format!("entry_domain_options failed: {err}"),
        },
    }
}

/// Revisions of `topic_id` on either side of `day` (`YYYY-MM-DD`, blank for today).
///
/// # FFI contract
/// - Unknown topic IDs are reported with `ok = false`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_adjacent_revisions(topic_id: String, day: String) -> EntryAdjacentResponse {
    let result = with_topic_service(|service, today| {
        let id = parse_topic_id(&topic_id)?;
        let day = parse_day_or(&day, today)?;
        service
            .adjacent_for(&id, day)
            .ok_or_else(|| format!("topic not found: {id}"))
    });
    match result {
        Ok(adjacent) => EntryAdjacentResponse {
            ok: true,
            previous: adjacent.previous.map(|date| date.to_string()),
            next: adjacent.next.map(|date| date.to_string()),
            message: String::new(),
        },
        Err(err) => EntryAdjacentResponse {
            ok: false,
            previous: None,
            next: None,
            message: format!("entry_adjacent_revisions failed: {err}"),
        },
    }
}

/// Interval sets recently saved with a topic, offered as quick picks.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_interval_history() -> EntryIntervalHistoryResponse {
    let result = with_topic_service(|service, _| {
        Ok(service
            .store()
            .interval_history()
            .entries()
            .iter()
            .map(|set| set.as_slice().to_vec())
            .collect::<Vec<_>>())
    });
    match result {
        Ok(entries) => EntryIntervalHistoryResponse {
            ok: true,
            entries,
            message: String::new(),
        },
        Err(err) => EntryIntervalHistoryResponse {
            ok: false,
            entries: Vec::new(),
            message: format!("entry_interval_history failed: {err}"),
        },
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("POLYMATH_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

/// Runs `f` against a freshly loaded service, with today's date taken once.
fn with_topic_service<T>(
    f: impl FnOnce(&mut TopicService<SqliteKvRepository<'_>>, NaiveDate) -> Result<T, String>,
) -> Result<T, String> {
    let today = local_today();
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let repo = SqliteKvRepository::try_new(&conn)
        .map_err(|err| format!("entry repo init failed: {err}"))?;
    let mut service =
        TopicService::open(repo, today).map_err(|err| format!("entry store load failed: {err}"))?;
    f(&mut service, today)
}

fn action_failure(operation: &str, err: String) -> EntryActionResponse {
    warn!("event=entry_action module=ffi status=error operation={operation}");
    EntryActionResponse::failure(format!("{operation} failed: {err}"))
}

fn to_draft(input: &EntryTopicInput) -> Result<TopicDraft, String> {
    let start_date = match input.start_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_day(raw)?),
    };
    let intervals = Intervals::try_from_values(&input.intervals).map_err(|err| err.to_string())?;
    Ok(TopicDraft {
        title: input.title.clone(),
        domain: input.domain.clone(),
        sub_domain: input.sub_domain.clone(),
        notes: input.notes.clone(),
        start_date,
        intervals,
    })
}

fn to_entry_input(draft: &TopicDraft) -> EntryTopicInput {
    EntryTopicInput {
        title: draft.title.clone(),
        domain: draft.domain.clone(),
        sub_domain: draft.sub_domain.clone(),
        notes: draft.notes.clone(),
        start_date: draft.start_date.map(|date| date.to_string()),
        intervals: draft.intervals.iter().map(i64::from).collect(),
    }
}

fn to_entry_topic_item(topic: &Topic, today: NaiveDate) -> EntryTopicItem {
    let status = match status_of(topic, today) {
        TopicStatus::Active => "active",
        TopicStatus::Completed => "completed",
    };
    EntryTopicItem {
        topic_id: topic.id.to_string(),
        title: topic.title.clone(),
        domain: topic.domain.clone(),
        sub_domain: topic.sub_domain.clone(),
        notes: topic.notes.clone(),
        start_date: topic.start_date.to_string(),
        intervals: topic.intervals.as_slice().to_vec(),
        status: status.to_string(),
        next_revision: compute_revision_dates(topic)
            .into_iter()
            .find(|date| *date >= today)
            .map(|date| date.to_string()),
    }
}

fn parse_topic_id(raw: &str) -> Result<TopicId, String> {
    TopicId::parse(raw).ok_or_else(|| "topic_id must not be blank".to_string())
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_day(raw).ok_or_else(|| format!("invalid date `{raw}`; expected YYYY-MM-DD"))
}

fn parse_day_or(raw: &str, fallback: NaiveDate) -> Result<NaiveDate, String> {
    if raw.trim().is_empty() {
        Ok(fallback)
    } else {
        parse_day(raw)
    }
}

fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "all" => Ok(StatusFilter::All),
        "active" => Ok(StatusFilter::Active),
        "completed" => Ok(StatusFilter::Completed),
        other => Err(format!("unsupported status filter `{other}`")),
    }
}

fn parse_sort_spec(raw: &str, descending: bool) -> Result<SortSpec, String> {
    let key = match raw.trim().to_ascii_lowercase().as_str() {
        "title" => SortKey::Title,
        "start_date" => SortKey::StartDate,
        "domain" => SortKey::Domain,
        other => return Err(format!("unsupported sort key `{other}`")),
    };
    let direction = if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Ok(SortSpec { key, direction })
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
