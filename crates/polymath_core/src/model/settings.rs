//! User preferences and recent interval history.
//!
//! # Invariants
//! - `Settings::default_intervals` is never empty.
//! - `IntervalHistory` holds at most `INTERVAL_HISTORY_LIMIT` distinct sets,
//!   most recent last.

use crate::model::topic::Intervals;
use serde::Serialize;
use serde_json::Value;

/// Day offsets used when the user never saved any.
pub const DEFAULT_INTERVALS: [u32; 3] = [3, 10, 30];
/// Maximum number of interval sets kept in history.
pub const INTERVAL_HISTORY_LIMIT: usize = 3;

/// Persisted preferences used to prefill new topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub default_intervals: Intervals,
    pub default_domain: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_intervals: default_intervals(),
            default_domain: String::new(),
        }
    }
}

impl Settings {
    /// Merges a persisted record over the defaults field by field.
    ///
    /// Missing or malformed fields keep their default value.
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();

        if let Some(values) = value.get("defaultIntervals").and_then(integer_list) {
            let intervals = Intervals::lenient(values);
            if !intervals.is_empty() {
                settings.default_intervals = intervals;
            }
        }
        if let Some(domain) = value.get("defaultDomain").and_then(Value::as_str) {
            settings.default_domain = domain.trim().to_string();
        }

        settings
    }

    /// Default domain as an optional label (`None` when blank).
    pub fn default_domain(&self) -> Option<&str> {
        let domain = self.default_domain.trim();
        (!domain.is_empty()).then_some(domain)
    }
}

/// Parses comma-separated interval input from the settings form.
///
/// Invalid and non-positive entries are skipped; an input with no usable
/// entry yields the built-in defaults.
pub fn parse_interval_list(raw: &str) -> Intervals {
    let parsed = Intervals::lenient(
        raw.split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok()),
    );
    if parsed.is_empty() {
        default_intervals()
    } else {
        parsed
    }
}

fn default_intervals() -> Intervals {
    Intervals::lenient(DEFAULT_INTERVALS.map(i64::from))
}

/// Recently used interval sets, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntervalHistory(Vec<Intervals>);

impl IntervalHistory {
    /// Rebuilds history from a persisted array, skipping malformed entries.
    pub fn from_value(value: &Value) -> Self {
        let mut history = Self::default();
        if let Some(entries) = value.as_array() {
            for entry in entries {
                if let Some(values) = integer_list(entry) {
                    history.record(&Intervals::lenient(values));
                }
            }
        }
        history
    }

    /// Records a used set.
    ///
    /// An identical set already present moves to the end; the oldest entry is
    /// evicted past the limit. Empty sets are ignored.
    pub fn record(&mut self, intervals: &Intervals) {
        if intervals.is_empty() {
            return;
        }
        self.0.retain(|existing| existing != intervals);
        self.0.push(intervals.clone());
        if self.0.len() > INTERVAL_HISTORY_LIMIT {
            let overflow = self.0.len() - INTERVAL_HISTORY_LIMIT;
            self.0.drain(..overflow);
        }
    }

    pub fn entries(&self) -> &[Intervals] {
        &self.0
    }
}

/// Reads a JSON array of whole numbers. `None` if any element is not one.
pub(crate) fn integer_list(value: &Value) -> Option<Vec<i64>> {
    value.as_array()?.iter().map(whole_number).collect()
}

fn whole_number(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let float = value.as_f64()?;
    // Fractional or huge offsets map to 0, which interval repair drops.
    if float.fract() == 0.0 && float.abs() < 1e15 {
        Some(float as i64)
    } else {
        Some(0)
    }
}
