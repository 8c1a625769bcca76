//! Daily work-round counter.
//!
//! Completed work phases are counted per calendar day in an ordered log
//! stored under [`WORK_ROUND_COUNT_KEY`]. Each entry is a string of the form
//! `"YYYY-MM-DD,<count>"`, one per day, oldest first.
//!
//! The log is append/increment-only: a completion either increments the
//! trailing entry (when it is today's) or appends `(today, 1)`. Entries for
//! earlier days are never rewritten.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::prefs::{PreferenceError, PreferenceStore};

/// Preference key holding the round counter log.
pub const WORK_ROUND_COUNT_KEY: &str = "workRoundCount";

/// Date format of the first field of each log entry.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// DailyCount
// ============================================================================

/// One parsed log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    /// Calendar day
    pub date: NaiveDate,
    /// Work rounds completed that day
    pub count: u32,
}

impl DailyCount {
    /// Creates an entry.
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }

    /// Parses an `"YYYY-MM-DD,<count>"` entry.
    ///
    /// Only the first two comma-separated fields are read; anything after
    /// them is ignored. Returns `None` if either field is missing or
    /// malformed.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut fields = entry.split(',');
        let date = fields.next()?;
        let count = fields.next()?;
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
        let count = count.trim().parse().ok()?;
        Some(Self { date, count })
    }
}

impl fmt::Display for DailyCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.date.format(DATE_FORMAT), self.count)
    }
}

/// Returns the date key of a raw entry without validating the count field.
fn entry_date(entry: &str) -> &str {
    entry.split(',').next().unwrap_or_default().trim()
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// Log operations
// ============================================================================

/// Applies one completion on `today` to a raw log.
///
/// If the trailing entry belongs to `today` its count is incremented;
/// otherwise `(today, 1)` is appended. A trailing entry for `today` whose
/// count cannot be parsed counts as zero and is replaced by `(today, 1)`.
pub fn record_completion(log: &mut Vec<String>, today: NaiveDate) -> u32 {
    let key = date_key(today);

    if let Some(last) = log.last_mut() {
        if entry_date(last) == key {
            let count = DailyCount::parse(last).map_or(0, |entry| entry.count) + 1;
            *last = DailyCount::new(today, count).to_string();
            return count;
        }
    }

    log.push(DailyCount::new(today, 1).to_string());
    1
}

/// Returns today's count from a raw log.
///
/// Only the trailing entry is considered; if it is not today's, or its count
/// is malformed, the result is 0.
pub fn count_for(log: &[String], today: NaiveDate) -> u32 {
    let key = date_key(today);
    match log.last() {
        Some(last) if entry_date(last) == key => DailyCount::parse(last).map_or(0, |e| e.count),
        _ => 0,
    }
}

// ============================================================================
// RoundCounter
// ============================================================================

/// Reads and updates the round counter log in a preference store.
///
/// Every operation loads the whole list, and updates write the whole list
/// back.
#[derive(Clone)]
pub struct RoundCounter {
    store: Arc<dyn PreferenceStore>,
}

impl RoundCounter {
    /// Creates a counter over the given store.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Records one completed work round on `today`.
    ///
    /// Returns the new count for `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated log cannot be persisted.
    pub fn record(&self, today: NaiveDate) -> Result<u32, PreferenceError> {
        let mut log = self.store.get_string_list(WORK_ROUND_COUNT_KEY);
        let count = record_completion(&mut log, today);
        self.store.set_string_list(WORK_ROUND_COUNT_KEY, &log)?;
        debug!(date = %today, count, "Work round recorded");
        Ok(count)
    }

    /// Returns the number of rounds completed on `today`.
    pub fn count(&self, today: NaiveDate) -> u32 {
        count_for(&self.store.get_string_list(WORK_ROUND_COUNT_KEY), today)
    }

    /// Returns every well-formed entry, oldest first.
    ///
    /// Malformed entries are skipped with a warning.
    pub fn history(&self) -> Vec<DailyCount> {
        self.store
            .get_string_list(WORK_ROUND_COUNT_KEY)
            .iter()
            .filter_map(|entry| {
                let parsed = DailyCount::parse(entry);
                if parsed.is_none() {
                    warn!(entry = %entry, "Skipping malformed round counter entry");
                }
                parsed
            })
            .collect()
    }
}

impl fmt::Debug for RoundCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundCounter").finish_non_exhaustive()
    }
}

/// Returns today's date in local time.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Tests
// ============================================================================
