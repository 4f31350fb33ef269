//! Entry storage boundary.
//!
//! The hosted document store is an external collaborator; this module only
//! fixes the contract the rest of the crate relies on, plus an in-memory
//! implementation for tests, demos and offline use.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::{Datelike, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::schema::DailyEntry;
use crate::utils::{date_key, last_day_of_month, parse_month_key, DATE_KEY_FORMAT};

/// Inclusive bounds on `YYYY-MM-DD` keys, compared as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        key >= self.start.as_str() && key <= self.end.as_str()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.contains_key(&date_key(date))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// How the upper bound of a month query is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthBoundary {
    /// `YYYY-MM-01` to `YYYY-MM-31` regardless of month length. The upper
    /// bound may name a day that does not exist.
    #[default]
    Day31,
    /// `YYYY-MM-01` to the real last day of the month.
    CalendarEnd,
}

impl MonthBoundary {
    pub fn range_for_month(self, month: &str) -> Result<DateRange> {
        let first = parse_month_key(month)?;
        let prefix = first.format("%Y-%m").to_string();

        let end = match self {
            Self::Day31 => format!("{}-31", prefix),
            Self::CalendarEnd => last_day_of_month(first.year(), first.month())?
                .format(DATE_KEY_FORMAT)
                .to_string(),
        };

        Ok(DateRange::new(format!("{}-01", prefix), end))
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day31" | "day_31" => Ok(Self::Day31),
            "calendar" | "calendar_end" => Ok(Self::CalendarEnd),
            other => Err(TrackerError::InvalidConfig(format!(
                "Unknown month boundary '{}'. Expected 'day31' or 'calendar'",
                other
            ))),
        }
    }
}

/// Persistence contract for daily entries. At most one entry exists per date.
#[allow(async_fn_in_trait)]
pub trait EntryRepository: Send + Sync {
    /// Returns `TrackerError::NotFound` when nothing is stored for `date`.
    async fn get_entry(&self, date: NaiveDate) -> Result<DailyEntry>;

    /// Upserts by date, replacing any existing record in full. Returns the
    /// stored record with its write timestamp.
    async fn put_entry(&self, entry: &DailyEntry) -> Result<DailyEntry>;

    /// Entries whose date key lies within `range`, sorted by date.
    async fn query_entries_in_range(
        &self,
        range: &DateRange,
        order: SortOrder,
    ) -> Result<Vec<DailyEntry>>;
}

/// In-memory repository for testing and development
pub struct InMemoryEntryRepository {
    entries: RwLock<BTreeMap<NaiveDate, DailyEntry>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `put_entry` fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `get_entry` and `query_entries_in_range` fail
    /// until switched back.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Counts stored entries, reading through a poisoned lock.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn check_reads(&self, what: &str) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            warn!("Rejecting read for {}", what);
            return Err(TrackerError::PersistenceFailure(format!(
                "Read rejected for {}",
                what
            )));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryEntryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<E: std::fmt::Display>(err: E) -> TrackerError {
    TrackerError::PersistenceFailure(format!("Entry store lock poisoned: {}", err))
}

impl EntryRepository for InMemoryEntryRepository {
    async fn get_entry(&self, date: NaiveDate) -> Result<DailyEntry> {
        self.check_reads(&date_key(date))?;
        let entries = self.entries.read().map_err(lock_error)?;
        debug!("Fetching entry for {}", date);
        entries
            .get(&date)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(date_key(date)))
    }

    async fn put_entry(&self, entry: &DailyEntry) -> Result<DailyEntry> {
        if self.fail_writes.load(Ordering::SeqCst) {
            warn!("Rejecting write for {}", entry.date);
            return Err(TrackerError::PersistenceFailure(format!(
                "Write rejected for {}",
                entry.date
            )));
        }

        let mut stored = entry.clone();
        stored.created_at = Some(Utc::now());

        let mut entries = self.entries.write().map_err(lock_error)?;
        let replaced = entries.insert(stored.date, stored.clone()).is_some();
        info!(
            "Stored entry for {} ({})",
            stored.date,
            if replaced { "overwritten" } else { "new" }
        );

        Ok(stored)
    }

    async fn query_entries_in_range(
        &self,
        range: &DateRange,
        order: SortOrder,
    ) -> Result<Vec<DailyEntry>> {
        self.check_reads(&format!("{}..={}", range.start, range.end))?;
        let entries = self.entries.read().map_err(lock_error)?;
        let mut matching: Vec<DailyEntry> = entries
            .values()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect();

        if order == SortOrder::Descending {
            matching.reverse();
        }

        debug!(
            "Query {}..={} returned {} entries",
            range.start,
            range.end,
            matching.len()
        );

        Ok(matching)
    }
}
