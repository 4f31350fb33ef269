//! Headless view-models for the three screens.
//!
//! Each view owns a transient copy of what it displays and is handed its
//! session explicitly. Fetches are split into issue / fetch / apply steps so
//! that a response arriving after a newer selection is discarded instead of
//! overwriting it.

pub mod dashboard;
pub mod history;
pub mod summary;

pub use dashboard::*;
pub use history::*;
pub use summary::*;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::repository::{DateRange, EntryRepository, MonthBoundary, SortOrder};
use crate::schema::DailyEntry;
use crate::utils::parse_month_key;

/// Identifies one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Issues monotonically increasing tickets; only the latest one is current.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// A one-line notice shown at the top of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }
}

/// A month fetch that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthQuery {
    pub ticket: RequestTicket,
    pub month: String,
    pub range: DateRange,
}

impl MonthQuery {
    pub(crate) fn new(ticket: RequestTicket, month: &str, boundary: MonthBoundary) -> Result<Self> {
        let first = parse_month_key(month)?;
        Ok(Self {
            ticket,
            month: first.format("%Y-%m").to_string(),
            range: boundary.range_for_month(month)?,
        })
    }
}

/// The outcome of a [`MonthQuery`], ready to be applied to its view.
#[derive(Debug)]
pub struct MonthLoad {
    pub ticket: RequestTicket,
    pub month: String,
    pub result: Result<Vec<DailyEntry>>,
}

pub async fn fetch_month<R: EntryRepository>(
    repo: &R,
    query: MonthQuery,
    order: SortOrder,
) -> MonthLoad {
    debug!("Fetching {} ({}..={})", query.month, query.range.start, query.range.end);
    let result = repo.query_entries_in_range(&query.range, order).await;
    MonthLoad {
        ticket: query.ticket,
        month: query.month,
        result,
    }
}
