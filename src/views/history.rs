use chrono::NaiveDate;
use log::warn;
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::repository::{EntryRepository, MonthBoundary, SortOrder};
use crate::schema::DailyEntry;
use crate::utils::current_month_key;
use crate::views::{
    fetch_month, MonthLoad, MonthQuery, RequestSequence, RequestTicket, StatusMessage,
};

pub const HISTORY_LOAD_FAILED_TEXT: &str = "Failed to load history for this month.";

/// One line of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub buns_sold: u32,
    pub revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub owner_amount: f64,
    pub partner_amount: f64,
}

impl From<&DailyEntry> for HistoryRow {
    fn from(entry: &DailyEntry) -> Self {
        let entry = entry.recomputed();
        Self {
            date: entry.date,
            buns_sold: entry.inputs.buns_sold,
            revenue: entry.derived.revenue,
            total_expenses: entry.derived.total_expenses,
            net_profit: entry.derived.net_profit,
            owner_amount: entry.derived.owner_amount,
            partner_amount: entry.derived.partner_amount,
        }
    }
}

/// A month's entries, newest first.
#[derive(Debug)]
pub struct HistoryView {
    month: String,
    boundary: MonthBoundary,
    entries: Vec<DailyEntry>,
    message: Option<StatusMessage>,
    requests: RequestSequence,
    pending: Option<RequestTicket>,
}

impl HistoryView {
    pub fn new(config: &TrackerConfig, month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            boundary: config.month_boundary,
            entries: Vec::new(),
            message: None,
            requests: RequestSequence::new(),
            pending: None,
        }
    }

    /// Starts on the current calendar month.
    pub fn for_current_month(config: &TrackerConfig) -> Self {
        Self::new(config, current_month_key())
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn entries(&self) -> &[DailyEntry] {
        &self.entries
    }

    pub fn rows(&self) -> Vec<HistoryRow> {
        self.entries.iter().map(HistoryRow::from).collect()
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn select_month(&mut self, month: &str) -> Result<MonthQuery> {
        let query = MonthQuery::new(self.requests.issue(), month, self.boundary)?;
        self.month = query.month.clone();
        self.pending = Some(query.ticket);
        self.entries.clear();
        Ok(query)
    }

    pub async fn fetch<R: EntryRepository>(repo: &R, query: MonthQuery) -> MonthLoad {
        fetch_month(repo, query, SortOrder::Descending).await
    }

    /// Returns false when the load was stale and has been dropped.
    pub fn apply_load(&mut self, load: MonthLoad) -> bool {
        if !self.requests.is_current(load.ticket) {
            warn!("Discarding stale history load for {}", load.month);
            return false;
        }
        self.pending = None;

        match load.result {
            Ok(entries) => {
                self.entries = entries;
                self.message = None;
            }
            Err(e) => {
                warn!("Error fetching history for {}: {}", load.month, e);
                self.entries.clear();
                self.message = Some(StatusMessage::error(HISTORY_LOAD_FAILED_TEXT));
            }
        }
        true
    }

    pub async fn load<R: EntryRepository>(&mut self, repo: &R, month: &str) -> Result<bool> {
        let query = self.select_month(month)?;
        let load = Self::fetch(repo, query).await;
        Ok(self.apply_load(load))
    }

    pub async fn refresh<R: EntryRepository>(&mut self, repo: &R) -> Result<bool> {
        let month = self.month.clone();
        self.load(repo, &month).await
    }
}
