use log::{info, warn};

use crate::aggregator::aggregate_month;
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::insight::{request_insight, InsightClient};
use crate::repository::{EntryRepository, MonthBoundary, SortOrder};
use crate::schema::{DailyEntry, MonthlySummary};
use crate::utils::current_month_key;
use crate::views::{
    fetch_month, MonthLoad, MonthQuery, RequestSequence, RequestTicket, StatusMessage,
};

pub const SUMMARY_LOAD_FAILED_TEXT: &str = "Failed to load summary for this month.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightState {
    Idle,
    Loading,
    Ready(String),
    Failed(String),
}

/// Month totals, payouts and the optional AI tips.
#[derive(Debug)]
pub struct SummaryView {
    month: String,
    boundary: MonthBoundary,
    entries: Vec<DailyEntry>,
    message: Option<StatusMessage>,
    insight: InsightState,
    requests: RequestSequence,
    pending: Option<RequestTicket>,
}

impl SummaryView {
    pub fn new(config: &TrackerConfig, month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            boundary: config.month_boundary,
            entries: Vec::new(),
            message: None,
            insight: InsightState::Idle,
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

    pub fn summary(&self) -> MonthlySummary {
        aggregate_month(&self.month, &self.entries)
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn insight(&self) -> &InsightState {
        &self.insight
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Switching months also drops any insight shown for the previous one.
    pub fn select_month(&mut self, month: &str) -> Result<MonthQuery> {
        let query = MonthQuery::new(self.requests.issue(), month, self.boundary)?;
        self.month = query.month.clone();
        self.pending = Some(query.ticket);
        self.entries.clear();
        self.insight = InsightState::Idle;
        Ok(query)
    }

    pub async fn fetch<R: EntryRepository>(repo: &R, query: MonthQuery) -> MonthLoad {
        fetch_month(repo, query, SortOrder::Ascending).await
    }

    /// Returns false when the load was stale and has been dropped.
    pub fn apply_load(&mut self, load: MonthLoad) -> bool {
        if !self.requests.is_current(load.ticket) {
            warn!("Discarding stale summary load for {}", load.month);
            return false;
        }
        self.pending = None;

        match load.result {
            Ok(entries) => {
                self.entries = entries;
                self.message = None;
                info!(
                    "Summary for {} covers {} days",
                    self.month,
                    self.entries.len()
                );
            }
            Err(e) => {
                warn!("Error fetching summary for {}: {}", load.month, e);
                self.entries.clear();
                self.message = Some(StatusMessage::error(SUMMARY_LOAD_FAILED_TEXT));
            }
        }
        true
    }

    pub async fn load<R: EntryRepository>(&mut self, repo: &R, month: &str) -> Result<bool> {
        let query = self.select_month(month)?;
        let load = Self::fetch(repo, query).await;
        Ok(self.apply_load(load))
    }

    /// Asks `client` for tips on the current totals.
    ///
    /// Does nothing while the month is loading, for a month without entries
    /// or when tips are already shown. A failure is kept as inline text and
    /// affects nothing else.
    pub async fn generate_insight<C: InsightClient>(&mut self, client: &C) -> &InsightState {
        if self.is_loading()
            || self.entries.is_empty()
            || matches!(self.insight, InsightState::Ready(_))
        {
            return &self.insight;
        }

        self.insight = InsightState::Loading;
        let summary = self.summary();
        self.insight = match request_insight(client, &summary).await {
            Ok(text) => InsightState::Ready(text),
            Err(e) => InsightState::Failed(e.user_message()),
        };
        &self.insight
    }

    /// Clears shown tips so new ones can be requested.
    pub fn clear_insight(&mut self) {
        self.insight = InsightState::Idle;
    }

    pub fn footer(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        Some(format!(
            "Summary based on {} recorded business days in {}.",
            self.entries.len(),
            self.month
        ))
    }
}
