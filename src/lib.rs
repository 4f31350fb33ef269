//! # Buntee Tracker
//!
//! Business tracking for a small food stall: one sales/expense entry per
//! day, profit computed from it, and that profit split between an owner and
//! a partner by percentage.
//!
//! ## Core Concepts
//!
//! - **Entry**: one date's raw sales and cost figures plus the derived revenue,
//!   expenses, net profit and split amounts
//! - **Split**: each stakeholder gets `net_profit * share / 100`; shares are not
//!   normalised, so they only account for the whole profit when they sum to 100
//! - **Month aggregation**: totals over every entry dated in a calendar month
//! - **Role gate**: only an owner may create or modify entries
//!
//! Storage, authentication and text generation are external services,
//! reached through the [`EntryRepository`], [`SessionProvider`] and
//! [`InsightClient`] traits. In-memory implementations of the first two are
//! included; the `gemini` feature adds an HTTP insight client.
//!
//! ## Example
//!
//! ```rust,ignore
//! use buntee_tracker::*;
//! use chrono::NaiveDate;
//!
//! let repo = InMemoryEntryRepository::new();
//! let inputs = EntryInputs {
//!     buns_sold: 100,
//!     other_sales: 200.0,
//!     ingredients_cost: 1000.0,
//!     ..EntryInputs::default()
//! };
//! let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! repo.put_entry(&DailyEntry::from_inputs(date, inputs)).await?;
//!
//! let june = summarize_month(&repo, "2024-06", MonthBoundary::Day31).await?;
//! assert_eq!(june.total_revenue, 3200.0);
//! ```

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod insight;
pub mod repository;
pub mod schema;
pub mod session;
pub mod utils;
pub mod views;

#[cfg(feature = "gemini")]
pub mod llm;

pub use aggregator::aggregate_month;
pub use config::*;
pub use engine::*;
pub use error::{Result, TrackerError};
pub use insight::*;
pub use repository::*;
pub use schema::*;
pub use session::*;
pub use utils::*;
pub use views::*;

use log::info;

/// Fetches every entry of `month` and folds it into totals.
pub async fn summarize_month<R: EntryRepository>(
    repo: &R,
    month: &str,
    boundary: MonthBoundary,
) -> Result<MonthlySummary> {
    let range = boundary.range_for_month(month)?;
    let entries = repo
        .query_entries_in_range(&range, SortOrder::Ascending)
        .await?;

    let summary = aggregate_month(&month_key(parse_month_key(month)?), &entries);
    info!(
        "Summarized {}: {} days, net profit {}",
        summary.month, summary.entry_count, summary.total_profit
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_summarize_month() {
        let repo = InMemoryEntryRepository::new();
        for (day, buns) in [(1, 10), (15, 20)] {
            let inputs = EntryInputs {
                buns_sold: buns,
                ..EntryInputs::default()
            };
            let date = NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
            repo.put_entry(&DailyEntry::from_inputs(date, inputs))
                .await
                .unwrap();
        }

        let feb = summarize_month(&repo, "2024-02", MonthBoundary::CalendarEnd)
            .await
            .unwrap();
        assert_eq!(feb.month, "2024-02");
        assert_eq!(feb.total_buns, 30);
        assert_eq!(feb.total_revenue, 900.0);
        assert_eq!(feb.entry_count, 2);

        let march = summarize_month(&repo, "2024-03", MonthBoundary::Day31)
            .await
            .unwrap();
        assert!(march.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_rejects_bad_month() {
        let repo = InMemoryEntryRepository::new();
        let err = summarize_month(&repo, "2024-13", MonthBoundary::Day31)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::DateError(_)));
    }
}
