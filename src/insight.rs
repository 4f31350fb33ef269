use log::{info, warn};

use crate::error::{Result, TrackerError};
use crate::schema::MonthlySummary;

pub const CURRENCY_SYMBOL: &str = "₹";
pub const EMPTY_INSIGHT_TEXT: &str = "Unable to generate insights at this time.";

/// A text-generation backend. One request, one response: no retry,
/// streaming or caching.
#[allow(async_fn_in_trait)]
pub trait InsightClient: Send + Sync {
    async fn generate_insight(&self, prompt: &str) -> Result<String>;
}

pub fn build_insight_prompt(summary: &MonthlySummary) -> String {
    format!(
        "Analyze this month's business data for a bun stall:\n\
         - Total Buns Sold: {buns}\n\
         - Total Revenue: {c}{revenue}\n\
         - Total Expenses: {c}{expenses}\n\
         - Net Profit: {c}{profit}\n\
         - Active Days: {days}\n\
         \n\
         Provide 3 concise, actionable business tips to increase profit margin or \
         operational efficiency. Use a professional yet supportive tone.",
        c = CURRENCY_SYMBOL,
        buns = summary.total_buns,
        revenue = summary.total_revenue,
        expenses = summary.total_expenses,
        profit = summary.total_profit,
        days = summary.entry_count,
    )
}

/// Asks `client` for tips on `summary`.
///
/// Blank output is replaced by a fixed fallback text. Errors are returned as
/// `InsightFailure` for the caller to show inline.
pub async fn request_insight<C: InsightClient>(
    client: &C,
    summary: &MonthlySummary,
) -> Result<String> {
    let prompt = build_insight_prompt(summary);
    match client.generate_insight(&prompt).await {
        Ok(text) if text.trim().is_empty() => Ok(EMPTY_INSIGHT_TEXT.to_string()),
        Ok(text) => {
            info!("Generated insight for {}", summary.month);
            Ok(text)
        }
        Err(TrackerError::InsightFailure(details)) => {
            warn!("Insight request failed: {}", details);
            Err(TrackerError::InsightFailure(details))
        }
        Err(other) => {
            warn!("Insight request failed: {}", other);
            Err(TrackerError::InsightFailure(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<String>);

    impl InsightClient for Canned {
        async fn generate_insight(&self, _prompt: &str) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(TrackerError::InsightFailure(e.to_string())),
            }
        }
    }

    fn june() -> MonthlySummary {
        MonthlySummary {
            month: "2024-06".to_string(),
            total_buns: 120,
            total_revenue: 3800.0,
            total_expenses: 1350.5,
            total_profit: 2449.5,
            total_owner_payout: 1224.75,
            total_partner_payout: 1224.75,
            entry_count: 2,
        }
    }

    #[test]
    fn test_prompt_interpolates_totals() {
        let prompt = build_insight_prompt(&june());
        assert!(prompt.contains("Total Buns Sold: 120"));
        assert!(prompt.contains("Total Revenue: ₹3800\n"));
        assert!(prompt.contains("Total Expenses: ₹1350.5"));
        assert!(prompt.contains("Net Profit: ₹2449.5"));
        assert!(prompt.contains("Active Days: 2"));
        assert!(prompt.contains("3 concise, actionable business tips"));
    }

    #[tokio::test]
    async fn test_blank_output_uses_fallback() {
        let text = request_insight(&Canned(Ok("  ".to_string())), &june())
            .await
            .unwrap();
        assert_eq!(text, EMPTY_INSIGHT_TEXT);
    }

    #[tokio::test]
    async fn test_failure_is_insight_failure() {
        let client = Canned(Err(TrackerError::InsightFailure("quota".to_string())));
        let err = request_insight(&client, &june()).await.unwrap_err();
        assert!(matches!(err, TrackerError::InsightFailure(_)));
        assert_eq!(
            err.user_message(),
            "Failed to load AI suggestions. Please try again."
        );
    }
}
