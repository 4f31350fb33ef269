use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::compute_figures;

pub const DEFAULT_BUN_PRICE: f64 = 30.0;
pub const DEFAULT_OWNER_SHARE: u8 = 50;
pub const DEFAULT_PARTNER_SHARE: u8 = 50;

/// The raw, user-editable figures of one day's trading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryInputs {
    #[schemars(description = "Number of buns sold on the day")]
    pub buns_sold: u32,

    #[schemars(description = "Selling price of a single bun, in currency units")]
    pub price_per_bun: f64,

    #[schemars(description = "Sales that are not buns (drinks, extras), in currency units")]
    pub other_sales: f64,

    pub ingredients_cost: f64,
    pub gas_cost: f64,
    pub packaging_cost: f64,
    pub misc_cost: f64,

    #[schemars(description = "Owner's share of net profit, 0-100")]
    pub owner_share_percent: u8,

    #[schemars(description = "Partner's share of net profit, 0-100")]
    pub partner_share_percent: u8,
}

impl Default for EntryInputs {
    fn default() -> Self {
        Self::with_defaults(
            DEFAULT_BUN_PRICE,
            DEFAULT_OWNER_SHARE,
            DEFAULT_PARTNER_SHARE,
        )
    }
}

impl EntryInputs {
    /// A blank day: zero sales and costs at the given price and split.
    pub fn with_defaults(price_per_bun: f64, owner_share: u8, partner_share: u8) -> Self {
        Self {
            buns_sold: 0,
            price_per_bun,
            other_sales: 0.0,
            ingredients_cost: 0.0,
            gas_cost: 0.0,
            packaging_cost: 0.0,
            misc_cost: 0.0,
            owner_share_percent: owner_share,
            partner_share_percent: partner_share,
        }
    }

    /// Moves the owner slider; the partner share follows so the pair sums to 100.
    pub fn set_owner_share(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.owner_share_percent = percent;
        self.partner_share_percent = 100 - percent;
    }

    pub fn set_partner_share(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.partner_share_percent = percent;
        self.owner_share_percent = 100 - percent;
    }

    /// Zeroes the sales and cost fields, keeping price and split as they are.
    pub fn clear_figures(&mut self) {
        self.buns_sold = 0;
        self.other_sales = 0.0;
        self.ingredients_cost = 0.0;
        self.gas_cost = 0.0;
        self.packaging_cost = 0.0;
        self.misc_cost = 0.0;
    }
}

/// Figures computed from [`EntryInputs`]. Persisted next to the inputs but
/// never edited directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFigures {
    pub revenue: f64,
    pub total_expenses: f64,

    #[schemars(description = "Revenue minus expenses. Negative on a loss day.")]
    pub net_profit: f64,

    pub owner_amount: f64,
    pub partner_amount: f64,
}

/// One calendar day's record. The date is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    #[schemars(description = "Calendar date in YYYY-MM-DD format; primary key")]
    pub date: NaiveDate,

    #[serde(flatten)]
    pub inputs: EntryInputs,

    #[serde(flatten)]
    pub derived: DerivedFigures,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Write timestamp assigned by the store")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DailyEntry {
    pub fn from_inputs(date: NaiveDate, inputs: EntryInputs) -> Self {
        Self {
            date,
            inputs,
            derived: compute_figures(&inputs),
            created_at: None,
        }
    }

    /// Re-derives the figures from the stored raw fields, discarding whatever
    /// derived values were persisted.
    pub fn recomputed(&self) -> Self {
        Self {
            derived: compute_figures(&self.inputs),
            ..self.clone()
        }
    }

    /// True when inputs and derived figures match, ignoring the write timestamp.
    pub fn same_figures(&self, other: &DailyEntry) -> bool {
        self.date == other.date && self.inputs == other.inputs && self.derived == other.derived
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DailyEntry)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Month totals. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schemars(description = "Month in YYYY-MM format")]
    pub month: String,
    pub total_buns: u64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    pub total_owner_payout: f64,
    pub total_partner_payout: f64,
    pub entry_count: usize,
}

impl MonthlySummary {
    pub fn empty(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            total_buns: 0,
            total_revenue: 0.0,
            total_expenses: 0.0,
            total_profit: 0.0,
            total_owner_payout: 0.0,
            total_partner_payout: 0.0,
            entry_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let entry = DailyEntry::from_inputs(june_first(), EntryInputs::default());
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["pricePerBun"], 30.0);
        assert_eq!(json["ownerSharePercent"], 50);
        assert!(json.get("totalExpenses").is_some());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_deserialize_stored_document() {
        let raw = r#"{
            "date": "2024-06-02",
            "bunsSold": 10, "pricePerBun": 30, "otherSales": 0,
            "ingredientsCost": 100, "gasCost": 0, "packagingCost": 0, "miscCost": 0,
            "ownerSharePercent": 50, "partnerSharePercent": 50,
            "revenue": 999, "totalExpenses": 100, "netProfit": 899,
            "ownerAmount": 449.5, "partnerAmount": 449.5,
            "createdAt": "2024-06-02T18:30:00Z"
        }"#;

        let stored: DailyEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.derived.revenue, 999.0);
        assert!(stored.created_at.is_some());

        let fresh = stored.recomputed();
        assert_eq!(fresh.derived.revenue, 300.0);
        assert_eq!(fresh.derived.net_profit, 200.0);
        assert_eq!(fresh.created_at, stored.created_at);
    }

    #[test]
    fn test_share_slider_keeps_sum() {
        let mut inputs = EntryInputs::default();
        inputs.set_owner_share(70);
        assert_eq!(inputs.partner_share_percent, 30);

        inputs.set_partner_share(250);
        assert_eq!(inputs.partner_share_percent, 100);
        assert_eq!(inputs.owner_share_percent, 0);
    }

    #[test]
    fn test_clear_figures_keeps_price_and_split() {
        let mut inputs = EntryInputs::with_defaults(35.0, 60, 40);
        inputs.buns_sold = 12;
        inputs.gas_cost = 80.0;
        inputs.clear_figures();

        assert_eq!(inputs.buns_sold, 0);
        assert_eq!(inputs.gas_cost, 0.0);
        assert_eq!(inputs.price_per_bun, 35.0);
        assert_eq!(inputs.owner_share_percent, 60);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = DailyEntry::schema_as_json().unwrap();
        assert!(schema_json.contains("bunsSold"));
        assert!(schema_json.contains("ownerAmount"));
    }
}
