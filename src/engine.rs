//! Profit arithmetic for a single day's entry.
//!
//! Every function here is pure and cheap, so figures are always recomputed
//! from the current inputs rather than cached. Inputs are not validated:
//! a negative price or cost flows straight through the arithmetic.

use crate::schema::{DerivedFigures, EntryInputs};
use serde::{Deserialize, Serialize};

/// The owner's and partner's portions of a day's net profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSplit {
    pub owner_amount: f64,
    pub partner_amount: f64,
}

pub fn compute_revenue(buns_sold: u32, price_per_bun: f64, other_sales: f64) -> f64 {
    f64::from(buns_sold) * price_per_bun + other_sales
}

pub fn compute_expenses(ingredients: f64, gas: f64, packaging: f64, misc: f64) -> f64 {
    ingredients + gas + packaging + misc
}

/// Negative results are loss days, not errors.
pub fn compute_net_profit(revenue: f64, total_expenses: f64) -> f64 {
    revenue - total_expenses
}

/// Each amount is an independent share of `net_profit`. Percentages that do
/// not sum to 100 are used as given, so the two amounts then do not add up to
/// the net profit.
pub fn compute_split(net_profit: f64, owner_percent: u8, partner_percent: u8) -> ProfitSplit {
    ProfitSplit {
        owner_amount: net_profit * f64::from(owner_percent) / 100.0,
        partner_amount: net_profit * f64::from(partner_percent) / 100.0,
    }
}

pub fn split_is_balanced(owner_percent: u8, partner_percent: u8) -> bool {
    u16::from(owner_percent) + u16::from(partner_percent) == 100
}

pub fn compute_figures(inputs: &EntryInputs) -> DerivedFigures {
    let revenue = compute_revenue(inputs.buns_sold, inputs.price_per_bun, inputs.other_sales);
    let total_expenses = compute_expenses(
        inputs.ingredients_cost,
        inputs.gas_cost,
        inputs.packaging_cost,
        inputs.misc_cost,
    );
    let net_profit = compute_net_profit(revenue, total_expenses);
    let split = compute_split(
        net_profit,
        inputs.owner_share_percent,
        inputs.partner_share_percent,
    );

    DerivedFigures {
        revenue,
        total_expenses,
        net_profit,
        owner_amount: split.owner_amount,
        partner_amount: split.partner_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_revenue_is_linear_combination() {
        assert!((compute_revenue(100, 30.0, 200.0) - 3200.0).abs() < EPS);
        assert_eq!(compute_revenue(0, 0.0, 0.0), 0.0);
        assert!((compute_revenue(7, 12.5, 0.25) - 87.75).abs() < EPS);
    }

    #[test]
    fn test_negative_price_reduces_revenue() {
        assert!((compute_revenue(10, -5.0, 100.0) - 50.0).abs() < EPS);
    }

    #[test]
    fn test_expenses_order_does_not_matter() {
        let a = compute_expenses(1000.0, 200.0, 100.0, 50.0);
        let b = compute_expenses(50.0, 100.0, 200.0, 1000.0);
        assert!((a - 1350.0).abs() < EPS);
        assert!((a - b).abs() < EPS);
    }

    #[test]
    fn test_loss_day_is_shared() {
        let profit = compute_net_profit(500.0, 800.0);
        assert!((profit + 300.0).abs() < EPS);

        let split = compute_split(profit, 60, 40);
        assert!((split.owner_amount + 180.0).abs() < EPS);
        assert!((split.partner_amount + 120.0).abs() < EPS);
    }

    #[test]
    fn test_split_sums_only_when_balanced() {
        let balanced = compute_split(1850.0, 60, 40);
        assert!((balanced.owner_amount + balanced.partner_amount - 1850.0).abs() < EPS);
        assert!(split_is_balanced(60, 40));

        let short = compute_split(1850.0, 50, 30);
        assert!((short.owner_amount - 925.0).abs() < EPS);
        assert!((short.partner_amount - 555.0).abs() < EPS);
        assert!((short.owner_amount + short.partner_amount - 1850.0).abs() > 1.0);
        assert!(!split_is_balanced(50, 30));
    }

    #[test]
    fn test_compute_figures_scenario() {
        let inputs = EntryInputs {
            buns_sold: 100,
            price_per_bun: 30.0,
            other_sales: 200.0,
            ingredients_cost: 1000.0,
            gas_cost: 200.0,
            packaging_cost: 100.0,
            misc_cost: 50.0,
            owner_share_percent: 60,
            partner_share_percent: 40,
        };

        let figures = compute_figures(&inputs);
        assert!((figures.revenue - 3200.0).abs() < EPS);
        assert!((figures.total_expenses - 1350.0).abs() < EPS);
        assert!((figures.net_profit - 1850.0).abs() < EPS);
        assert!((figures.owner_amount - 1110.0).abs() < EPS);
        assert!((figures.partner_amount - 740.0).abs() < EPS);
    }
}
