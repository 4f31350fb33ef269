use crate::schema::{DailyEntry, MonthlySummary};
use log::debug;

/// Folds a month's entries into totals.
///
/// Each entry contributes its figures as recomputed from its raw inputs.
/// Entries are neither filtered nor deduplicated here: one entry per date is
/// the repository's guarantee. Addition is order independent, and an empty
/// slice yields an all-zero summary.
pub fn aggregate_month(month: &str, entries: &[DailyEntry]) -> MonthlySummary {
    let summary = entries
        .iter()
        .map(DailyEntry::recomputed)
        .fold(MonthlySummary::empty(month), |mut acc, entry| {
            acc.total_buns += u64::from(entry.inputs.buns_sold);
            acc.total_revenue += entry.derived.revenue;
            acc.total_expenses += entry.derived.total_expenses;
            acc.total_profit += entry.derived.net_profit;
            acc.total_owner_payout += entry.derived.owner_amount;
            acc.total_partner_payout += entry.derived.partner_amount;
            acc.entry_count += 1;
            acc
        });

    debug!(
        "Aggregated {} entries for {}: profit {}",
        summary.entry_count, month, summary.total_profit
    );

    summary
}
