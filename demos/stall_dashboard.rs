use buntee_tracker::*;
use chrono::{Datelike, NaiveDate};
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = TrackerConfig::from_env()?;

    println!("🥯 Buntee stall tracker demo\n");

    let provider = InMemorySessionProvider::new();
    provider.register("owner-1", "owner@buntee.com", "demo", UserRole::Owner)?;
    provider.register("partner-1", "partner@buntee.com", "demo", UserRole::Partner)?;

    let repo = InMemoryEntryRepository::new();

    provider.sign_in("owner@buntee.com", "demo").await?;
    let session = SessionContext::from_provider(&provider);

    let first = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("bad date")?;
    let mut dashboard = DashboardView::new(session, &config, first);

    for (offset, buns) in [(0u64, 100u32), (1, 85), (2, 120), (5, 60)] {
        let day = first + chrono::Days::new(offset);
        dashboard.load(&repo, day).await;
        dashboard.edit(|i| {
            i.buns_sold = buns;
            i.other_sales = 150.0;
            i.ingredients_cost = f64::from(buns) * 9.5;
            i.gas_cost = 200.0;
            i.packaging_cost = f64::from(buns) * 1.2;
            i.misc_cost = 50.0;
        })?;
        dashboard.set_owner_share(60)?;
        let saved = dashboard.save(&repo).await?;
        println!(
            "  {}  buns {:>3}  revenue ₹{:>7}  profit ₹{:>7}",
            saved.date,
            saved.inputs.buns_sold,
            format_amount(saved.derived.revenue),
            format_amount(saved.derived.net_profit)
        );
    }

    let month = month_key(first);
    let mut history = HistoryView::new(&config, month.clone());
    history.refresh(&repo).await?;
    println!("\n📜 History for {} (newest first)", history.month());
    for row in history.rows() {
        println!(
            "  {:02}  owner ₹{:>7}  partner ₹{:>7}",
            row.date.day(),
            format_amount(row.owner_amount),
            format_amount(row.partner_amount)
        );
    }

    let mut summary = SummaryView::new(&config, month.clone());
    summary.load(&repo, &month).await?;
    let totals = summary.summary();
    println!("\n📊 Monthly summary");
    println!("  Revenue:        ₹{}", format_amount(totals.total_revenue));
    println!("  Expenses:       ₹{}", format_amount(totals.total_expenses));
    println!("  Net profit:     ₹{}", format_amount(totals.total_profit));
    println!("  Owner payout:   ₹{}", format_amount(totals.total_owner_payout));
    println!("  Partner payout: ₹{}", format_amount(totals.total_partner_payout));
    if let Some(footer) = summary.footer() {
        println!("\n{}", footer);
    }

    println!("\n--- Prompt that would be sent for tips ---\n{}", build_insight_prompt(&totals));

    provider.sign_out().await?;
    Ok(())
}
