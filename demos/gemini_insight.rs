use buntee_tracker::llm::GeminiInsightClient;
use buntee_tracker::*;
use chrono::NaiveDate;
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = TrackerConfig::from_env()?;
    let client = GeminiInsightClient::from_settings(&config.insight)?;

    println!("💡 Asking {} for business tips...\n", client.model());

    let repo = InMemoryEntryRepository::new();
    for (day, buns, ingredients) in [(1, 100, 1000.0), (2, 80, 850.0), (3, 130, 1240.0)] {
        let inputs = EntryInputs {
            buns_sold: buns,
            other_sales: 200.0,
            ingredients_cost: ingredients,
            gas_cost: 200.0,
            packaging_cost: 100.0,
            misc_cost: 50.0,
            ..config.defaults.blank_inputs()
        };
        let date = NaiveDate::from_ymd_opt(2024, 6, day).ok_or("bad date")?;
        repo.put_entry(&DailyEntry::from_inputs(date, inputs)).await?;
    }

    let mut summary = SummaryView::new(&config, "2024-06");
    summary.load(&repo, "2024-06").await?;

    match summary.generate_insight(&client).await {
        InsightState::Ready(text) => println!("{}", text),
        InsightState::Failed(message) => eprintln!("❌ {}", message),
        state => println!("No insight generated ({:?})", state),
    }

    Ok(())
}
