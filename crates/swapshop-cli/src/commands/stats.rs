// crates/swapshop-cli/src/commands/stats.rs
//
// `swapshop stats`: population-wide trust-score statistics.

use swapshop_core::TrustLevel;

use super::Context;
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

/// Run the stats command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let stats = ctx.service.get_statistics().await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&stats)),
        OutputFormat::Table => {
            let rows = vec![
                FieldRow::new("Users", stats.total_users),
                FieldRow::new("Average Score", format!("{:.1}", stats.average_score)),
                FieldRow::new("Highest Score", stats.highest_score),
                FieldRow::new("Lowest Score", stats.lowest_score),
                FieldRow::new("Transactions", stats.total_transactions),
                FieldRow::new("Positive", stats.total_positive_transactions),
                FieldRow::new("Negative", stats.total_negative_transactions),
            ];
            println!("{}", format_table(&rows));
            println!();

            let tiers = vec![
                FieldRow::new(&TrustLevel::Excellent.to_string(), stats.tiers.excellent),
                FieldRow::new(&TrustLevel::Good.to_string(), stats.tiers.good),
                FieldRow::new(&TrustLevel::Fair.to_string(), stats.tiers.fair),
                FieldRow::new(&TrustLevel::Risky.to_string(), stats.tiers.risky),
                FieldRow::new(&TrustLevel::VeryPoor.to_string(), stats.tiers.very_poor),
            ];
            println!("Distribution:");
            println!("{}", format_table(&tiers));
        }
    }

    Ok(())
}
