// crates/swapshop-cli/src/commands/summary.rs
//
// `swapshop summary <user>`: a user's trust score and recent events.

use clap::Args;

use swapshop_core::Summary;

use super::{parse_user, stars, Context, EventRow};
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

/// Show a user's trust score.
#[derive(Debug, Args)]
pub struct SummaryCmd {
    /// User id (UUID).
    pub user: String,

    /// Include the full event history.
    #[arg(long, conflicts_with = "public")]
    pub detailed: bool,

    /// Show only the fields other users may see.
    #[arg(long)]
    pub public: bool,
}

/// Run the summary command.
pub async fn run(ctx: &Context, cmd: &SummaryCmd) -> Result<(), Box<dyn std::error::Error>> {
    let user = parse_user(&cmd.user)?;

    if cmd.public {
        let public = ctx.service.get_public_summary(&user).await?;
        match ctx.format {
            OutputFormat::Json => println!("{}", format_json(&public)),
            OutputFormat::Table => {
                let rows = vec![
                    FieldRow::new("User", public.user_id),
                    FieldRow::new("Score", public.current_score),
                    FieldRow::new("Rating", stars(public.star_rating)),
                    FieldRow::new("Level", public.trust_level),
                    FieldRow::new("Transactions", public.total_transactions),
                    FieldRow::new("Positive", public.positive_transactions),
                    FieldRow::new("New Member", public.is_first_transaction),
                ];
                println!("{}", format_table(&rows));
            }
        }
        return Ok(());
    }

    if cmd.detailed {
        let detailed = ctx.service.get_detailed(&user).await?;
        match ctx.format {
            OutputFormat::Json => println!("{}", format_json(&detailed)),
            OutputFormat::Table => {
                print_summary(&detailed.summary);
                println!();
                println!("Full history ({} events):", detailed.all_events.len());
                let events: Vec<EventRow> = detailed.all_events.iter().map(EventRow::from).collect();
                println!("{}", format_table(&events));
            }
        }
        return Ok(());
    }

    let summary = ctx.service.get_summary(&user).await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&summary)),
        OutputFormat::Table => {
            print_summary(&summary);
            if !summary.recent_events.is_empty() {
                println!();
                println!("Recent events:");
                let events: Vec<EventRow> = summary.recent_events.iter().map(EventRow::from).collect();
                println!("{}", format_table(&events));
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    let rows = vec![
        FieldRow::new("User", summary.user_id),
        FieldRow::new("Score", summary.current_score),
        FieldRow::new("Rating", stars(summary.star_rating)),
        FieldRow::new("Level", summary.trust_level),
        FieldRow::new("Transactions", summary.total_transactions),
        FieldRow::new("Positive", summary.positive_transactions),
        FieldRow::new("Negative", summary.negative_transactions),
        FieldRow::new("Last Activity", summary.last_activity_at.to_rfc3339()),
        FieldRow::new("Months Inactive", summary.months_inactive),
        FieldRow::new("First-Transaction Bonus Pending", summary.is_first_transaction),
    ];
    println!("{}", format_table(&rows));
}
