// crates/swapshop-cli/src/commands/browse.rs
//
// `swapshop browse`: page through trust records, optionally by level.

use clap::Args;
use tabled::Tabled;

use swapshop_core::TrustLevel;

use super::{stars, Context};
use crate::output::{format_json, format_table, OutputFormat};

/// Browse trust records, best first.
#[derive(Debug, Args)]
pub struct BrowseCmd {
    /// Filter by level: excellent, good, fair, risky, very_poor.
    #[arg(long)]
    pub level: Option<String>,

    /// Page number, starting at 1.
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page (default 20).
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Tabled)]
struct BrowseRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Score")]
    score: u16,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "+/-/Total")]
    counts: String,
    #[tabled(rename = "Inactive (mo)")]
    months_inactive: u32,
    #[tabled(rename = "Last Activity")]
    last_activity: String,
}

/// Run the browse command.
pub async fn run(ctx: &Context, cmd: &BrowseCmd) -> Result<(), Box<dyn std::error::Error>> {
    let level = cmd
        .level
        .as_deref()
        .map(str::parse::<TrustLevel>)
        .transpose()?;
    let page = ctx.service.browse(level, cmd.page, cmd.limit).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&page)),
        OutputFormat::Table => {
            let rows: Vec<BrowseRow> = page
                .items
                .iter()
                .map(|r| BrowseRow {
                    user: r.user_id.to_string(),
                    score: r.current_score,
                    rating: stars(r.star_rating),
                    level: r.trust_level.to_string(),
                    counts: format!(
                        "{}/{}/{}",
                        r.positive_transactions, r.negative_transactions, r.total_transactions
                    ),
                    months_inactive: r.months_inactive,
                    last_activity: r.last_activity_at.format("%Y-%m-%d").to_string(),
                })
                .collect();
            println!("{}", format_table(&rows));
            println!(
                "Page {} of {} ({} of {} records)",
                page.pagination.current,
                page.pagination.total_pages.max(1),
                page.pagination.count,
                page.pagination.total_count
            );
        }
    }

    Ok(())
}
