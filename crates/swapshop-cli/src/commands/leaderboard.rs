// crates/swapshop-cli/src/commands/leaderboard.rs
//
// `swapshop leaderboard`: highest trust scores, best first.

use clap::Args;
use tabled::Tabled;

use super::{stars, Context};
use crate::output::{format_json, format_table, OutputFormat};

/// Show the trust-score leaderboard.
#[derive(Debug, Args)]
pub struct LeaderboardCmd {
    /// Number of users to show (default 10, capped by configuration).
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Tabled)]
struct LeaderRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Score")]
    score: u16,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Transactions")]
    transactions: u64,
}

/// Run the leaderboard command.
pub async fn run(ctx: &Context, cmd: &LeaderboardCmd) -> Result<(), Box<dyn std::error::Error>> {
    let leaders = ctx.service.get_leaderboard(cmd.limit).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&leaders)),
        OutputFormat::Table => {
            if leaders.is_empty() {
                println!("No trust scores recorded yet.");
                return Ok(());
            }
            let rows: Vec<LeaderRow> = leaders
                .iter()
                .enumerate()
                .map(|(i, s)| LeaderRow {
                    rank: i + 1,
                    user: s.user_id.to_string(),
                    score: s.current_score,
                    rating: stars(s.star_rating),
                    level: s.trust_level.to_string(),
                    transactions: s.total_transactions,
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}
