// crates/swapshop-cli/src/main.rs
//
// CLI entrypoint for SwapShop trust-score operations.
//
// Opens the local trust store directly and provides subcommands for
// inspecting scores, checking eligibility, admin actions, lifecycle events,
// and running maintenance jobs.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::admin::AdminCmd;
use commands::browse::BrowseCmd;
use commands::eligibility::EligibilityCmd;
use commands::event::EventCmd;
use commands::leaderboard::LeaderboardCmd;
use commands::maintenance::MaintenanceCmd;
use commands::summary::SummaryCmd;
use commands::Context;
use output::OutputFormat;

/// SwapShop CLI: trust-score tools for operators.
#[derive(Parser, Debug)]
#[command(
    name = "swapshop",
    version = "0.1.0",
    about = "SwapShop CLI: inspect and manage marketplace trust scores"
)]
struct Cli {
    /// Data directory (overrides the config file).
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "~/.swapshop/config.toml")]
    config: String,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a user's trust score and recent events.
    Summary(SummaryCmd),

    /// Check whether a user may borrow or lend.
    Eligibility(EligibilityCmd),

    /// Show the highest trust scores.
    Leaderboard(LeaderboardCmd),

    /// Show population-wide statistics.
    Stats,

    /// Page through trust records, optionally by level.
    Browse(BrowseCmd),

    /// Admin actions: adjust, penalty, reset, init.
    #[command(subcommand)]
    Admin(AdminCmd),

    /// Record a marketplace lifecycle action.
    Event(EventCmd),

    /// Maintenance jobs: sweep, resync.
    #[command(subcommand)]
    Maintenance(MaintenanceCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ctx = Context::open(
        cli.data_dir.as_deref(),
        &cli.config,
        OutputFormat::from_flag(cli.json),
    )?;

    match &cli.command {
        Commands::Summary(cmd) => commands::summary::run(&ctx, cmd).await?,
        Commands::Eligibility(cmd) => commands::eligibility::run(&ctx, cmd).await?,
        Commands::Leaderboard(cmd) => commands::leaderboard::run(&ctx, cmd).await?,
        Commands::Stats => commands::stats::run(&ctx).await?,
        Commands::Browse(cmd) => commands::browse::run(&ctx, cmd).await?,
        Commands::Admin(cmd) => commands::admin::run(&ctx, cmd).await?,
        Commands::Event(cmd) => commands::event::run(&ctx, cmd).await?,
        Commands::Maintenance(cmd) => commands::maintenance::run(&ctx, cmd).await?,
    }

    Ok(())
}
