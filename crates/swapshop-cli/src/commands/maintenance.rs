// crates/swapshop-cli/src/commands/maintenance.rs
//
// `swapshop maintenance {sweep, resync}`: run the daemon's periodic jobs
// by hand.

use clap::Subcommand;
use tabled::Tabled;

use super::{parse_user, Context};
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

/// Maintenance subcommands.
#[derive(Debug, Subcommand)]
pub enum MaintenanceCmd {
    /// Apply the inactivity penalty to every record idle for 12+ months.
    Sweep,
    /// Rewrite profile projections from the authoritative records.
    Resync {
        /// Resync only this user (UUID). Without it, every record is resynced.
        user: Option<String>,
    },
}

#[derive(Tabled)]
struct DecayRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "New Score")]
    new_score: u16,
    #[tabled(rename = "Months Inactive")]
    months_inactive: u32,
}

/// Run the maintenance subcommand.
pub async fn run(ctx: &Context, cmd: &MaintenanceCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        MaintenanceCmd::Sweep => {
            let report = ctx.service.run_inactivity_sweep().await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&report)),
                OutputFormat::Table => {
                    let rows = vec![
                        FieldRow::new("Scanned", report.scanned),
                        FieldRow::new("Penalized", report.affected.len()),
                        FieldRow::new("Failed", report.failed),
                    ];
                    println!("{}", format_table(&rows));
                    if !report.affected.is_empty() {
                        let decayed: Vec<DecayRow> = report
                            .affected
                            .iter()
                            .map(|d| DecayRow {
                                user: d.user_id.to_string(),
                                new_score: d.new_score,
                                months_inactive: d.months_inactive,
                            })
                            .collect();
                        println!();
                        println!("{}", format_table(&decayed));
                    }
                }
            }
        }
        MaintenanceCmd::Resync { user: Some(user) } => {
            let user = parse_user(user)?;
            ctx.service.resync(&user).await?;
            match ctx.format {
                OutputFormat::Json => {
                    println!("{}", format_json(&serde_json::json!({ "resynced": user })))
                }
                OutputFormat::Table => println!("Projection resynced for {}", user),
            }
        }
        MaintenanceCmd::Resync { user: None } => {
            let report = ctx.service.resync_all().await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&report)),
                OutputFormat::Table => {
                    let rows = vec![
                        FieldRow::new("Successful", report.successful),
                        FieldRow::new("Failed", report.failed),
                    ];
                    println!("{}", format_table(&rows));
                }
            }
        }
    }

    Ok(())
}
