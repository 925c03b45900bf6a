// crates/swapshop-cli/src/commands/admin.rs
//
// `swapshop admin {adjust, penalty, reset, init}`: operator actions on a
// user's trust score. Every action is validated before the record is touched.

use clap::Subcommand;

use swapshop_core::Summary;
use swapshop_service::{AdjustmentRequest, PenaltyRequest};

use super::{parse_user, stars, Context};
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

/// Admin subcommands.
#[derive(Debug, Subcommand)]
pub enum AdminCmd {
    /// Apply a manual adjustment (positive or negative).
    Adjust {
        /// User id (UUID).
        user: String,
        /// Score delta, within the configured maximum.
        #[arg(long, allow_hyphen_values = true)]
        impact: i32,
        /// Why the adjustment is being made.
        #[arg(long)]
        reason: String,
        /// Free-form notes kept on the event.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Apply an admin penalty.
    Penalty {
        /// User id (UUID).
        user: String,
        /// Why the penalty is being applied. Stored as the event description.
        #[arg(long)]
        reason: String,
        /// Custom negative impact (defaults to the configured penalty).
        #[arg(long, allow_hyphen_values = true)]
        impact: Option<i32>,
        /// Free-form notes kept on the event.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reset a user's record to the base score.
    Reset {
        /// User id (UUID).
        user: String,
        /// Why the record is being reset.
        #[arg(long)]
        reason: String,
    },
    /// Create records for users that do not have one yet.
    Init {
        /// One or more user ids (UUID).
        #[arg(required = true)]
        users: Vec<String>,
    },
}

/// Run the admin subcommand.
pub async fn run(ctx: &Context, cmd: &AdminCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AdminCmd::Adjust {
            user,
            impact,
            reason,
            notes,
        } => {
            let user = parse_user(user)?;
            let mut request = AdjustmentRequest::new(*impact, reason.as_str());
            if let Some(notes) = notes {
                request = request.with_notes(notes.as_str());
            }
            let summary = ctx.service.apply_manual_adjustment(&user, &request).await?;
            print_result(ctx, "Adjustment applied.", &summary);
        }
        AdminCmd::Penalty {
            user,
            reason,
            impact,
            notes,
        } => {
            let user = parse_user(user)?;
            let mut request = PenaltyRequest::new(reason.as_str());
            if let Some(impact) = impact {
                request = request.with_impact(*impact);
            }
            if let Some(notes) = notes {
                request = request.with_notes(notes.as_str());
            }
            let summary = ctx.service.apply_admin_penalty(&user, &request).await?;
            print_result(ctx, "Penalty applied.", &summary);
        }
        AdminCmd::Reset { user, reason } => {
            let user = parse_user(user)?;
            let summary = ctx.service.reset(&user, reason).await?;
            print_result(ctx, "Trust score reset.", &summary);
        }
        AdminCmd::Init { users } => {
            let ids = users
                .iter()
                .map(|u| parse_user(u))
                .collect::<Result<Vec<_>, _>>()?;
            let report = ctx.service.initialize_all(&ids).await;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&report)),
                OutputFormat::Table => {
                    let mut rows = vec![
                        FieldRow::new("Initialized", report.initialized),
                        FieldRow::new("Already Existing", report.existing),
                        FieldRow::new("Errors", report.errors.len()),
                    ];
                    rows.extend(
                        report
                            .errors
                            .iter()
                            .map(|f| FieldRow::new(&f.user_id.to_string(), &f.error)),
                    );
                    println!("{}", format_table(&rows));
                }
            }
        }
    }

    Ok(())
}

fn print_result(ctx: &Context, headline: &str, summary: &Summary) {
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(summary)),
        OutputFormat::Table => {
            println!("{}", headline);
            let rows = vec![
                FieldRow::new("User", summary.user_id),
                FieldRow::new("Score", summary.current_score),
                FieldRow::new("Rating", stars(summary.star_rating)),
                FieldRow::new("Level", summary.trust_level),
            ];
            println!("{}", format_table(&rows));
        }
    }
}
