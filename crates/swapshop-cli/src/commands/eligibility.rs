// crates/swapshop-cli/src/commands/eligibility.rs
//
// `swapshop eligibility <user>`: whether a user may borrow or lend.

use clap::Args;

use swapshop_reputation::TransactionIntent;

use super::{parse_user, stars, Context};
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

/// Check whether a user may take part in a transaction.
#[derive(Debug, Args)]
pub struct EligibilityCmd {
    /// User id (UUID).
    pub user: String,

    /// Transaction side: borrow or lend.
    #[arg(long, default_value = "borrow")]
    pub intent: String,
}

/// Run the eligibility command.
pub async fn run(ctx: &Context, cmd: &EligibilityCmd) -> Result<(), Box<dyn std::error::Error>> {
    let user = parse_user(&cmd.user)?;
    let intent: TransactionIntent = cmd.intent.parse()?;
    let result = ctx.service.validate(&user, intent).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&result)),
        OutputFormat::Table => {
            let mut rows = vec![
                FieldRow::new("Intent", intent),
                FieldRow::new("Eligible", if result.eligible { "yes" } else { "NO" }),
                FieldRow::new("Score", result.trust_score),
                FieldRow::new("Rating", stars(result.star_rating)),
                FieldRow::new("Level", result.trust_level),
            ];
            rows.extend(result.restrictions.iter().map(|r| FieldRow::new("Restriction", r)));
            rows.extend(result.warnings.iter().map(|w| FieldRow::new("Warning", w)));
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}
