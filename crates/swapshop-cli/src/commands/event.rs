// crates/swapshop-cli/src/commands/event.rs
//
// `swapshop event <json>`: feed a marketplace lifecycle action through the
// same hook the transaction and request services use.

use clap::Args;

use swapshop_service::{LifecycleAction, LifecycleHook};

use super::Context;
use crate::output::{format_json, OutputFormat};

/// Record a lifecycle action.
#[derive(Debug, Args)]
pub struct EventCmd {
    /// Action as JSON, e.g.
    /// '{"action":"item_returned_late","borrower_id":"<uuid>"}'.
    /// Use "-" to read it from stdin.
    pub payload: String,
}

/// Run the event command.
pub async fn run(ctx: &Context, cmd: &EventCmd) -> Result<(), Box<dyn std::error::Error>> {
    let raw = if cmd.payload == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        cmd.payload.clone()
    };
    let action = parse_action(&raw)?;
    let name = action.name();

    let hook = LifecycleHook::new(ctx.service.clone());
    let applied = hook.handle(action).await;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&serde_json::json!({ "action": name, "applied": applied }))
        ),
        OutputFormat::Table => {
            if applied {
                println!("Recorded {}.", name);
            } else {
                println!("Failed to record {}; see logs.", name);
            }
        }
    }

    if applied {
        Ok(())
    } else {
        Err(format!("trust update for {} failed", name).into())
    }
}

fn parse_action(raw: &str) -> Result<LifecycleAction, Box<dyn std::error::Error>> {
    serde_json::from_str(raw.trim()).map_err(|e| format!("Invalid lifecycle action: {}", e).into())
}
