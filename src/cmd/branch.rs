use clap::Args;
use colored::Colorize;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::branch::create_branch_for_ticket;

#[derive(Args, Debug, Clone)]
pub struct BranchArgs {
    /// Ticket id to create the branch for.
    pub ticket: String,
    /// Branch type prefix (feature, bugfix, ...).
    #[arg(long, default_value = "feature")]
    pub branch_type: String,
}

pub async fn run(ctx: &AppContext, args: BranchArgs) -> AppResult<()> {
    println!("Creating branch for ticket {}...", args.ticket);
    let outcome = match create_branch_for_ticket(ctx, &args.ticket, &args.branch_type).await {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("{}", format!("Error: {err}").red());
            return Ok(());
        }
    };

    if !outcome.checked_out {
        println!(
            "{}",
            format!("Could not check out branch {}.", outcome.branch).red()
        );
    } else if outcome.created {
        println!("{}", format!("Created branch: {}", outcome.branch).green());
    } else {
        println!(
            "{}",
            format!("Using existing branch: {}", outcome.branch).green()
        );
    }
    Ok(())
}
