use clap::Args;
use colored::Colorize;

use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct BranchesArgs {
    /// Only show branches mentioning this ticket id.
    #[arg(long)]
    pub ticket: Option<String>,
}

pub async fn run(ctx: &AppContext, args: BranchesArgs) -> AppResult<()> {
    let mut branches = ctx.version_control.local_branches().await;
    if let Some(ticket) = &args.ticket {
        branches.retain(|branch| branch.contains(ticket.as_str()));
    }

    if branches.is_empty() {
        match &args.ticket {
            Some(ticket) => println!("No branches found for ticket {ticket}."),
            None => println!("No branches found."),
        }
        return Ok(());
    }

    println!("Found {} branches:", branches.len());
    for (index, branch) in branches.iter().enumerate() {
        println!("{}", format!("{}. {branch}", index + 1).green());
    }
    Ok(())
}
