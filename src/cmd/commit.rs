use clap::Args;
use colored::Colorize;

use crate::cmd::confirm;
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct CommitArgs {
    /// Ticket id to reference in the commit message.
    #[arg(long)]
    pub ticket: Option<String>,
    /// Commit without asking for confirmation.
    #[arg(short, long)]
    pub force: bool,
}

pub async fn run(ctx: &AppContext, args: CommitArgs) -> AppResult<()> {
    let diff = match ctx.version_control.staged_diff().await {
        Ok(diff) => diff,
        Err(err) => {
            println!("{}", format!("Git error: {err}").red());
            return Ok(());
        }
    };
    if diff.trim().is_empty() {
        println!("{}", "No staged changes to commit.".yellow());
        return Ok(());
    }

    println!("Generating commit message...");
    let outcome = ctx
        .generation
        .commit_message(&diff, args.ticket.as_deref())
        .await;
    if let Some(reason) = outcome.degraded_reason() {
        eprintln!("{}", format!("Generation degraded: {reason}").yellow());
    }

    println!("\nCommit message:");
    println!("{}", outcome.text().green());

    if !args.force && !confirm("Proceed with commit?").await? {
        println!("Commit cancelled.");
        return Ok(());
    }

    if ctx.version_control.commit(outcome.text()).await {
        println!("{}", "Changes committed successfully.".green());
    } else {
        println!("{}", "Commit failed. See log for details.".red());
    }
    Ok(())
}
