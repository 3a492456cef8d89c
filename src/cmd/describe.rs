use std::path::PathBuf;
use std::process::Stdio;

use clap::Args;
use colored::Colorize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::describe::generate_description;

#[derive(Args, Debug, Clone)]
pub struct DescribeArgs {
    /// Ticket id the description is for.
    pub ticket: String,
    /// Path to the PR template.
    #[arg(long, default_value = "templates/pr_template")]
    pub template: PathBuf,
    /// Copy the description to the clipboard.
    #[arg(long)]
    pub copy: bool,
    /// Branch to diff against (defaults to the configured target branch).
    #[arg(long)]
    pub target: Option<String>,
}

pub async fn run(ctx: &AppContext, args: DescribeArgs) -> AppResult<()> {
    let target = args
        .target
        .as_deref()
        .unwrap_or(ctx.config.target_branch.as_str());

    println!("Fetching diff data for ticket {}...", args.ticket);
    println!("Generating PR description...");
    let outcome =
        match generate_description(ctx, &args.ticket, &args.template, target, true).await {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("{}", format!("Error generating PR description: {err}").red());
                return Ok(());
            }
        };
    if let Some(reason) = outcome.degraded_reason() {
        eprintln!("{}", format!("Generation degraded: {reason}").yellow());
    }

    println!("\nPR Description:");
    println!("{}", outcome.text());

    if args.copy {
        match copy_to_clipboard(outcome.text()).await {
            Ok(()) => println!("{}", "PR description copied to clipboard.".green()),
            Err(err) => {
                println!("{}", format!("Failed to copy to clipboard: {err}").yellow())
            }
        }
    }
    Ok(())
}

/// Best-effort clipboard copy via whichever platform helper is installed.
async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let candidates: &[&[&str]] = &[
        &["pbcopy"],
        &["wl-copy"],
        &["xclip", "-selection", "clipboard"],
    ];

    for candidate in candidates {
        let spawned = Command::new(candidate[0])
            .args(&candidate[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = spawned else {
            continue;
        };
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
        }
        let status = child.wait().await.map_err(|err| err.to_string())?;
        if status.success() {
            return Ok(());
        }
    }
    Err("no working clipboard helper found (tried pbcopy, wl-copy, xclip)".to_string())
}
