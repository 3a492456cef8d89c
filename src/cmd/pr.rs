use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::cmd::confirm;
use crate::context::AppContext;
use crate::domain::branch::extract_ticket_id;
use crate::domain::pull_request::PullRequestSpec;
use crate::error::{AppError, AppResult};
use crate::workflow::describe::generate_description;

#[derive(Args, Debug, Clone)]
pub struct PrArgs {
    /// Ticket id (extracted from the source branch name if omitted).
    #[arg(long)]
    pub ticket: Option<String>,
    /// Repository slug.
    #[arg(long)]
    pub repo: String,
    /// Source branch (defaults to the current branch).
    #[arg(long)]
    pub source: Option<String>,
    /// Destination branch.
    #[arg(long, default_value = "main")]
    pub destination: String,
    /// Skip generating a description.
    #[arg(long)]
    pub no_description: bool,
    /// Path to the PR template used for the generated description.
    #[arg(long, default_value = "templates/pr_template")]
    pub template: PathBuf,
}

pub async fn run(ctx: &AppContext, args: PrArgs) -> AppResult<()> {
    let workspace = ctx.config.bitbucket_workspace.clone().ok_or_else(|| {
        AppError::Configuration("BITBUCKET_WORKSPACE not configured".to_string())
    })?;

    let source = match args.source.clone() {
        Some(source) => source,
        None => {
            let current = match ctx.version_control.current_branch().await {
                Ok(branch) => branch,
                Err(err) => {
                    println!(
                        "{}",
                        format!("Could not determine current branch: {err}").red()
                    );
                    return Ok(());
                }
            };
            println!("Using current branch: {current}");
            current
        }
    };

    let ticket = args.ticket.clone().or_else(|| {
        let extracted = extract_ticket_id(&source);
        match &extracted {
            Some(ticket) => println!("Extracted ticket id from branch: {ticket}"),
            None => println!(
                "{}",
                "Could not extract a ticket id from the branch name; provide one with --ticket."
                    .yellow()
            ),
        }
        extracted
    });

    let description = match (&ticket, args.no_description) {
        (Some(ticket), false) => {
            println!("Generating description for ticket {ticket}...");
            match generate_description(ctx, ticket, &args.template, &args.destination, true).await
            {
                Ok(outcome) => {
                    if let Some(reason) = outcome.degraded_reason() {
                        eprintln!("{}", format!("Generation degraded: {reason}").yellow());
                    }
                    Some(outcome.into_text())
                }
                Err(err) => {
                    println!(
                        "{}",
                        format!("Error generating PR description: {err}").yellow()
                    );
                    None
                }
            }
        }
        _ => None,
    };

    let title = match &ticket {
        Some(ticket) => format!("[{ticket}] Merge {source} into {}", args.destination),
        None => format!("Merge {source} into {}", args.destination),
    };

    println!("\nAbout to create PR with:");
    println!("Repository: {}", args.repo);
    println!("Source branch: {source}");
    println!("Destination branch: {}", args.destination);
    println!("Title: {title}");

    if !confirm("Proceed?").await? {
        println!("Operation cancelled.");
        return Ok(());
    }

    println!("Creating pull request...");
    let spec = PullRequestSpec {
        repository: args.repo.clone(),
        source_branch: source,
        destination_branch: args.destination.clone(),
        title: Some(title),
        description,
    };
    match ctx.code_host.create_pull_request(&workspace, spec).await {
        Ok(pull_request) => {
            println!("{}", "Pull request created successfully!".green());
            if let Some(url) = &pull_request.url {
                println!("PR URL: {url}");
            }
        }
        Err(err) => println!("{}", format!("Error: {err}").red()),
    }
    Ok(())
}
