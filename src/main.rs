use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use bitlift::cmd::branch::{self, BranchArgs};
use bitlift::cmd::branches::{self, BranchesArgs};
use bitlift::cmd::commit::{self, CommitArgs};
use bitlift::cmd::describe::{self, DescribeArgs};
use bitlift::cmd::generate::{self, GenerateArgs};
use bitlift::cmd::pr::{self, PrArgs};
use bitlift::cmd::serve::{self, ServeArgs};
use bitlift::config::AppConfig;
use bitlift::context::AppContext;
use bitlift::error::AppResult;
use bitlift::infra::bitbucket::BitbucketClient;
use bitlift::infra::git::GitCli;
use bitlift::infra::jira::JiraClient;
use bitlift::infra::model::{LocalProcessBackend, ModelGateway};
use bitlift::services::CompletionBackend;

#[derive(Parser)]
#[command(
    name = "bitlift",
    author,
    version,
    about = "AI-assisted Git, Jira and Bitbucket workflow CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate text ad hoc from a prompt.
    Generate(GenerateArgs),
    /// Generate a commit message from the staged diff and commit.
    Commit(CommitArgs),
    /// Generate a PR description for a ticket.
    Describe(DescribeArgs),
    /// Create or check out the branch for a ticket.
    Branch(BranchArgs),
    /// List local branches, optionally filtered by ticket.
    Branches(BranchesArgs),
    /// Create a pull request on the code host.
    Pr(PrArgs),
    /// Run the local model HTTP service.
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bitlift=info")),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("{}", format!("Error: {error}").red());
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let local_backend: Option<Arc<dyn CompletionBackend>> = match &config.model_command {
        Some(command) => Some(Arc::new(LocalProcessBackend::from_command(command)?)),
        None => None,
    };
    let generation = Arc::new(ModelGateway::new(
        config.model_server_url.clone(),
        local_backend,
    ));

    let workdir = std::env::current_dir()?;
    let version_control = Arc::new(GitCli::new(workdir));
    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_url.clone(),
        config.jira_user.clone(),
        config.jira_token.clone(),
    ));
    let code_host = Arc::new(BitbucketClient::new(
        config.bitbucket_user.clone(),
        config.bitbucket_app_password.clone(),
    ));

    let ctx = AppContext::new(
        config,
        version_control,
        issue_tracker,
        code_host,
        generation,
    );

    match cli.command {
        Commands::Generate(args) => generate::run(&ctx, args).await,
        Commands::Commit(args) => commit::run(&ctx, args).await,
        Commands::Describe(args) => describe::run(&ctx, args).await,
        Commands::Branch(args) => branch::run(&ctx, args).await,
        Commands::Branches(args) => branches::run(&ctx, args).await,
        Commands::Pr(args) => pr::run(&ctx, args).await,
        Commands::Serve(args) => serve::run(&ctx, args).await,
    }
}
