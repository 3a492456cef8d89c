use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::warn;

use crate::domain::branch::BranchName;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    /// Run `git <args>` in the workdir and return trimmed stdout. Non-zero
    /// exit becomes a typed failure carrying the command line and stderr.
    async fn run(&self, args: &[&str]) -> AppResult<String> {
        let command_line = format!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| AppError::VersionControl {
                command: command_line.clone(),
                stderr: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(AppError::VersionControl {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn staged_diff(&self) -> AppResult<String> {
        self.run(&["diff", "--staged"]).await
    }

    async fn diff_against(&self, target: &str) -> AppResult<String> {
        self.run(&["diff", target]).await
    }

    async fn is_clean(&self) -> AppResult<bool> {
        let status = self.run(&["status", "--porcelain"]).await?;
        Ok(status.is_empty())
    }

    async fn commit(&self, message: &str) -> bool {
        match self.run(&["commit", "-m", message]).await {
            Ok(_) => true,
            Err(err) => {
                warn!("commit failed: {err}");
                false
            }
        }
    }

    async fn local_branches(&self) -> Vec<String> {
        match self.run(&["branch", "--format=%(refname:short)"]).await {
            Ok(output) => parse_branch_list(&output),
            Err(err) => {
                warn!("could not list local branches: {err}");
                Vec::new()
            }
        }
    }

    async fn checkout(&self, branch: &BranchName, create: bool) -> bool {
        let result = if create {
            self.run(&["checkout", "-b", branch.as_str()]).await
        } else {
            self.run(&["checkout", branch.as_str()]).await
        };
        match result {
            Ok(_) => true,
            Err(err) => {
                warn!("checkout of {branch} failed: {err}");
                false
            }
        }
    }

    async fn current_branch(&self) -> AppResult<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn pull_latest(&self) -> AppResult<()> {
        self.run(&["pull", "--ff-only"]).await.map(|_| ())
    }
}

fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_start_matches("* ").to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branch_list_output() {
        let branches = parse_branch_list("main\nfeature/ABC-1-thing\n\n  develop\n");
        assert_eq!(branches, vec!["main", "feature/ABC-1-thing", "develop"]);
    }

    #[test]
    fn parses_empty_output() {
        assert!(parse_branch_list("").is_empty());
    }

    #[tokio::test]
    async fn run_reports_command_line_on_failure() {
        let git = GitCli::new(std::env::temp_dir());
        let err = git.run(&["no-such-subcommand"]).await;
        match err {
            Err(AppError::VersionControl { command, .. }) => {
                assert_eq!(command, "git no-such-subcommand");
            }
            other => panic!("expected VersionControl error, got {other:?}"),
        }
    }
}
