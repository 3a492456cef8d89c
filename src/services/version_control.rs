use async_trait::async_trait;

use crate::domain::branch::BranchName;
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Diff of the staged changes, empty string when nothing is staged.
    async fn staged_diff(&self) -> AppResult<String>;

    /// Diff of the working tree against `target` (e.g. `main`).
    async fn diff_against(&self, target: &str) -> AppResult<String>;

    async fn is_clean(&self) -> AppResult<bool>;

    /// Commit staged changes. Returns `false` on failure instead of an
    /// error so callers can decide whether to retry or abort.
    async fn commit(&self, message: &str) -> bool;

    /// Local branch names. Degrades to an empty list on failure.
    async fn local_branches(&self) -> Vec<String>;

    /// Check out `branch`, creating it first when `create` is set.
    /// Returns `false` on failure, matching `commit`.
    async fn checkout(&self, branch: &BranchName, create: bool) -> bool;

    async fn current_branch(&self) -> AppResult<String>;

    async fn pull_latest(&self) -> AppResult<()>;
}
