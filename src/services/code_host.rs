use async_trait::async_trait;

use crate::domain::pull_request::{Project, PullRequest, PullRequestSpec, Repository, Workspace};
use crate::error::AppResult;

#[async_trait]
pub trait CodeHostService: Send + Sync {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>>;

    async fn get_workspace(&self, slug: &str) -> AppResult<Workspace>;

    async fn list_projects(&self, workspace: &str) -> AppResult<Vec<Project>>;

    async fn list_repositories(&self, workspace: &str) -> AppResult<Vec<Repository>>;

    async fn get_repository(&self, workspace: &str, slug: &str) -> AppResult<Repository>;

    async fn create_pull_request(
        &self,
        workspace: &str,
        spec: PullRequestSpec,
    ) -> AppResult<PullRequest>;
}
