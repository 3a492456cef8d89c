use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Fetch the one-line summary of `ticket`. The first call doubles as
    /// the connectivity check; every failure mode (missing credentials,
    /// unreachable host, unknown ticket) surfaces as `AppError::IssueTracker`.
    async fn issue_summary(&self, ticket: &str) -> AppResult<String>;
}
