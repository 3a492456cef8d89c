use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use bitlift::config::AppConfig;
use bitlift::context::AppContext;
use bitlift::domain::branch::BranchName;
use bitlift::domain::generation::{GenerationOutcome, SamplingParams};
use bitlift::domain::pull_request::{Project, PullRequest, PullRequestSpec, Repository, Workspace};
use bitlift::error::{AppError, AppResult};
use bitlift::services::{
    CodeHostService, IssueTrackerService, TextGenerationService, VersionControlService,
};
use bitlift::workflow::describe::generate_description;

struct DiffOnlyVcs;

#[async_trait]
impl VersionControlService for DiffOnlyVcs {
    async fn staged_diff(&self) -> AppResult<String> {
        Ok(String::new())
    }

    async fn diff_against(&self, target: &str) -> AppResult<String> {
        Ok(format!("diff against {target}"))
    }

    async fn is_clean(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn commit(&self, _message: &str) -> bool {
        true
    }

    async fn local_branches(&self) -> Vec<String> {
        Vec::new()
    }

    async fn checkout(&self, _branch: &BranchName, _create: bool) -> bool {
        true
    }

    async fn current_branch(&self) -> AppResult<String> {
        Ok("feature/TEST-1-x".to_string())
    }

    async fn pull_latest(&self) -> AppResult<()> {
        Ok(())
    }
}

struct OfflineTracker;

#[async_trait]
impl IssueTrackerService for OfflineTracker {
    async fn issue_summary(&self, _ticket: &str) -> AppResult<String> {
        Err(AppError::IssueTracker("offline".to_string()))
    }
}

struct UnusedCodeHost;

#[async_trait]
impl CodeHostService for UnusedCodeHost {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>> {
        unreachable!("code host is not part of the describe workflow")
    }

    async fn get_workspace(&self, _slug: &str) -> AppResult<Workspace> {
        unreachable!()
    }

    async fn list_projects(&self, _workspace: &str) -> AppResult<Vec<Project>> {
        unreachable!()
    }

    async fn list_repositories(&self, _workspace: &str) -> AppResult<Vec<Repository>> {
        unreachable!()
    }

    async fn get_repository(&self, _workspace: &str, _slug: &str) -> AppResult<Repository> {
        unreachable!()
    }

    async fn create_pull_request(
        &self,
        _workspace: &str,
        _spec: PullRequestSpec,
    ) -> AppResult<PullRequest> {
        unreachable!()
    }
}

/// Records what the workflow handed to `pr_description`.
#[derive(Default)]
struct RecordingGeneration {
    calls: Mutex<Vec<(String, String, Option<String>)>>,
}

#[async_trait]
impl TextGenerationService for RecordingGeneration {
    async fn generate(&self, _prompt: &str, _params: &SamplingParams) -> GenerationOutcome {
        GenerationOutcome::Generated("AI-summary".to_string())
    }

    async fn commit_message(&self, _diff: &str, _ticket: Option<&str>) -> GenerationOutcome {
        GenerationOutcome::Generated("commit".to_string())
    }

    async fn pr_description(
        &self,
        ticket: &str,
        diff: &str,
        template: Option<&str>,
    ) -> GenerationOutcome {
        self.calls.lock().unwrap().push((
            ticket.to_string(),
            diff.to_string(),
            template.map(str::to_string),
        ));
        GenerationOutcome::Generated("a fine description".to_string())
    }
}

fn context(dir: &TempDir, generation: Arc<RecordingGeneration>) -> AppContext {
    let config = AppConfig {
        model_server_url: None,
        model_command: None,
        jira_url: None,
        jira_user: None,
        jira_token: None,
        bitbucket_user: None,
        bitbucket_app_password: None,
        bitbucket_workspace: None,
        config_dir: dir.path().to_path_buf(),
        target_branch: "main".to_string(),
    };
    AppContext::new(
        config,
        Arc::new(DiffOnlyVcs),
        Arc::new(OfflineTracker),
        Arc::new(UnusedCodeHost),
        generation,
    )
}

#[tokio::test]
async fn renders_resolved_fields_into_the_template() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("default_field_config.yaml"),
        "jira_ticket:\n  source: ticket_id\nsummary:\n  source: default\n  value: x\n",
    )
    .unwrap();
    let template_path = dir.path().join("pr_template");
    std::fs::write(&template_path, "# {jira_ticket}\n\n{summary}\n").unwrap();

    let generation = Arc::new(RecordingGeneration::default());
    let ctx = context(&dir, generation.clone());

    let outcome = generate_description(&ctx, "TEST-1", &template_path, "main", false)
        .await
        .unwrap();
    assert_eq!(outcome.text(), "a fine description");

    let calls = generation.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (ticket, diff, template) = &calls[0];
    assert_eq!(ticket, "TEST-1");
    assert_eq!(diff, "diff against main");
    assert_eq!(template.as_deref(), Some("# TEST-1\n\nx\n"));
}

#[tokio::test]
async fn missing_template_falls_back_to_example_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("default_field_config.yaml"), "{}\n").unwrap();
    std::fs::write(dir.path().join("pr_template.example"), "example body\n").unwrap();

    let generation = Arc::new(RecordingGeneration::default());
    let ctx = context(&dir, generation.clone());

    generate_description(&ctx, "TEST-1", &dir.path().join("pr_template"), "main", false)
        .await
        .unwrap();

    let calls = generation.calls.lock().unwrap();
    assert_eq!(calls[0].2.as_deref(), Some("example body\n"));
}

#[tokio::test]
async fn missing_template_entirely_still_generates() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("default_field_config.yaml"), "{}\n").unwrap();

    let generation = Arc::new(RecordingGeneration::default());
    let ctx = context(&dir, generation.clone());

    let outcome = generate_description(
        &ctx,
        "TEST-1",
        &dir.path().join("pr_template"),
        "main",
        false,
    )
    .await
    .unwrap();
    assert_eq!(outcome.text(), "a fine description");

    let calls = generation.calls.lock().unwrap();
    assert_eq!(calls[0].2, None);
}
