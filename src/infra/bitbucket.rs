use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::domain::pull_request::{Project, PullRequest, PullRequestSpec, Repository, Workspace};
use crate::error::{AppError, AppResult};
use crate::services::CodeHostService;

const DEFAULT_API_URL: &str = "https://api.bitbucket.org/2.0";

pub struct BitbucketClient {
    http: Client,
    api_url: String,
    user: Option<String>,
    app_password: Option<String>,
}

impl BitbucketClient {
    pub fn new(user: Option<String>, app_password: Option<String>) -> Self {
        Self::with_api_url(DEFAULT_API_URL.to_string(), user, app_password)
    }

    pub fn with_api_url(
        api_url: String,
        user: Option<String>,
        app_password: Option<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            user,
            app_password,
        }
    }

    fn auth(&self) -> AppResult<String> {
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| AppError::CodeHost("BITBUCKET_USER not configured".to_string()))?;
        let password = self.app_password.as_deref().ok_or_else(|| {
            AppError::CodeHost("BITBUCKET_APP_PASSWORD not configured".to_string())
        })?;
        let credentials = format!("{user}:{password}");
        Ok(format!("Basic {}", BASE64_STANDARD.encode(credentials)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let auth = self.auth()?;
        let response = self
            .http
            .get(format!("{}{path}", self.api_url))
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to call Bitbucket: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::CodeHost(format!(
                "Bitbucket responded with {status} for {path}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to parse Bitbucket response: {err}")))
    }
}

#[async_trait]
impl CodeHostService for BitbucketClient {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>> {
        let page: Page<WorkspacePayload> = self.get_json("/workspaces").await?;
        Ok(page.values.into_iter().map(Workspace::from).collect())
    }

    async fn get_workspace(&self, slug: &str) -> AppResult<Workspace> {
        let payload: WorkspacePayload = self.get_json(&format!("/workspaces/{slug}")).await?;
        Ok(payload.into())
    }

    async fn list_projects(&self, workspace: &str) -> AppResult<Vec<Project>> {
        let page: Page<ProjectPayload> = self
            .get_json(&format!("/workspaces/{workspace}/projects"))
            .await?;
        Ok(page.values.into_iter().map(Project::from).collect())
    }

    async fn list_repositories(&self, workspace: &str) -> AppResult<Vec<Repository>> {
        let page: Page<RepositoryPayload> =
            self.get_json(&format!("/repositories/{workspace}")).await?;
        Ok(page.values.into_iter().map(Repository::from).collect())
    }

    async fn get_repository(&self, workspace: &str, slug: &str) -> AppResult<Repository> {
        let payload: RepositoryPayload = self
            .get_json(&format!("/repositories/{workspace}/{slug}"))
            .await?;
        Ok(payload.into())
    }

    async fn create_pull_request(
        &self,
        workspace: &str,
        spec: PullRequestSpec,
    ) -> AppResult<PullRequest> {
        let auth = self.auth()?;
        let title = effective_title(&spec);
        let body = CreatePullRequestBody::new(&title, &spec);

        let response = self
            .http
            .post(format!(
                "{}/repositories/{workspace}/{}/pullrequests",
                self.api_url, spec.repository
            ))
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to call Bitbucket: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::CodeHost(format!(
                "Bitbucket responded with {status}: {body}"
            )));
        }

        let payload: PullRequestPayload = response.json().await.map_err(|err| {
            AppError::CodeHost(format!("failed to parse Bitbucket response: {err}"))
        })?;

        Ok(PullRequest {
            id: payload.id,
            title: payload.title,
            url: payload.links.and_then(|links| links.html).map(|l| l.href),
        })
    }
}

fn effective_title(spec: &PullRequestSpec) -> String {
    spec.title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Merge {} into {}",
                spec.source_branch, spec.destination_branch
            )
        })
}

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
}

#[derive(Deserialize)]
struct WorkspacePayload {
    slug: String,
    name: String,
}

impl From<WorkspacePayload> for Workspace {
    fn from(payload: WorkspacePayload) -> Self {
        Self {
            slug: payload.slug,
            name: payload.name,
        }
    }
}

#[derive(Deserialize)]
struct ProjectPayload {
    key: String,
    name: String,
}

impl From<ProjectPayload> for Project {
    fn from(payload: ProjectPayload) -> Self {
        Self {
            key: payload.key,
            name: payload.name,
        }
    }
}

#[derive(Deserialize)]
struct RepositoryPayload {
    slug: String,
    name: String,
    full_name: String,
}

impl From<RepositoryPayload> for Repository {
    fn from(payload: RepositoryPayload) -> Self {
        Self {
            slug: payload.slug,
            name: payload.name,
            full_name: payload.full_name,
        }
    }
}

#[derive(Deserialize)]
struct PullRequestPayload {
    id: u64,
    title: String,
    links: Option<PullRequestLinks>,
}

#[derive(Deserialize)]
struct PullRequestLinks {
    html: Option<Link>,
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

#[derive(Serialize)]
struct CreatePullRequestBody {
    title: String,
    source: BranchRef,
    destination: BranchRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl CreatePullRequestBody {
    fn new(title: &str, spec: &PullRequestSpec) -> Self {
        Self {
            title: title.to_string(),
            source: BranchRef::named(&spec.source_branch),
            destination: BranchRef::named(&spec.destination_branch),
            description: spec.description.clone(),
        }
    }
}

#[derive(Serialize)]
struct BranchRef {
    branch: NamedBranch,
}

impl BranchRef {
    fn named(name: &str) -> Self {
        Self {
            branch: NamedBranch {
                name: name.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct NamedBranch {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_default_title() {
        let spec = PullRequestSpec {
            repository: "tool".to_string(),
            source_branch: "feature/ABC-1-x".to_string(),
            destination_branch: "main".to_string(),
            title: None,
            description: None,
        };
        assert_eq!(effective_title(&spec), "Merge feature/ABC-1-x into main");

        let titled = PullRequestSpec {
            title: Some("[ABC-1] Do the thing".to_string()),
            ..spec
        };
        assert_eq!(effective_title(&titled), "[ABC-1] Do the thing");
    }

    #[test]
    fn serializes_branch_refs() {
        let spec = PullRequestSpec {
            repository: "tool".to_string(),
            source_branch: "feature/ABC-1-x".to_string(),
            destination_branch: "main".to_string(),
            title: Some("t".to_string()),
            description: None,
        };
        let body = CreatePullRequestBody::new("t", &spec);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["source"]["branch"]["name"], "feature/ABC-1-x");
        assert_eq!(json["destination"]["branch"]["name"], "main");
        assert!(json.get("description").is_none());
    }
}
