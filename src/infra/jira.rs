use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

pub struct JiraClient {
    http: Client,
    base_url: Option<String>,
    user: Option<String>,
    token: Option<String>,
}

impl JiraClient {
    pub fn new(base_url: Option<String>, user: Option<String>, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            user,
            token,
        }
    }

    fn api_details(&self) -> AppResult<(&str, &str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::IssueTracker("JIRA_URL not configured".to_string()))?;
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| AppError::IssueTracker("JIRA_USER not configured".to_string()))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::IssueTracker("JIRA_TOKEN not configured".to_string()))?;
        Ok((base_url, user, token))
    }

    fn auth_header(user: &str, token: &str) -> String {
        let credentials = format!("{user}:{token}");
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }

    fn issue_endpoint(base_url: &str, ticket: &str) -> String {
        format!(
            "{}/rest/api/2/issue/{ticket}?fields=summary",
            base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn issue_summary(&self, ticket: &str) -> AppResult<String> {
        let ticket = ticket.trim();
        if ticket.is_empty() {
            return Err(AppError::IssueTracker(
                "ticket id must not be empty".to_string(),
            ));
        }

        let (base_url, user, token) = self.api_details()?;
        let response = self
            .http
            .get(Self::issue_endpoint(base_url, ticket))
            .header(AUTHORIZATION, Self::auth_header(user, token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "Jira responded with {status} for {ticket}: {body}"
            )));
        }

        let payload: JiraIssueResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
        })?;

        Ok(payload.fields.summary)
    }
}

#[derive(Deserialize)]
struct JiraIssueResponse {
    fields: JiraIssueFields,
}

#[derive(Deserialize)]
struct JiraIssueFields {
    summary: String,
}
