use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::generation::{GenerationOutcome, SamplingParams};
use crate::error::AppError;
use crate::services::{BackendError, CompletionBackend, TextGenerationService};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Diff text embedded in prompts is cut to this many characters to keep
/// the prompt inside the model context window.
const MAX_DIFF_CHARS: usize = 5000;

const PLACEHOLDER_PROMPT_PREFIX: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteState {
    Unprobed,
    Available,
    Unavailable,
}

/// Text-generation gateway: remote model server first, local backend next,
/// placeholder last. Never returns an error; every failure mode folds into
/// [`GenerationOutcome::Degraded`].
///
/// A remote endpoint that fails its health probe or any later request is
/// latched unavailable for the lifetime of this gateway and never retried.
pub struct ModelGateway {
    http: reqwest::Client,
    remote_url: Option<String>,
    remote_state: Mutex<RemoteState>,
    local: Option<Arc<dyn CompletionBackend>>,
}

impl ModelGateway {
    pub fn new(remote_url: Option<String>, local: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            remote_url: remote_url.filter(|url| !url.trim().is_empty()),
            remote_state: Mutex::new(RemoteState::Unprobed),
            local,
        }
    }

    /// Gateway that never talks to a remote endpoint. Used by the `serve`
    /// path so the model server cannot end up calling itself.
    pub fn local_only(local: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self::new(None, local)
    }

    /// Whether the remote endpoint has been latched unavailable.
    pub async fn remote_marked_unavailable(&self) -> bool {
        *self.remote_state.lock().await == RemoteState::Unavailable
    }

    async fn remote_available(&self) -> bool {
        let Some(url) = self.remote_url.as_deref() else {
            return false;
        };

        let mut state = self.remote_state.lock().await;
        if *state == RemoteState::Unprobed {
            *state = match self.probe_health(url).await {
                Ok(()) => RemoteState::Available,
                Err(reason) => {
                    warn!("model server health check failed: {reason}");
                    RemoteState::Unavailable
                }
            };
        }
        *state == RemoteState::Available
    }

    async fn probe_health(&self, url: &str) -> Result<(), String> {
        let response = self
            .http
            .get(format!("{}/health", url.trim_end_matches('/')))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("health endpoint returned {}", response.status()))
        }
    }

    async fn mark_remote_unavailable(&self) {
        *self.remote_state.lock().await = RemoteState::Unavailable;
    }

    /// POST a generation request and pull `field` out of the JSON body.
    /// The server signals failure via an `error` field with HTTP 200, so an
    /// error field, a missing field, or an empty payload all count as
    /// remote failure.
    async fn remote_call<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        field: &str,
    ) -> Result<String, String> {
        let url = self
            .remote_url
            .as_deref()
            .ok_or_else(|| "no remote endpoint configured".to_string())?;

        let response = self
            .http
            .post(format!("{}{path}", url.trim_end_matches('/')))
            .timeout(GENERATION_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("model server returned {status}"));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| format!("malformed model server response: {err}"))?;

        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            return Err(format!("model server error: {error}"));
        }

        match payload.get(field).and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(format!("model server response missing `{field}`")),
        }
    }

    async fn local_generate(&self, prompt: &str, params: &SamplingParams) -> GenerationOutcome {
        let Some(backend) = &self.local else {
            return degraded("no local model configured", prompt);
        };
        match backend.complete(prompt, params).await {
            Ok(text) if !text.trim().is_empty() => {
                GenerationOutcome::Generated(text.trim().to_string())
            }
            Ok(_) => degraded("local backend returned empty output", prompt),
            Err(err) => {
                warn!("local generation failed: {err}");
                degraded(&err.to_string(), prompt)
            }
        }
    }

    async fn generate_with_fallback<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        field: &str,
        prompt: &str,
        params: &SamplingParams,
    ) -> GenerationOutcome {
        if self.remote_available().await {
            match self.remote_call(path, body, field).await {
                Ok(text) => return GenerationOutcome::Generated(text),
                Err(reason) => {
                    warn!("model server request failed, falling back to local generation: {reason}");
                    self.mark_remote_unavailable().await;
                }
            }
        } else {
            debug!("model server unavailable, using local generation");
        }
        self.local_generate(prompt, params).await
    }
}

#[async_trait]
impl TextGenerationService for ModelGateway {
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> GenerationOutcome {
        let body = RemoteGenerateBody {
            prompt,
            max_new_tokens: params.max_new_tokens,
            do_sample: params.do_sample,
            top_p: params.top_p,
            temperature: params.temperature,
        };
        self.generate_with_fallback("/generate", &body, "text", prompt, params)
            .await
    }

    async fn commit_message(&self, diff: &str, ticket: Option<&str>) -> GenerationOutcome {
        let prompt = commit_prompt(diff, ticket);
        let params = SamplingParams {
            max_new_tokens: 150,
            ..SamplingParams::default()
        };
        let body = RemoteCommitBody { diff, ticket };
        let outcome = self
            .generate_with_fallback("/commit", &body, "message", &prompt, &params)
            .await;

        match ticket {
            Some(ticket) => outcome.map_text(|message| ensure_ticket_prefix(message, ticket)),
            None => outcome,
        }
    }

    async fn pr_description(
        &self,
        ticket: &str,
        diff: &str,
        template: Option<&str>,
    ) -> GenerationOutcome {
        let prompt = pr_prompt(ticket, diff, template);
        let params = SamplingParams {
            max_new_tokens: 150,
            ..SamplingParams::default()
        };
        let body = RemotePrBody {
            ticket,
            diff,
            template,
        };
        self.generate_with_fallback("/pr", &body, "description", &prompt, &params)
            .await
    }
}

#[derive(Serialize)]
struct RemoteGenerateBody<'a> {
    prompt: &'a str,
    max_new_tokens: u32,
    do_sample: bool,
    top_p: f64,
    temperature: f64,
}

#[derive(Serialize)]
struct RemoteCommitBody<'a> {
    diff: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticket: Option<&'a str>,
}

#[derive(Serialize)]
struct RemotePrBody<'a> {
    ticket: &'a str,
    diff: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
}

pub fn commit_prompt(diff: &str, ticket: Option<&str>) -> String {
    let mut prompt = format!(
        "Generate a clear and concise commit message for the following code changes:\n\n{}",
        truncate_chars(diff, MAX_DIFF_CHARS)
    );
    if let Some(ticket) = ticket {
        prompt.push_str(&format!(
            "\n\nInclude the reference to ticket {ticket} in the message."
        ));
    }
    prompt
}

pub fn pr_prompt(ticket: &str, diff: &str, template: Option<&str>) -> String {
    let mut prompt = format!(
        "Summarize the changes for ticket {ticket}:\n\n{}",
        truncate_chars(diff, MAX_DIFF_CHARS)
    );
    if let Some(template) = template {
        prompt.push_str(&format!(
            "\n\nThe description should be in the format of:\n{template}"
        ));
    }
    prompt
}

/// Prefix `[{ticket}] ` unless the model already put it there.
fn ensure_ticket_prefix(message: String, ticket: &str) -> String {
    let tag = format!("[{ticket}]");
    if message.starts_with(&tag) {
        message
    } else {
        format!("{tag} {message}")
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn degraded(reason: &str, prompt: &str) -> GenerationOutcome {
    let prefix = truncate_chars(prompt, PLACEHOLDER_PROMPT_PREFIX);
    GenerationOutcome::Degraded {
        reason: reason.to_string(),
        text: format!("[generation unavailable - placeholder for: {prefix}...]"),
    }
}

/// Local fallback backend: spawns a configured command, writes the prompt
/// to its stdin and reads the completion from stdout.
pub struct LocalProcessBackend {
    program: String,
    args: Vec<String>,
}

impl LocalProcessBackend {
    /// `command` is split on whitespace: first token is the program, the
    /// rest are fixed arguments.
    pub fn from_command(command: &str) -> Result<Self, AppError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            AppError::Configuration("MODEL_COMMAND must not be empty".to_string())
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl CompletionBackend for LocalProcessBackend {
    async fn complete(
        &self,
        prompt: &str,
        _params: &SamplingParams,
    ) -> Result<String, BackendError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                BackendError::Unavailable(format!("failed to spawn {}: {err}", self.program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|err| BackendError::Failed(format!("failed to write prompt: {err}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| BackendError::Failed(err.to_string()))?;

        if !output.status.success() {
            return Err(BackendError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
