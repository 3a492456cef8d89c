use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::domain::generation::{GenerationOutcome, SamplingParams};
use crate::error::AppResult;
use crate::services::TextGenerationService;

/// Build the model-server router. State is any generation service; the
/// `serve` command passes a gateway built without a remote endpoint so the
/// server never falls back onto itself.
pub fn router(generation: Arc<dyn TextGenerationService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/commit", post(commit))
        .route("/pr", post(pr))
        .with_state(generation)
}

pub async fn serve(
    host: &str,
    port: u16,
    generation: Arc<dyn TextGenerationService>,
) -> AppResult<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("model server listening on {addr}");
    axum::serve(listener, router(generation)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate(
    State(generation): State<Arc<dyn TextGenerationService>>,
    Json(request): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    let params = request.sampling_params();
    let outcome = generation.generate(&request.prompt, &params).await;
    Json(GenerateResponse::from_outcome("text", outcome))
}

async fn commit(
    State(generation): State<Arc<dyn TextGenerationService>>,
    Json(request): Json<CommitRequest>,
) -> Json<GenerateResponse> {
    let outcome = generation
        .commit_message(&request.diff, request.ticket.as_deref())
        .await;
    Json(GenerateResponse::from_outcome("message", outcome))
}

async fn pr(
    State(generation): State<Arc<dyn TextGenerationService>>,
    Json(request): Json<PrRequest>,
) -> Json<GenerateResponse> {
    let outcome = generation
        .pr_description(&request.ticket, &request.diff, request.template.as_deref())
        .await;
    Json(GenerateResponse::from_outcome("description", outcome))
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
    max_new_tokens: Option<u32>,
    do_sample: Option<bool>,
    top_p: Option<f64>,
    temperature: Option<f64>,
}

impl GenerateRequest {
    fn sampling_params(&self) -> SamplingParams {
        let defaults = SamplingParams::default();
        SamplingParams {
            max_new_tokens: self.max_new_tokens.unwrap_or(defaults.max_new_tokens),
            do_sample: self.do_sample.unwrap_or(defaults.do_sample),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        }
    }
}

#[derive(Deserialize)]
struct CommitRequest {
    diff: String,
    ticket: Option<String>,
}

#[derive(Deserialize)]
struct PrRequest {
    ticket: String,
    diff: String,
    template: Option<String>,
}

/// Responses always come back HTTP 200. Failure is signaled by the `error`
/// field next to an empty payload field, never by the status code.
#[derive(Serialize)]
struct GenerateResponse {
    #[serde(flatten)]
    payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GenerateResponse {
    fn from_outcome(field: &str, outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Generated(text) => Self {
                payload: json!({ field: text }),
                error: None,
            },
            GenerationOutcome::Degraded { reason, .. } => Self {
                payload: json!({ field: "" }),
                error: Some(reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct CannedGeneration {
        outcome: GenerationOutcome,
    }

    #[async_trait]
    impl TextGenerationService for CannedGeneration {
        async fn generate(&self, _prompt: &str, _params: &SamplingParams) -> GenerationOutcome {
            self.outcome.clone()
        }

        async fn commit_message(&self, _diff: &str, _ticket: Option<&str>) -> GenerationOutcome {
            self.outcome.clone()
        }

        async fn pr_description(
            &self,
            _ticket: &str,
            _diff: &str,
            _template: Option<&str>,
        ) -> GenerationOutcome {
            self.outcome.clone()
        }
    }

    fn test_router(outcome: GenerationOutcome) -> Router {
        router(Arc::new(CannedGeneration { outcome }))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router(GenerationOutcome::Generated("x".to_string()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn commit_returns_generated_message() {
        let request = Request::builder()
            .method("POST")
            .uri("/commit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"diff":"diff --git a b","ticket":"ABC-1"}"#))
            .unwrap();
        let response = test_router(GenerationOutcome::Generated(
            "[ABC-1] tidy things".to_string(),
        ))
        .oneshot(request)
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "[ABC-1] tidy things");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn degraded_generation_is_http_200_with_error_field() {
        let request = Request::builder()
            .method("POST")
            .uri("/commit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"diff":"diff --git a b"}"#))
            .unwrap();
        let response = test_router(GenerationOutcome::Degraded {
            reason: "no local model configured".to_string(),
            text: "placeholder".to_string(),
        })
        .oneshot(request)
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "");
        assert_eq!(body["error"], "no local model configured");
    }

    #[tokio::test]
    async fn generate_uses_default_sampling_params() {
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"prompt":"hello"}"#))
            .unwrap();
        let response = test_router(GenerationOutcome::Generated("world".to_string()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "world");
    }
}
