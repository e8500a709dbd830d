//! Completion gateway
//!
//! Thin, stateless adapter over the Chat Completions API: given an ordered
//! list of role-tagged messages and a model identifier, return a single text
//! completion or a typed failure. Retries transient failures with
//! exponential backoff; everything else surfaces to the caller.

use crate::{AiNotesConfig, AiNotesError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRY_ATTEMPTS: u32 = 4;
const RETRY_BASE_DELAY_MS: u64 = 200;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_COMPLETION_TOKENS: u32 = 2048;

/// One role-tagged turn on the wire. Roles are the stored vocabulary
/// verbatim: `user`, `assistant`, `system`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the remote completion service.
pub struct CompletionGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CompletionGateway {
    pub fn new(config: &AiNotesConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(15))
            .user_agent(concat!("ai-notes/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Request one completion for the full ordered history. Retries
    /// transient failures up to `MAX_RETRY_ATTEMPTS`.
    pub async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        debug!("Requesting completion: model={}, turns={}", model, messages.len());

        let mut last_err = None;
        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let delay = Self::retry_backoff(attempt);
                warn!(
                    "Completion request failed (attempt {}/{}), retrying in {:?}...",
                    attempt, MAX_RETRY_ATTEMPTS, delay
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_request(messages, model).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    if e.is_retryable() && attempt + 1 < MAX_RETRY_ATTEMPTS {
                        last_err = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AiNotesError::Api("all retry attempts exhausted".to_string())))
    }

    async fn send_request(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: 0.7,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let response = Self::check_response_status(response).await?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiNotesError::Api(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AiNotesError::EmptyResponse)
    }

    /// Exponential backoff with deterministic jitter.
    fn retry_backoff(attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base_ms = RETRY_BASE_DELAY_MS.saturating_mul(exp);
        let jitter = 1.0 + ((attempt as f64 * 0.37).sin() * 0.1);
        Duration::from_millis((base_ms as f64 * jitter) as u64)
    }

    async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = Self::truncate_error_detail(&Self::extract_error_detail(&body), 500);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            if detail.is_empty() {
                return Err(AiNotesError::Auth(format!("{status}")));
            }
            return Err(AiNotesError::Auth(format!("{status}: {detail}")));
        }
        if status.is_server_error() {
            if detail.is_empty() {
                return Err(AiNotesError::Api(format!("retryable API error {status}")));
            }
            return Err(AiNotesError::Api(format!(
                "retryable API error {status}: {detail}"
            )));
        }
        if detail.is_empty() {
            return Err(AiNotesError::Api(format!("API error {status}")));
        }
        Err(AiNotesError::Api(format!("API error {status}: {detail}")))
    }

    fn extract_error_detail(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(msg) = value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                return msg.to_string();
            }
            if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }

        trimmed.to_string()
    }

    fn truncate_error_detail(detail: &str, max_chars: usize) -> String {
        if detail.chars().count() <= max_chars {
            return detail.to_string();
        }

        let mut truncated = detail.chars().take(max_chars).collect::<String>();
        truncated.push_str("... [truncated]");
        truncated
    }

    fn map_reqwest_error(e: reqwest::Error) -> AiNotesError {
        if e.is_timeout() {
            AiNotesError::Network(format!("timeout: {e}"))
        } else if e.is_connect() {
            AiNotesError::Network(format!("connect: {e}"))
        } else {
            AiNotesError::Api(e.to_string())
        }
    }
}
