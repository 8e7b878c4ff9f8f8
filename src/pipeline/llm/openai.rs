use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{LlmClient, LlmError};
use crate::config::{ApiKey, AppConfig};
use crate::pipeline::types::{Prompt, RawResponse};

/// Connection establishment limit. The request itself is only bounded when
/// a request timeout is configured.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest service error body carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    base_url: String,
    api_key: ApiKey,
    client: reqwest::blocking::Client,
    request_timeout: Option<Duration>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: ApiKey,
        request_timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            request_timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            let limit = match self.request_timeout {
                Some(t) => format!("no response within {}s", t.as_secs()),
                None => format!("no connection within {}s", CONNECT_TIMEOUT.as_secs()),
            };
            LlmError::Timeout(limit)
        } else {
            LlmError::Http(e.to_string())
        }
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl LlmClient for OpenAiClient {
    fn complete(&self, model: &str, prompt: &Prompt) -> Result<RawResponse, LlmError> {
        let body = ChatCompletionRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user_content,
                },
            ],
            stream: false,
        };

        tracing::debug!(
            model,
            prompt_chars = prompt.user_content.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = truncate_body(&response.text().unwrap_or_default());

            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication {
                    status: status.as_u16(),
                    body,
                },
                429 => LlmError::RateLimited {
                    retry_after_secs,
                    body,
                },
                code => LlmError::Service { status: code, body },
            });
        }

        let text = response.text().map_err(|e| self.map_send_error(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::MalformedServiceResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedServiceResponse("response had no choices".into()))?
            .message
            .content
            .ok_or_else(|| {
                LlmError::MalformedServiceResponse("first choice had no message content".into())
            })?;

        tracing::debug!(model, response_chars = content.len(), "Chat completion received");

        Ok(RawResponse::new(content))
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{cut}…")
    }
}
