pub mod mock;
pub mod openai;

pub use mock::*;
pub use openai::*;

use std::sync::Arc;

use thiserror::Error;

use super::types::{Prompt, RawResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Could not connect to the LLM service at {0}")]
    Connection(String),

    #[error("LLM request timed out: {0}")]
    Timeout(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("LLM service rejected the credential (status {status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("LLM service rate limit reached{}: {body}", retry_hint(.retry_after_secs))]
    RateLimited {
        retry_after_secs: Option<u64>,
        body: String,
    },

    #[error("LLM service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Malformed LLM service response: {0}")]
    MalformedServiceResponse(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

/// Text-completion backend abstraction (allows stubbing in tests).
///
/// One call is one completion: a single system message, a single user
/// message, no streaming and no retry.
pub trait LlmClient: Send + Sync {
    fn complete(&self, model: &str, prompt: &Prompt) -> Result<RawResponse, LlmError>;
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn complete(&self, model: &str, prompt: &Prompt) -> Result<RawResponse, LlmError> {
        (**self).complete(model, prompt)
    }
}

impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    fn complete(&self, model: &str, prompt: &Prompt) -> Result<RawResponse, LlmError> {
        (**self).complete(model, prompt)
    }
}
