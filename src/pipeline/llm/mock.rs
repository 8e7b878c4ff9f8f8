use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{LlmClient, LlmError};
use crate::pipeline::types::{Prompt, RawResponse};

/// Deterministic stand-in for a completion backend.
///
/// Returns the configured response (or error) on every call and records
/// each call so tests can assert how many requests a pipeline issued.
pub struct MockLlmClient {
    outcome: Result<String, LlmError>,
    calls: AtomicUsize,
    last_call: Mutex<Option<(String, Prompt)>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Model and prompt of the most recent call.
    pub fn last_call(&self) -> Option<(String, Prompt)> {
        self.last_call.lock().ok().and_then(|guard| guard.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, model: &str, prompt: &Prompt) -> Result<RawResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_call.lock() {
            *guard = Some((model.to_string(), prompt.clone()));
        }
        self.outcome.clone().map(RawResponse::new)
    }
}
