use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    pub fn http(provider: Provider, status: reqwest::StatusCode, body: String) -> Self {
        let raw_response_json = serde_json::from_str::<Value>(&body).ok();
        Self {
            provider,
            stage: "http",
            detail: format!("status={status}"),
            raw_output: Some(body),
            raw_response_json,
        }
    }

    pub fn empty_completion(provider: Provider, raw_response_json: Value) -> Self {
        Self {
            provider,
            stage: "completion",
            detail: "model returned no text".to_string(),
            raw_output: None,
            raw_response_json: Some(raw_response_json),
        }
    }

    /// Raw model output for logs, cut to `max_chars`. Prefers the body text over the parsed JSON.
    pub fn raw_excerpt(&self, max_chars: usize) -> Option<String> {
        let raw = match (&self.raw_output, &self.raw_response_json) {
            (Some(text), _) => text.clone(),
            (None, Some(json)) => json.to_string(),
            (None, None) => return None,
        };
        Some(raw.chars().take(max_chars).collect())
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}
