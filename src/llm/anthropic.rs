//! Anthropic Messages API client implementation
//!
//! Implements the TextGenerator trait with a single blocking request per call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, LlmError, Message, TextGenerator};
use crate::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a client, reading the API key from the environment variable
    /// named in config
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, api_key_env = %config.api_key_env, "from_config: called");
        Self::new(config, config.api_key())
    }

    /// Create a client with an explicit API key
    ///
    /// A missing or blank key fails here rather than on the first call.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        debug!(model = %config.model, has_key = api_key.is_some(), "new: called");
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::Unavailable(format!("{} is not set", config.api_key_env)))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "temperature": self.temperature,
            "system": request.system_prompt,
            "messages": self.convert_messages(&request.messages),
        })
    }

    /// Convert internal Message types to Anthropic API format
    fn convert_messages(&self, messages: &[Message]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role,
                    "content": msg.content,
                })
            })
            .collect()
    }

    /// Pull the text out of an API response
    ///
    /// Concatenates text blocks; whitespace-only content counts as empty.
    fn extract_text(&self, api_response: AnthropicResponse) -> Result<String, LlmError> {
        debug!(block_count = api_response.content.len(), stop_reason = ?api_response.stop_reason, "extract_text: called");
        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("extract_text: no text content");
            return Err(LlmError::Empty);
        }
        Ok(trimmed.to_string())
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(%self.model, %request.max_tokens, "generate: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(url)
            .header("x-api-key", self.api_key.clone())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Network(e)
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "generate: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let text = self.extract_text(api_response)?;
        debug!(chars = text.len(), "generate: received response");
        Ok(text)
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(max_tokens: u32) -> AnthropicClient {
        AnthropicClient {
            model: "claude-3-haiku".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            http: Client::new(),
            max_tokens,
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client(4096);
        let request = CompletionRequest::single("Output JSON only", "Split this", 1000);

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "claude-3-haiku");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["system"], "Output JSON only");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Split this");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_max_tokens_capped() {
        let client = test_client(1000);
        let request = CompletionRequest::single("Test", "x", 5000);

        let body = client.build_request_body(&request);

        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let client = test_client(1000);
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "[1, "},
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "2]"}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(client.extract_text(response).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_extract_text_empty_content() {
        let client = test_client(1000);
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({ "content": [] })).unwrap();
        assert!(matches!(client.extract_text(response), Err(LlmError::Empty)));

        let response: AnthropicResponse =
            serde_json::from_value(serde_json::json!({ "content": [{"type": "text", "text": "  \n"}] })).unwrap();
        assert!(matches!(client.extract_text(response), Err(LlmError::Empty)));
    }

    #[test]
    fn test_new_without_key_is_unavailable() {
        let config = LlmConfig::default();

        for key in [None, Some(String::new()), Some("  ".to_string())] {
            let err = AnthropicClient::new(&config, key).err().unwrap();
            assert!(err.is_unavailable());
            assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        }
    }

    #[test]
    fn test_new_with_key() {
        let config = LlmConfig {
            base_url: "https://example.test/".to_string(),
            ..Default::default()
        };

        let client = AnthropicClient::new(&config, Some(" sk-test \n".to_string())).unwrap();
        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, "https://example.test");
    }
}
