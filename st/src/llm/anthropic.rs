//! Anthropic Claude API client implementation
//!
//! Implements the LlmClient trait for Anthropic's Messages API. Inline document
//! parts become `document` or `image` content blocks; a response schema is
//! passed as an explicit JSON-only instruction since the endpoint has no
//! schema parameter.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::parse_retry_after;
use super::{CompletionRequest, CompletionResponse, ContentPart, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from environment variable or file specified in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model(), "AnthropicClient::from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::MissingApiKey(e.to_string()))?;

        let timeout = config.timeout();
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model().to_string(),
            api_key,
            base_url: config.base_url().to_string(),
            http,
            max_tokens: config.max_tokens(),
            timeout,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> Result<serde_json::Value, LlmError> {
        let mut blocks = request
            .parts
            .iter()
            .map(convert_part)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(schema) = &request.response_schema {
            blocks.push(serde_json::json!({
                "type": "text",
                "text": format!(
                    "Respond ONLY with JSON (no code fences) that conforms to this JSON schema:\n{}",
                    serde_json::to_string_pretty(schema)?
                ),
            }));
        }

        Ok(serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "messages": [{ "role": "user", "content": blocks }],
        }))
    }

    /// Parse the Anthropic API response
    fn parse_response(api_response: AnthropicResponse) -> CompletionResponse {
        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect();

        CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            stop_reason: StopReason::from_anthropic(&api_response.stop_reason),
            usage: TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            },
        }
    }
}

/// Convert a content part to an Anthropic content block
///
/// Plain text documents are decoded and sent as text-sourced documents; PDFs as
/// base64 documents; images as image blocks.
fn convert_part(part: &ContentPart) -> Result<serde_json::Value, LlmError> {
    match part {
        ContentPart::Text(text) => Ok(serde_json::json!({ "type": "text", "text": text })),
        ContentPart::InlineData { mime_type, data } if mime_type.starts_with("text/") => {
            let bytes = BASE64_STANDARD
                .decode(data)
                .map_err(|e| LlmError::InvalidResponse(format!("Undecodable text document: {}", e)))?;
            Ok(serde_json::json!({
                "type": "document",
                "source": {
                    "type": "text",
                    "media_type": "text/plain",
                    "data": String::from_utf8_lossy(&bytes),
                },
            }))
        }
        ContentPart::InlineData { mime_type, data } if mime_type.starts_with("image/") => Ok(serde_json::json!({
            "type": "image",
            "source": { "type": "base64", "media_type": mime_type, "data": data },
        })),
        ContentPart::InlineData { mime_type, data } => Ok(serde_json::json!({
            "type": "document",
            "source": { "type": "base64", "media_type": mime_type, "data": data },
        })),
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.model, parts = request.parts.len(), "AnthropicClient::complete: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&request)?;

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
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

        if status == 429 {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            warn!(?retry_after, "AnthropicClient::complete: rate limited");
            return Err(LlmError::RateLimited { retry_after });
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let api_response: AnthropicResponse = response.json().await?;
        Ok(Self::parse_response(api_response))
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: String,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_tokens: u32) -> AnthropicClient {
        AnthropicClient {
            model: "claude-sonnet-4".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            http: Client::new(),
            max_tokens,
            timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest::new(vec![ContentPart::text("Hello")], 1000);
        let body = client(8192).build_request_body(&request).unwrap();

        assert_eq!(body["model"], "claude-sonnet-4");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Hello");
    }

    #[test]
    fn test_document_blocks_by_media_type() {
        let request = CompletionRequest::new(
            vec![
                ContentPart::inline("text/markdown", BASE64_STANDARD.encode("# Notes")),
                ContentPart::inline("application/pdf", "JVBERi0="),
                ContentPart::inline("image/png", "iVBORw0="),
            ],
            1000,
        );
        let body = client(8192).build_request_body(&request).unwrap();
        let content = &body["messages"][0]["content"];

        assert_eq!(content[0]["type"], "document");
        assert_eq!(content[0]["source"]["type"], "text");
        assert_eq!(content[0]["source"]["data"], "# Notes");

        assert_eq!(content[1]["type"], "document");
        assert_eq!(content[1]["source"]["media_type"], "application/pdf");

        assert_eq!(content[2]["type"], "image");
        assert_eq!(content[2]["source"]["data"], "iVBORw0=");
    }

    #[test]
    fn test_schema_becomes_instruction() {
        let request =
            CompletionRequest::new(vec![ContentPart::text("Plan")], 1000).with_schema(serde_json::json!({"type": "ARRAY"}));
        let body = client(8192).build_request_body(&request).unwrap();
        let last = &body["messages"][0]["content"][1]["text"];
        assert!(last.as_str().unwrap().contains("\"ARRAY\""));
    }

    #[test]
    fn test_max_tokens_capped() {
        let request = CompletionRequest::new(vec![], 5000);
        let body = client(1000).build_request_body(&request).unwrap();
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_parse_response_concatenates_text() {
        let raw = r#"{
            "content": [{"type": "text", "text": "Part one. "}, {"type": "thinking", "thinking": "..."}, {"type": "text", "text": "Part two."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: AnthropicResponse = serde_json::from_str(raw).unwrap();
        let resp = AnthropicClient::parse_response(parsed);
        assert_eq!(resp.content.as_deref(), Some("Part one. Part two."));
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.output_tokens, 5);
    }
}
