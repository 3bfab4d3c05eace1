//! Provider-agnostic request/response types
//!
//! A request is a single user turn made of text and inline binary parts, with an
//! optional JSON schema the response must conform to.

use serde_json::Value;
use tracing::debug;

/// One part of the user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Base64 payload with its media type
    InlineData { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A completion request - everything needed for one call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub parts: Vec<ContentPart>,

    /// JSON schema for structured output; `None` for free text
    pub response_schema: Option<Value>,

    /// Max tokens for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(parts: Vec<ContentPart>, max_tokens: u32) -> Self {
        debug!(part_count = parts.len(), %max_tokens, "CompletionRequest::new: called");
        Self {
            parts,
            response_schema: None,
            max_tokens,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    /// Blocked by the provider's safety filters
    Safety,
    Other(String),
}

impl StopReason {
    /// Parse from Anthropic API stop_reason string
    pub fn from_anthropic(s: &str) -> Self {
        match s {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "refusal" => StopReason::Safety,
            other => StopReason::Other(other.to_string()),
        }
    }

    /// Parse from Gemini finishReason string
    pub fn from_gemini(s: &str) -> Self {
        match s {
            "STOP" => StopReason::EndTurn,
            "MAX_TOKENS" => StopReason::MaxTokens,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => StopReason::Safety,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
