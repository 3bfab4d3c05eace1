//! Generation Client
//!
//! Two single-shot operations against the generation service: structured
//! study-plan extraction and free-form tutoring responses. The document data
//! URL is decoded here and rejected before any network call if malformed.
//! Every transport failure surfaces as `TutorError::GenerationFailed`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::domain::{DocumentRef, Message, Mode, Settings, Topic, TopicDraft};
use crate::error::TutorError;
use crate::llm::{CompletionRequest, ContentPart, LlmClient, LlmError};
use crate::prompts::PromptComposer;

/// The generation operations the session layer depends on
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Ordered `{title, objective}` topics for the document, never empty
    async fn generate_plan(&self, document: &DocumentRef, settings: &Settings) -> Result<Vec<TopicDraft>, TutorError>;

    /// Raw tutor response text for the new message
    async fn generate_response(
        &self,
        document: &DocumentRef,
        history: &[Message],
        message: &str,
        mode: Mode,
        settings: &Settings,
        topic: Option<&Topic>,
    ) -> Result<String, TutorError>;
}

/// JSON schema the plan response must conform to
pub fn plan_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A short, engaging title for the learning topic or chapter."
                },
                "objective": {
                    "type": "STRING",
                    "description": "A brief, one-sentence learning goal for this topic."
                }
            },
            "required": ["title", "objective"]
        }
    })
}

/// Split a `data:<mime>;base64,<payload>` URL into its inline transport part
///
/// The payload must be present and valid base64.
pub fn document_part(document: &DocumentRef) -> Result<ContentPart, TutorError> {
    debug!(name = %document.name(), "document_part: called");
    let payload = document
        .data_url()
        .split_once(";base64,")
        .map(|(_, payload)| payload.trim())
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| TutorError::InvalidDocumentPayload("Invalid file data URL.".to_string()))?;

    BASE64_STANDARD
        .decode(payload)
        .map_err(|e| TutorError::InvalidDocumentPayload(format!("payload is not valid base64: {}", e)))?;

    Ok(ContentPart::inline(document.media_type(), payload))
}

/// Parse the service's plan response into topic drafts
///
/// Anything but a non-empty JSON array of `{title, objective}` is a failure;
/// no partial plan is ever returned.
pub fn parse_plan(text: &str) -> Result<Vec<TopicDraft>, TutorError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| TutorError::PlanGenerationFailed(format!("response is not JSON: {}", e)))?;

    if !value.is_array() {
        return Err(TutorError::PlanGenerationFailed("Parsed JSON is not an array.".to_string()));
    }

    let drafts: Vec<TopicDraft> = serde_json::from_value(value)
        .map_err(|e| TutorError::PlanGenerationFailed(format!("unexpected topic shape: {}", e)))?;

    if drafts.is_empty() {
        return Err(TutorError::PlanGenerationFailed("the plan contains no topics".to_string()));
    }
    Ok(drafts)
}

/// Generation client backed by an `LlmClient` and the prompt composer
pub struct GenerationClient {
    llm: Arc<dyn LlmClient>,
    composer: Arc<PromptComposer>,
    max_tokens: u32,
}

impl GenerationClient {
    pub fn new(llm: Arc<dyn LlmClient>, composer: Arc<PromptComposer>, max_tokens: u32) -> Self {
        debug!(%max_tokens, "GenerationClient::new: called");
        Self {
            llm,
            composer,
            max_tokens,
        }
    }

    fn log_transport_error(op: &str, err: &LlmError) {
        if err.is_rate_limit() {
            warn!(%op, error = %err, "GenerationClient: rate limited by generation service");
        } else {
            warn!(%op, error = %err, "GenerationClient: generation service call failed");
        }
    }
}

#[async_trait]
impl GenerationService for GenerationClient {
    async fn generate_plan(&self, document: &DocumentRef, settings: &Settings) -> Result<Vec<TopicDraft>, TutorError> {
        debug!(name = %document.name(), language = %settings.language, "GenerationClient::generate_plan: called");
        let file_part = document_part(document)?;
        let instruction = self
            .composer
            .compose_plan_instruction(settings)
            .map_err(|e| TutorError::GenerationFailed(e.to_string()))?;

        let request =
            CompletionRequest::new(vec![ContentPart::text(instruction), file_part], self.max_tokens).with_schema(plan_schema());

        let response = self.llm.complete(request).await.map_err(|e| {
            Self::log_transport_error("generate_plan", &e);
            TutorError::from(e)
        })?;

        let text = response
            .content
            .ok_or_else(|| TutorError::PlanGenerationFailed("the response was empty".to_string()))?;
        let drafts = parse_plan(&text)?;
        info!(topics = drafts.len(), "Study plan generated for {}", document.name());
        Ok(drafts)
    }

    async fn generate_response(
        &self,
        document: &DocumentRef,
        history: &[Message],
        message: &str,
        mode: Mode,
        settings: &Settings,
        topic: Option<&Topic>,
    ) -> Result<String, TutorError> {
        debug!(%mode, history_len = history.len(), has_topic = topic.is_some(), "GenerationClient::generate_response: called");
        let file_part = document_part(document)?;

        let selected_term = (mode == Mode::ExplainTerm).then_some(message);
        let instruction = self
            .composer
            .compose_instruction(mode, settings, topic, selected_term)
            .map_err(|e| TutorError::GenerationFailed(e.to_string()))?;
        let text = self
            .composer
            .compose_request(&instruction, history, message)
            .map_err(|e| TutorError::GenerationFailed(e.to_string()))?;

        let request = CompletionRequest::new(vec![ContentPart::text(text), file_part], self.max_tokens);
        let response = self.llm.complete(request).await.map_err(|e| {
            Self::log_transport_error("generate_response", &e);
            TutorError::from(e)
        })?;

        response
            .content
            .ok_or_else(|| TutorError::MalformedResponse("the response contained no text".to_string()))
    }
}
