//! Tutor error taxonomy
//!
//! These are the conditions the session layer reasons about. Transport-level
//! failures are folded into `GenerationFailed` by the generation client.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by the generation client and the session state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TutorError {
    /// An operation needed an uploaded document and none was present
    #[error("File information is missing.")]
    MissingDocument,

    /// The document payload could not be decoded into the transport shape
    #[error("Invalid document payload: {0}")]
    InvalidDocumentPayload(String),

    /// The service did not produce a usable study plan
    #[error("Could not generate a valid study plan from the document: {0}")]
    PlanGenerationFailed(String),

    /// Any transport or service failure, carrying the underlying message
    #[error("Generation service error: {0}")]
    GenerationFailed(String),

    /// The response did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for TutorError {
    fn from(err: LlmError) -> Self {
        TutorError::GenerationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_becomes_generation_failed() {
        let err: TutorError = LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();

        match err {
            TutorError::GenerationFailed(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("overloaded"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_missing_document_message() {
        assert_eq!(TutorError::MissingDocument.to_string(), "File information is missing.");
    }
}
