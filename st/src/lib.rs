//! StudyTutor - document-driven study tutor
//!
//! A student supplies a document, chooses how they want to learn, and gets a
//! generated study plan. The tutor then walks the plan topic by topic in a
//! conversation, with learning modes (chat, to-do list, quiz, key points,
//! explanations, diagrams), per-topic confidence ratings and a closing message.
//!
//! # Modules
//!
//! - [`markdown`] - Block parser for the tutor's markdown dialect
//! - [`prompts`] - Instruction and request text composition
//! - [`llm`] - Provider clients (Gemini, Anthropic)
//! - [`generation`] - Plan and response generation over an LLM client
//! - [`session`] - Session state machine: reducer, effects, driver
//! - [`tui`] - Interactive terminal surfaces
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod generation;
pub mod llm;
pub mod markdown;
pub mod prompts;
pub mod session;
pub mod tui;

pub use config::{Config, LlmConfig, TutorConfig};
pub use domain::{
    Confidence, DocumentRef, FollowUpAction, Goal, Level, Message, Mode, Role, Settings, Tone, Topic, TopicDraft,
};
pub use error::TutorError;
pub use generation::{GenerationClient, GenerationService};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, create_client};
pub use markdown::{Block, Dialect, DiagramRenderer, OutlineRenderer, parse, render_terminal};
pub use prompts::PromptComposer;
pub use session::{CompletionAction, EffectRunner, Intent, Phase, Session, SessionDriver};
