//! Domain types for a tutoring session
//!
//! - `DocumentRef`: the uploaded document as an in-memory data URL
//! - `Settings`: personalization choices (language, level, tone, goal)
//! - `Topic` / `Confidence`: the study plan and per-topic progress
//! - `Message`: transcript entries
//! - `Mode` / `FollowUpAction`: the teaching action behind a request

mod document;
mod mode;
mod personalization;
mod plan;
mod transcript;

pub use document::{ACCEPTED_TYPES, DocumentError, DocumentRef, media_type_for_extension};
pub use mode::{FollowUpAction, Mode};
pub use personalization::{Goal, LANGUAGES, Level, Settings, Tone};
pub use plan::{Confidence, StudyPlan, Topic, TopicDraft};
pub use transcript::{Message, Role, format_history};
