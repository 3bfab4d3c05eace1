//! Session aggregate
//!
//! The root of all tutoring state. Only the reducer mutates it; surfaces read
//! it through the accessors.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DocumentRef, Message, Mode, Settings, StudyPlan, Topic};

/// User-facing text when the plan could not be generated
pub const PLAN_FAILURE_TEXT: &str = "Sorry, I couldn't create a study plan from this document. Please try another file.";

/// Closing message used when the celebratory message fails to generate
pub const CLOSING_FALLBACK_TEXT: &str =
    "🎉 You've completed the entire study plan! Amazing job. What would you like to do next?";

/// Coarse lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Upload,
    Personalizing,
    GeneratingPlan,
    Studying,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Upload => "upload",
            Phase::Personalizing => "personalizing",
            Phase::GeneratingPlan => "generating_plan",
            Phase::Studying => "studying",
            Phase::Completed => "completed",
        }
    }

    /// Phases in which a study plan exists
    pub fn has_plan(&self) -> bool {
        matches!(self, Phase::Studying | Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a topic transition opens the plan or continues it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Start,
    Next,
}

impl TransitionKind {
    pub fn mode(&self) -> Mode {
        match self {
            TransitionKind::Start => Mode::StartTopic,
            TransitionKind::Next => Mode::NextTopic,
        }
    }

    /// Locally composed opening used when generation fails
    pub fn fallback(&self, topic: &Topic) -> String {
        match self {
            TransitionKind::Start => format!(
                "Great! Let's start with our first topic: **{}**. The goal here is to {}. Ready to dive in? 😊",
                topic.title, topic.objective
            ),
            TransitionKind::Next => format!(
                "Awesome work! You've completed that topic. 🚀\n\nNow, let's move on to **{}**.",
                topic.title
            ),
        }
    }
}

/// Actions offered once the whole plan is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    ReviewNotes,
    TakeQuiz,
}

impl CompletionAction {
    pub const ALL: [CompletionAction; 2] = [CompletionAction::ReviewNotes, CompletionAction::TakeQuiz];

    pub fn label(&self) -> &'static str {
        match self {
            CompletionAction::ReviewNotes => "Review Notes",
            CompletionAction::TakeQuiz => "Take Quiz",
        }
    }

    pub fn request_text(&self) -> &'static str {
        match self {
            CompletionAction::ReviewNotes => "Summarize the key points of the whole study plan so I can review my notes.",
            CompletionAction::TakeQuiz => "Quiz me on everything we covered in this study plan.",
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            CompletionAction::ReviewNotes => Mode::Summary,
            CompletionAction::TakeQuiz => Mode::Quiz,
        }
    }
}

/// Identity of the state a request was issued against
///
/// A result is applied only while the session id and transcript epoch still
/// match; a reset, a new upload or a topic transition invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub session: Uuid,
    pub transcript_epoch: u64,
}

/// One continuous tutoring interaction from upload to completion
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) id: Uuid,
    pub(super) phase: Phase,
    pub(super) document: Option<DocumentRef>,
    pub(super) settings: Option<Settings>,
    pub(super) plan: StudyPlan,
    pub(super) transcript: Vec<Message>,
    pub(super) current_topic: usize,
    pub(super) error: Option<String>,
    pub(super) loading: bool,
    pub(super) selected_term: Option<String>,
    pub(super) transcript_epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            phase: Phase::Upload,
            document: None,
            settings: None,
            plan: Vec::new(),
            transcript: Vec::new(),
            current_topic: 0,
            error: None,
            loading: false,
            selected_term: None,
            transcript_epoch: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn document(&self) -> Option<&DocumentRef> {
        self.document.as_ref()
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn plan(&self) -> &[Topic] {
        &self.plan
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn current_topic_index(&self) -> usize {
        self.current_topic
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.plan.get(self.current_topic)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected_term(&self) -> Option<&str> {
        self.selected_term.as_deref()
    }

    pub fn transcript_epoch(&self) -> u64 {
        self.transcript_epoch
    }

    /// Tag for a request issued against the current state
    pub fn tag(&self) -> RequestTag {
        RequestTag {
            session: self.id,
            transcript_epoch: self.transcript_epoch,
        }
    }

    pub fn is_current(&self, tag: &RequestTag) -> bool {
        tag.session == self.id && tag.transcript_epoch == self.transcript_epoch
    }

    /// Fraction of completed topics, 0.0 for an empty plan
    pub fn progress(&self) -> f64 {
        if self.plan.is_empty() {
            return 0.0;
        }
        let done = self.plan.iter().filter(|t| t.is_completed()).count();
        done as f64 / self.plan.len() as f64
    }

    /// The latest model message, if it is the last transcript entry
    pub fn last_model_message(&self) -> Option<&Message> {
        self.transcript.last().filter(|m| m.is_model())
    }
}
