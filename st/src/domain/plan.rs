//! Study plan and topics

use std::fmt;

use serde::{Deserialize, Serialize};

/// A confidence rating from 1 to 5, recorded when a topic is completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Star rendering used by the plan sidebar, e.g. "★★★☆☆"
    pub fn stars(&self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("confidence must be between 1 and 5, got {}", value))
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// A topic as returned by the generation service, before any progress exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDraft {
    pub title: String,
    pub objective: String,
}

/// One unit of the study plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub objective: String,
    completed: bool,
    confidence: Option<Confidence>,
}

impl Topic {
    pub fn new(title: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            objective: objective.into(),
            completed: false,
            confidence: None,
        }
    }

    /// Mark the topic finished. Completion and confidence are only ever set together.
    pub fn complete(&mut self, confidence: Confidence) {
        self.completed = true;
        self.confidence = Some(confidence);
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }
}

impl From<TopicDraft> for Topic {
    fn from(draft: TopicDraft) -> Self {
        Topic::new(draft.title, draft.objective)
    }
}

/// Ordered topics; order is the teaching sequence and never changes after generation
pub type StudyPlan = Vec<Topic>;
