//! Learning modes and follow-up actions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of tutoring action a request represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Chat,
    Todo,
    Quiz,
    Summary,
    Explain,
    ExplainTerm,
    Diagram,
    StartTopic,
    NextTopic,
    FinishPlan,
}

impl Mode {
    /// Modes the student can switch between from the input bar
    pub const SELECTABLE: [Mode; 5] = [Mode::Chat, Mode::Todo, Mode::Quiz, Mode::Summary, Mode::Explain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Todo => "todo",
            Mode::Quiz => "quiz",
            Mode::Summary => "summary",
            Mode::Explain => "explain",
            Mode::ExplainTerm => "explain_term",
            Mode::Diagram => "diagram",
            Mode::StartTopic => "start_topic",
            Mode::NextTopic => "next_topic",
            Mode::FinishPlan => "finish_plan",
        }
    }

    /// Tool label shown in the mode bar
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat Tutor",
            Mode::Todo => "To-Do List",
            Mode::Quiz => "Quiz Me",
            Mode::Summary => "Key Points",
            Mode::Explain => "Explain",
            Mode::ExplainTerm => "Explain Term",
            Mode::Diagram => "Diagram",
            Mode::StartTopic | Mode::NextTopic | Mode::FinishPlan => "",
        }
    }

    /// Input placeholder; internal modes have none
    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Chat => "Ask a follow-up question...",
            Mode::Todo => "What do you need a to-do list for?",
            Mode::Quiz => "What should the quiz for this topic cover?",
            Mode::Summary => "Ask me to summarize this topic...",
            Mode::Explain => "Ask me to explain a concept from this topic...",
            Mode::Diagram => "Describe the diagram you want to create...",
            Mode::ExplainTerm | Mode::StartTopic | Mode::NextTopic | Mode::FinishPlan => "",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Mode; 10] = [
            Mode::Chat,
            Mode::Todo,
            Mode::Quiz,
            Mode::Summary,
            Mode::Explain,
            Mode::ExplainTerm,
            Mode::Diagram,
            Mode::StartTopic,
            Mode::NextTopic,
            Mode::FinishPlan,
        ];
        ALL.iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown mode '{}'", s))
    }
}

/// Canned follow-up requests offered under the latest tutor message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpAction {
    Simplify,
    Example,
    ExplainLike12,
    Summarize,
    Diagram,
    ExplainAgain,
}

impl FollowUpAction {
    /// Actions shown in the follow-up bar, with their key bindings
    pub const BAR: [(char, FollowUpAction); 4] = [
        ('s', FollowUpAction::Simplify),
        ('e', FollowUpAction::Example),
        ('k', FollowUpAction::ExplainLike12),
        ('d', FollowUpAction::Diagram),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FollowUpAction::Simplify => "Simplify",
            FollowUpAction::Example => "Example",
            FollowUpAction::ExplainLike12 => "Explain Simply",
            FollowUpAction::Summarize => "Summarize",
            FollowUpAction::Diagram => "Diagram",
            FollowUpAction::ExplainAgain => "Explain Again",
        }
    }

    pub fn request_text(&self) -> &'static str {
        match self {
            FollowUpAction::Simplify => "Can you simplify that for me, please?",
            FollowUpAction::Example => "Could you give me an example of that?",
            FollowUpAction::ExplainLike12 => "Explain this to me simply, please.",
            FollowUpAction::Summarize => "Can you summarize that in 3 sentences?",
            FollowUpAction::Diagram => "Can you create a diagram for this?",
            FollowUpAction::ExplainAgain => "Can you explain that again in a different way?",
        }
    }

    /// Diagram requests get their own mode; everything else is plain chat
    pub fn mode(&self) -> Mode {
        match self {
            FollowUpAction::Diagram => Mode::Diagram,
            _ => Mode::Chat,
        }
    }
}
