//! Transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Mode;

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Turn label used when serializing history for the generation service
    pub fn turn_label(&self) -> &'static str {
        match self {
            Role::User => "Student",
            Role::Model => "Tutor",
        }
    }
}

/// One entry of the conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Teaching action that produced this entry, if any
    pub mode: Option<Mode>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            mode: None,
            timestamp: Utc::now(),
        }
    }

    pub fn model(content: impl Into<String>, mode: Option<Mode>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            mode,
            timestamp: Utc::now(),
        }
    }

    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }
}

/// Render history as labelled turns, one per line
pub fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("**{}:** {}", m.role.turn_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_history_labels_turns() {
        let history = vec![Message::user("What is ATP?"), Message::model("An energy carrier.", Some(Mode::Chat))];
        assert_eq!(
            format_history(&history),
            "**Student:** What is ATP?\n**Tutor:** An energy carrier."
        );
    }

    #[test]
    fn test_format_empty_history() {
        assert_eq!(format_history(&[]), "");
    }
}
