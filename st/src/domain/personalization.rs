//! Personalization Settings
//!
//! Four independent choices made once per session before the plan is
//! generated. The enumerated choices serialize to their display labels so the
//! same strings appear in config files, CLI flags and prompts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Teaching languages offered by the personalization form
pub const LANGUAGES: [&str; 5] = ["English", "Spanish", "French", "German", "Japanese"];

/// Proficiency level of the student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn label(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

/// Persona the tutor adopts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    Strict,
    #[default]
    Friendly,
    #[serde(rename = "Fast & Focused")]
    FastAndFocused,
    Encouraging,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Strict, Tone::Friendly, Tone::FastAndFocused, Tone::Encouraging];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Strict => "Strict",
            Tone::Friendly => "Friendly",
            Tone::FastAndFocused => "Fast & Focused",
            Tone::Encouraging => "Encouraging",
        }
    }
}

/// What the student wants out of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "Exam Prep")]
    ExamPrep,
    #[default]
    #[serde(rename = "Deep Understanding")]
    DeepUnderstanding,
    #[serde(rename = "Study Notes")]
    StudyNotes,
    #[serde(rename = "Quick Revision")]
    QuickRevision,
}

impl Goal {
    pub const ALL: [Goal; 4] = [Goal::ExamPrep, Goal::DeepUnderstanding, Goal::StudyNotes, Goal::QuickRevision];

    pub fn label(&self) -> &'static str {
        match self {
            Goal::ExamPrep => "Exam Prep",
            Goal::DeepUnderstanding => "Deep Understanding",
            Goal::StudyNotes => "Study Notes",
            Goal::QuickRevision => "Quick Revision",
        }
    }
}

macro_rules! label_conversions {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let valid: Vec<&str> = $ty::ALL.iter().map(|v| v.label()).collect();
                        format!("Invalid {} '{}'. Valid: {}", $what, s, valid.join(", "))
                    })
            }
        }
    };
}

label_conversions!(Level, "level");
label_conversions!(Tone, "tone");
label_conversions!(Goal, "goal");

/// The complete set of personalization choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: String,
    pub level: Level,
    pub tone: Tone,
    pub goal: Goal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            level: Level::default(),
            tone: Tone::default(),
            goal: Goal::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_preselection() {
        let settings = Settings::default();
        assert_eq!(settings.language, "English");
        assert_eq!(settings.level, Level::Intermediate);
        assert_eq!(settings.tone, Tone::Friendly);
        assert_eq!(settings.goal, Goal::DeepUnderstanding);
    }

    #[test]
    fn test_parse_labels_case_insensitively() {
        assert_eq!("fast & focused".parse::<Tone>().unwrap(), Tone::FastAndFocused);
        assert_eq!("Exam Prep".parse::<Goal>().unwrap(), Goal::ExamPrep);
        assert_eq!(" advanced ".parse::<Level>().unwrap(), Level::Advanced);
    }

    #[test]
    fn test_parse_rejects_unknown_label() {
        let err = "Grumpy".parse::<Tone>().unwrap_err();
        assert!(err.contains("Invalid tone"));
        assert!(err.contains("Fast & Focused"));
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let yaml = "language: French\nlevel: Beginner\ntone: Fast & Focused\ngoal: Quick Revision\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.language, "French");
        assert_eq!(settings.tone, Tone::FastAndFocused);
        assert_eq!(settings.goal, Goal::QuickRevision);

        let json = serde_json::to_string(&settings.goal).unwrap();
        assert_eq!(json, "\"Quick Revision\"");
    }
}
