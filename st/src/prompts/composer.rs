//! Prompt Composer
//!
//! Layers a persona/style block (language, tone, level, goal directives) over
//! a mode-specific task block. Each named template comes from
//! `<prompts-dir>/<name>.pmt` when present and from the embedded defaults
//! otherwise. Templates are compiled once at construction.
//!
//! Substitution is a single handlebars pass with escaping disabled: values are
//! inserted verbatim and never re-scanned for placeholders.

use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use super::embedded;
use super::styles::{goal_instruction, level_instruction, tone_instruction};
use crate::domain::{Message, Mode, Settings, Topic, format_history};

/// Failure while rendering a compiled template
#[derive(Debug, Error)]
#[error("Failed to render prompt template {name}: {message}")]
pub struct PromptError {
    pub name: String,
    pub message: String,
}

/// Placeholder values for a task template
#[derive(Debug, Serialize)]
struct TaskContext<'a> {
    current_topic_title: &'a str,
    current_topic_objective: &'a str,
    selected_term: &'a str,
    language: &'a str,
}

#[derive(Debug, Serialize)]
struct SystemContext<'a> {
    language: &'a str,
    tone_instruction: &'a str,
    level_instruction: &'a str,
    goal_instruction: &'a str,
    task: &'a str,
}

#[derive(Debug, Serialize)]
struct PlanContext<'a> {
    language: &'a str,
    level: &'a str,
    goal: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestContext<'a> {
    system: &'a str,
    history: &'a str,
    message: &'a str,
}

/// Template name holding the task block for a mode
pub fn task_template_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Chat => "chat",
        Mode::ExplainTerm => "explain_term",
        Mode::Diagram => "diagram",
        Mode::StartTopic => "start_topic",
        Mode::NextTopic => "next_topic",
        Mode::FinishPlan => "finish_plan",
        Mode::Todo | Mode::Quiz | Mode::Summary | Mode::Explain => "default",
    }
}

/// Builds every instruction payload sent to the generation service
pub struct PromptComposer {
    hbs: Handlebars<'static>,
}

impl PromptComposer {
    /// Compile templates, preferring `.pmt` overrides from `prompts_dir`
    pub fn new(prompts_dir: Option<&Path>) -> Result<Self> {
        debug!(?prompts_dir, "PromptComposer::new: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);

        for name in embedded::NAMES {
            let (source, origin) = match Self::override_path(prompts_dir, name) {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read prompt override {}", path.display()))?;
                    (content, path.display().to_string())
                }
                None => {
                    let content = embedded::get_embedded(name).ok_or_else(|| eyre!("Prompt template not found: {}", name))?;
                    (content.to_string(), "embedded".to_string())
                }
            };
            debug!(%name, %origin, "PromptComposer::new: registering template");
            hbs.register_template_string(name, source)
                .with_context(|| format!("Invalid prompt template {} ({})", name, origin))?;
        }

        if let Some(dir) = prompts_dir {
            info!("Prompt templates loaded with overrides from {}", dir.display());
        }
        Ok(Self { hbs })
    }

    /// Composer using only the embedded templates
    pub fn embedded_only() -> Self {
        debug!("PromptComposer::embedded_only: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        for name in embedded::NAMES {
            let Some(source) = embedded::get_embedded(name) else {
                continue;
            };
            if let Err(e) = hbs.register_template_string(name, source) {
                error!(%name, error = %e, "PromptComposer::embedded_only: embedded template failed to compile");
            }
        }
        Self { hbs }
    }

    fn override_path(prompts_dir: Option<&Path>, name: &str) -> Option<PathBuf> {
        let path = prompts_dir?.join(format!("{}.pmt", name));
        path.is_file().then_some(path)
    }

    fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, PromptError> {
        self.hbs.render(name, context).map_err(|e| PromptError {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// `(mode, settings, topic?, selected term?) -> instruction text`
    ///
    /// Deterministic for identical inputs.
    pub fn compose_instruction(
        &self,
        mode: Mode,
        settings: &Settings,
        topic: Option<&Topic>,
        selected_term: Option<&str>,
    ) -> Result<String, PromptError> {
        debug!(%mode, has_topic = topic.is_some(), has_term = selected_term.is_some(), "PromptComposer::compose_instruction: called");
        let task_ctx = TaskContext {
            current_topic_title: topic.map(|t| t.title.as_str()).unwrap_or_default(),
            current_topic_objective: topic.map(|t| t.objective.as_str()).unwrap_or_default(),
            selected_term: selected_term.unwrap_or_default(),
            language: &settings.language,
        };
        let task = self.render(task_template_name(mode), &task_ctx)?;

        let system_ctx = SystemContext {
            language: &settings.language,
            tone_instruction: tone_instruction(settings.tone),
            level_instruction: level_instruction(settings.level),
            goal_instruction: goal_instruction(settings.goal),
            task: task.trim_end(),
        };
        self.render("system", &system_ctx)
    }

    /// Instruction asking the service to author a study plan
    pub fn compose_plan_instruction(&self, settings: &Settings) -> Result<String, PromptError> {
        debug!(language = %settings.language, "PromptComposer::compose_plan_instruction: called");
        let ctx = PlanContext {
            language: &settings.language,
            level: settings.level.label(),
            goal: settings.goal.label(),
        };
        self.render("plan", &ctx)
    }

    /// Text part of a tutoring request: instruction, labelled history, new message
    pub fn compose_request(&self, instruction: &str, history: &[Message], message: &str) -> Result<String, PromptError> {
        debug!(history_len = history.len(), "PromptComposer::compose_request: called");
        let history = format_history(history);
        let ctx = RequestContext {
            system: instruction,
            history: &history,
            message,
        };
        self.render("request", &ctx)
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::embedded_only()
    }
}
