//! Prompt Composer
//!
//! Builds the instruction text sent to the generation service from
//! personalization settings, the current topic and the requested mode.
//!
//! Template loading chain:
//! 1. `<prompts-dir>/{name}.pmt` (configured override)
//! 2. Embedded fallback compiled from `st/prompts/`
//!
//! Templates use Handlebars syntax for variable substitution.

mod composer;
pub mod embedded;
mod styles;

pub use composer::{PromptComposer, PromptError, task_template_name};
pub use styles::{goal_instruction, level_instruction, tone_instruction};
