//! Embedded prompts
//!
//! Compiled into the binary from the `.pmt` files under `st/prompts/`.

use tracing::debug;

pub const CHAT: &str = include_str!("../../prompts/chat.pmt");
pub const EXPLAIN_TERM: &str = include_str!("../../prompts/explain_term.pmt");
pub const DIAGRAM: &str = include_str!("../../prompts/diagram.pmt");
pub const START_TOPIC: &str = include_str!("../../prompts/start_topic.pmt");
pub const NEXT_TOPIC: &str = include_str!("../../prompts/next_topic.pmt");
pub const FINISH_PLAN: &str = include_str!("../../prompts/finish_plan.pmt");

/// Task used by every mode without a dedicated template
pub const DEFAULT_TASK: &str = include_str!("../../prompts/default.pmt");

/// Persona & style wrapper around the task block
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Study plan authoring instruction
pub const PLAN: &str = include_str!("../../prompts/plan.pmt");

/// Full text part sent with a tutoring request
pub const REQUEST: &str = include_str!("../../prompts/request.pmt");

/// Every template name the composer registers
pub const NAMES: [&str; 10] = [
    "chat",
    "explain_term",
    "diagram",
    "start_topic",
    "next_topic",
    "finish_plan",
    "default",
    "system",
    "plan",
    "request",
];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let found = match name {
        "chat" => CHAT,
        "explain_term" => EXPLAIN_TERM,
        "diagram" => DIAGRAM,
        "start_topic" => START_TOPIC,
        "next_topic" => NEXT_TOPIC,
        "finish_plan" => FINISH_PLAN,
        "default" => DEFAULT_TASK,
        "system" => SYSTEM,
        "plan" => PLAN,
        "request" => REQUEST,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_is_embedded() {
        for name in NAMES {
            assert!(get_embedded(name).is_some(), "missing embedded template {}", name);
        }
    }

    #[test]
    fn test_diagram_carries_syntax_rules() {
        let diagram = get_embedded("diagram").unwrap();
        assert!(diagram.contains("&quot;"));
        assert!(diagram.contains("enclose the entire text for that node in double quotes"));
        assert!(diagram.contains("```mermaid"));
    }

    #[test]
    fn test_plan_prompt_requests_json_array() {
        let plan = get_embedded("plan").unwrap();
        assert!(plan.contains("AI learning architect"));
        assert!(plan.contains("JSON array"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("quiz").is_none());
    }
}
