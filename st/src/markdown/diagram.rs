//! Diagram hand-off
//!
//! Fenced mermaid sources are passed verbatim to a `DiagramRenderer`. The
//! terminal has no graph renderer, so the default `OutlineRenderer` draws the
//! graph as an indented outline of its edges and node labels.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown in place of a diagram the renderer rejected
pub const DIAGRAM_FAILURE_NOTICE: &str = "Error: Could not render diagram.";

const KNOWN_KINDS: [&str; 13] = [
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "mindmap",
    "timeline",
    "journey",
    "gitGraph",
];

static NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b[A-Za-z0-9_]+\s*(?:\[\[|\[\(|\(\(|\{\{|\[|\(|\{|>)(?:"([^"]*)"|([^\]\)\}]*))(?:\]\]|\)\]|\)\)|\}\}|\]|\)|\})"#,
    )
    .expect("valid node regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("Diagram source is empty")]
    Empty,

    #[error("Unsupported diagram type: {0}")]
    UnsupportedKind(String),
}

/// Turns a diagram description into display lines
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<Vec<String>, DiagramError>;

    /// Render, substituting the failure notice on error
    fn render_or_notice(&self, source: &str) -> Vec<String> {
        match self.render(source) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "DiagramRenderer::render_or_notice: render failed");
                vec![DIAGRAM_FAILURE_NOTICE.to_string()]
            }
        }
    }
}

/// Text outline of a mermaid graph
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineRenderer;

impl OutlineRenderer {
    fn outline_line(line: &str) -> String {
        let labelled = NODE_RE.replace_all(line, "${1}${2}");
        labelled
            .replace("&quot;", "\"")
            .replace("-->", "→")
            .replace("---", "─")
            .replace("-.->", "⇢")
            .replace("==>", "⇒")
    }
}

impl DiagramRenderer for OutlineRenderer {
    fn render(&self, source: &str) -> Result<Vec<String>, DiagramError> {
        debug!(len = source.len(), "OutlineRenderer::render: called");
        let mut lines = source.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with("%%"));

        let header = lines.next().ok_or(DiagramError::Empty)?;
        let kind = header.split_whitespace().next().unwrap_or_default();
        if !KNOWN_KINDS.contains(&kind) {
            return Err(DiagramError::UnsupportedKind(kind.to_string()));
        }

        let mut out = vec![format!("[diagram: {}]", header)];
        out.extend(lines.map(|l| format!("  {}", Self::outline_line(l))));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_of_flowchart() {
        let source = "graph TD\n  A[\"Light (photons)\"] --> B[Chlorophyll]\n  B --> C{ATP}\n";
        let lines = OutlineRenderer.render(source).unwrap();
        assert_eq!(lines[0], "[diagram: graph TD]");
        assert_eq!(lines[1], "  Light (photons) → Chlorophyll");
        assert_eq!(lines[2], "  B → ATP");
    }

    #[test]
    fn test_quote_entities_are_decoded() {
        let lines = OutlineRenderer.render("graph LR\nC[\"say &quot;hi&quot;\"]").unwrap();
        assert_eq!(lines[1], "  say \"hi\"");
    }

    #[test]
    fn test_unknown_kind_fails() {
        let err = OutlineRenderer.render("doodle\nA --> B").unwrap_err();
        assert_eq!(err, DiagramError::UnsupportedKind("doodle".to_string()));
    }

    #[test]
    fn test_failure_notice_substituted() {
        assert_eq!(OutlineRenderer.render_or_notice("   \n"), vec![DIAGRAM_FAILURE_NOTICE.to_string()]);
    }
}
