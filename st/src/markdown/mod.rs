//! Constrained markdown renderer
//!
//! Converts the small markdown dialect produced by the tutor into typed blocks:
//! headings, paragraphs, lists (bulleted, numbered, checklist containers),
//! pipe tables, horizontal rules and fenced mermaid diagrams. Two dialects share
//! the grammar and differ only in heading depth, trimming and rule support.
//!
//! Parsing is pure and synchronous; rendering targets (terminal text, TUI lines)
//! consume the block list.

mod diagram;
mod inline;
mod parser;
mod terminal;

use serde::Serialize;

pub use diagram::{DIAGRAM_FAILURE_NOTICE, DiagramError, DiagramRenderer, OutlineRenderer};
pub use inline::{Run, parse_inline, runs_text};
pub use parser::parse;
pub use terminal::render_terminal;

/// Which renderer variant is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Tutor messages: `# ` headings, lines taken as-is
    #[default]
    Chat,
    /// Plan display: `### ` headings, `---` rules, lines trimmed
    Plan,
}

impl Dialect {
    pub fn heading_prefix(&self) -> &'static str {
        match self {
            Dialect::Chat => "# ",
            Dialect::Plan => "### ",
        }
    }

    pub fn heading_level(&self) -> u8 {
        match self {
            Dialect::Chat => 1,
            Dialect::Plan => 3,
        }
    }

    pub fn has_rules(&self) -> bool {
        matches!(self, Dialect::Plan)
    }

    pub fn trims_lines(&self) -> bool {
        matches!(self, Dialect::Plan)
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(Dialect::Chat),
            "plan" => Ok(Dialect::Plan),
            _ => Err(format!("Invalid dialect: {}. Valid: chat, plan", s)),
        }
    }
}

/// Container style for a list block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bulleted,
    Numbered,
    /// Unstyled container, used for the closing run of a message holding checklists
    Plain,
}

/// A checklist entry with local toggle state
///
/// The state lives only here; the source text is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub runs: Vec<Run>,
    checked: bool,
}

impl ChecklistItem {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs, checked: false }
    }

    pub fn toggle(&mut self) {
        self.checked = !self.checked;
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ListItem {
    Plain(Vec<Run>),
    Check(ChecklistItem),
}

impl ListItem {
    pub fn runs(&self) -> &[Run] {
        match self {
            ListItem::Plain(runs) => runs,
            ListItem::Check(item) => &item.runs,
        }
    }
}

/// A structural content node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Block {
    Heading { level: u8, runs: Vec<Run> },
    Paragraph(Vec<Run>),
    List { kind: ListKind, items: Vec<ListItem> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Rule,
    Diagram { source: String },
}

impl Block {
    /// Text content with structural markers removed, one entry per visual line
    pub fn plain_lines(&self) -> Vec<String> {
        match self {
            Block::Heading { runs, .. } | Block::Paragraph(runs) => vec![runs_text(runs)],
            Block::List { items, .. } => items.iter().map(|i| runs_text(i.runs())).collect(),
            Block::Table { header, rows } => std::iter::once(header)
                .chain(rows.iter())
                .map(|row| row.iter().map(|c| runs_text(&parse_inline(c))).collect::<Vec<_>>().join(" "))
                .collect(),
            Block::Rule => Vec::new(),
            Block::Diagram { source } => source.lines().map(str::to_string).collect(),
        }
    }
}

/// Flatten blocks back to plain text
pub fn to_plain_text(blocks: &[Block]) -> String {
    blocks.iter().flat_map(Block::plain_lines).collect::<Vec<_>>().join("\n")
}

/// Mutable access to every checklist item, in document order
pub fn checklist_items_mut(blocks: &mut [Block]) -> impl Iterator<Item = &mut ChecklistItem> {
    blocks
        .iter_mut()
        .filter_map(|b| match b {
            Block::List { items, .. } => Some(items.iter_mut()),
            _ => None,
        })
        .flatten()
        .filter_map(|i| match i {
            ListItem::Check(item) => Some(item),
            ListItem::Plain(_) => None,
        })
}

/// Number of checklist items across the blocks
pub fn checklist_count(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|b| match b {
            Block::List { items, .. } => items.iter().filter(|i| matches!(i, ListItem::Check(_))).count(),
            _ => 0,
        })
        .sum()
}
