//! Line-oriented block scanner
//!
//! One pass over the input. Each line is classified by prefix; list and table
//! lines are held in an accumulator which is flushed into a single block when a
//! line of a different kind, a blank line, or the end of input arrives. Lines
//! inside a mermaid fence bypass classification entirely.
//!
//! Container choice for lists is not per run. Runs flushed mid-message keep
//! their bulleted or numbered style, checklist items included. Only the list
//! still open at end of input becomes a plain container, and it does so when
//! any line of the message is a checklist line, even one in an earlier run.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::inline::parse_inline;
use super::{Block, ChecklistItem, Dialect, ListItem, ListKind};

static CHECKLIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\* \[\s?\] ").expect("valid checklist regex"));
static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\. ").expect("valid ordered regex"));
static SEPARATOR_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid separator regex"));

/// What the current run of lines is accumulating into
#[derive(Debug)]
enum Accumulator {
    Idle,
    Unordered(Vec<ListItem>),
    Ordered(Vec<ListItem>),
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Diagram(String),
}

/// Classification of a single line outside a fence
#[derive(Debug)]
enum LineKind<'a> {
    Blank,
    FenceOpen,
    Heading(&'a str),
    Rule,
    Checklist(&'a str),
    Bullet(&'a str),
    Numbered(&'a str),
    TableRow(&'a str),
    Paragraph(&'a str),
}

struct Scanner {
    dialect: Dialect,
    blocks: Vec<Block>,
    acc: Accumulator,
    has_checklist: bool,
}

impl Scanner {
    fn new(dialect: Dialect, has_checklist: bool) -> Self {
        Self {
            dialect,
            blocks: Vec::new(),
            acc: Accumulator::Idle,
            has_checklist,
        }
    }

    fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }
        if line.trim().starts_with("```mermaid") {
            return LineKind::FenceOpen;
        }
        if let Some(rest) = line.strip_prefix(self.dialect.heading_prefix()) {
            return LineKind::Heading(rest);
        }
        if self.dialect.has_rules() && line == "---" {
            return LineKind::Rule;
        }
        if let Some(m) = CHECKLIST_RE.find(line) {
            return LineKind::Checklist(&line[m.end()..]);
        }
        if let Some(rest) = line.strip_prefix("* ") {
            return LineKind::Bullet(rest);
        }
        if let Some(m) = ORDERED_RE.find(line) {
            return LineKind::Numbered(&line[m.end()..]);
        }
        if line.starts_with('|') {
            return LineKind::TableRow(line);
        }
        LineKind::Paragraph(line)
    }

    fn feed(&mut self, raw: &str) {
        if let Accumulator::Diagram(source) = &mut self.acc {
            if raw.trim() == "```" {
                self.flush();
            } else {
                source.push_str(raw);
                source.push('\n');
            }
            return;
        }

        let line = if self.dialect.trims_lines() { raw.trim() } else { raw };

        match self.classify(line) {
            LineKind::Blank => self.flush(),
            LineKind::FenceOpen => {
                self.flush();
                self.acc = Accumulator::Diagram(String::new());
            }
            LineKind::Heading(text) => {
                self.flush();
                self.blocks.push(Block::Heading {
                    level: self.dialect.heading_level(),
                    runs: parse_inline(text),
                });
            }
            LineKind::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            LineKind::Checklist(text) => {
                self.push_unordered(ListItem::Check(ChecklistItem::new(parse_inline(text))));
            }
            LineKind::Bullet(text) => self.push_unordered(ListItem::Plain(parse_inline(text))),
            LineKind::Numbered(text) => {
                if !matches!(self.acc, Accumulator::Ordered(_)) {
                    self.flush();
                    self.acc = Accumulator::Ordered(Vec::new());
                }
                if let Accumulator::Ordered(items) = &mut self.acc {
                    items.push(ListItem::Plain(parse_inline(text)));
                }
            }
            LineKind::TableRow(text) => self.push_table_row(text),
            LineKind::Paragraph(text) => {
                self.flush();
                self.blocks.push(Block::Paragraph(parse_inline(text)));
            }
        }
    }

    fn push_unordered(&mut self, item: ListItem) {
        if !matches!(self.acc, Accumulator::Unordered(_)) {
            self.flush();
            self.acc = Accumulator::Unordered(Vec::new());
        }
        if let Accumulator::Unordered(items) = &mut self.acc {
            items.push(item);
        }
    }

    fn push_table_row(&mut self, line: &str) {
        let cells = split_cells(line);
        match &mut self.acc {
            Accumulator::Table { rows, .. } => {
                if !is_separator(&cells) {
                    rows.push(cells);
                }
            }
            _ => {
                self.flush();
                self.acc = Accumulator::Table {
                    header: cells,
                    rows: Vec::new(),
                };
            }
        }
    }

    fn flush(&mut self) {
        let block = match std::mem::replace(&mut self.acc, Accumulator::Idle) {
            Accumulator::Idle => return,
            Accumulator::Unordered(items) => Block::List {
                kind: ListKind::Bulleted,
                items,
            },
            Accumulator::Ordered(items) => Block::List {
                kind: ListKind::Numbered,
                items,
            },
            Accumulator::Table { header, rows } => Block::Table { header, rows },
            Accumulator::Diagram(source) => Block::Diagram { source },
        };
        trace!(?block, "Scanner::flush: emitted block");
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        match std::mem::replace(&mut self.acc, Accumulator::Idle) {
            Accumulator::Unordered(items) | Accumulator::Ordered(items) if self.has_checklist => {
                self.blocks.push(Block::List {
                    kind: ListKind::Plain,
                    items,
                });
            }
            Accumulator::Diagram(source) => {
                trace!(len = source.len(), "Scanner::finish: dropping unclosed fence");
            }
            acc => {
                self.acc = acc;
                self.flush();
            }
        }
        self.blocks
    }
}

/// Cells between the outer pipes, trimmed
fn split_cells(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts[1..parts.len() - 1].iter().map(|c| c.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    cells.iter().all(|c| SEPARATOR_CELL_RE.is_match(c))
}

/// Parse text in the given dialect into an ordered sequence of blocks
pub fn parse(input: &str, dialect: Dialect) -> Vec<Block> {
    let lines: Vec<&str> = input.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let has_checklist = lines.iter().any(|l| {
        let line = if dialect.trims_lines() { l.trim() } else { l };
        CHECKLIST_RE.is_match(line)
    });

    let mut scanner = Scanner::new(dialect, has_checklist);
    for line in lines {
        scanner.feed(line);
    }
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Run, checklist_count};

    fn text(s: &str) -> Vec<Run> {
        vec![Run::Text(s.to_string())]
    }

    #[test]
    fn test_heading_per_dialect() {
        assert_eq!(
            parse("# Cells", Dialect::Chat),
            vec![Block::Heading {
                level: 1,
                runs: text("Cells")
            }]
        );
        assert_eq!(
            parse("### Week 1", Dialect::Plan),
            vec![Block::Heading {
                level: 3,
                runs: text("Week 1")
            }]
        );
        // the other dialect's heading prefix is just a paragraph
        assert_eq!(parse("### Week 1", Dialect::Chat), vec![Block::Paragraph(text("### Week 1"))]);
    }

    #[test]
    fn test_checklist_items_toggle_independently() {
        let mut blocks = parse("* [ ] Buy milk\n* [ ] Call mom", Dialect::Chat);
        assert_eq!(blocks.len(), 1);

        let Block::List { kind, items } = &mut blocks[0] else {
            panic!("expected list, got {:?}", blocks[0]);
        };
        assert_eq!(*kind, ListKind::Plain);
        assert_eq!(items.len(), 2);

        let (first, second) = items.split_at_mut(1);
        let (ListItem::Check(a), ListItem::Check(b)) = (&mut first[0], &mut second[0]) else {
            panic!("expected checklist items");
        };
        assert_eq!(a.runs, text("Buy milk"));
        assert_eq!(b.runs, text("Call mom"));

        a.toggle();
        assert!(a.is_checked());
        assert!(!b.is_checked());

        b.toggle();
        a.toggle();
        assert!(!a.is_checked());
        assert!(b.is_checked());
    }

    #[test]
    fn test_checklist_without_inner_space() {
        let blocks = parse("* [] Pack bag", Dialect::Chat);
        let Block::List { items, .. } = &blocks[0] else {
            panic!("expected list");
        };
        assert!(matches!(&items[0], ListItem::Check(c) if c.runs == text("Pack bag")));
    }

    #[test]
    fn test_table_drops_divider_row() {
        let blocks = parse("| A | B |\n| - | - |\n| 1 | 2 |", Dialect::Plan);
        assert_eq!(
            blocks,
            vec![Block::Table {
                header: vec!["A".to_string(), "B".to_string()],
                rows: vec![vec!["1".to_string(), "2".to_string()]],
            }]
        );
    }

    #[test]
    fn test_table_with_aligned_divider() {
        let blocks = parse("| Term | Meaning |\n|:---|---:|\n| ATP | energy |", Dialect::Chat);
        let Block::Table { rows, .. } = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_rule_only_in_plan_dialect() {
        assert_eq!(parse("---", Dialect::Plan), vec![Block::Rule]);
        assert_eq!(parse("---", Dialect::Chat), vec![Block::Paragraph(text("---"))]);
    }

    #[test]
    fn test_mermaid_fence_is_opaque() {
        let input = "Here:\n```mermaid\ngraph TD\n* not a list\nA --> B\n```\nDone";
        let blocks = parse(input, Dialect::Chat);
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(text("Here:")),
                Block::Diagram {
                    source: "graph TD\n* not a list\nA --> B\n".to_string()
                },
                Block::Paragraph(text("Done")),
            ]
        );
    }

    #[test]
    fn test_unclosed_fence_is_dropped() {
        let blocks = parse("Look:\n```mermaid\ngraph LR\nA --> B", Dialect::Chat);
        assert_eq!(blocks, vec![Block::Paragraph(text("Look:"))]);
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let blocks = parse("* one\n* two\n\n* three", Dialect::Chat);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::List { kind: ListKind::Bulleted, items } if items.len() == 2));
        assert!(matches!(&blocks[1], Block::List { kind: ListKind::Bulleted, items } if items.len() == 1));
    }

    #[test]
    fn test_list_kind_change_flushes() {
        let blocks = parse("* bullet\n1. first\n2. second\nafter", Dialect::Chat);
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::List { kind: ListKind::Bulleted, .. }));
        assert!(matches!(&blocks[1], Block::List { kind: ListKind::Numbered, items } if items.len() == 2));
        assert_eq!(blocks[2], Block::Paragraph(text("after")));
    }

    fn kinds(blocks: &[Block]) -> Vec<ListKind> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::List { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_mixed_checklist_and_bullets_share_one_run() {
        let input = "* [ ] Read chapter\n* Key idea";
        let blocks = parse(input, Dialect::Chat);
        assert_eq!(blocks.len(), 1);

        let Block::List { kind, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*kind, ListKind::Plain);
        assert!(matches!(items[0], ListItem::Check(_)));
        assert!(matches!(items[1], ListItem::Plain(_)));
    }

    #[test]
    fn test_only_trailing_run_becomes_plain_when_any_checklist_exists() {
        // An earlier checklist run stays bulleted; the last run turns plain
        // because a checklist line appears somewhere in the message.
        assert_eq!(
            kinds(&parse("* [ ] a\n\n* b", Dialect::Chat)),
            [ListKind::Bulleted, ListKind::Plain]
        );
        assert_eq!(
            kinds(&parse("* [ ] Read chapter\n* Key idea\n\n1. Another idea", Dialect::Chat)),
            [ListKind::Bulleted, ListKind::Plain]
        );
    }

    #[test]
    fn test_checklist_run_before_paragraph_stays_bulleted() {
        let blocks = parse("* [ ] Read chapter\nThat is all.", Dialect::Chat);
        assert_eq!(kinds(&blocks), [ListKind::Bulleted]);
        assert_eq!(checklist_count(&blocks), 1);
    }

    #[test]
    fn test_trailing_list_without_checklists_keeps_style() {
        assert_eq!(kinds(&parse("* a\n\n1. b", Dialect::Chat)), [ListKind::Bulleted, ListKind::Numbered]);
    }

    #[test]
    fn test_plan_dialect_trims_lines() {
        let blocks = parse("   ### Overview  \n   * [ ] Skim notes", Dialect::Plan);
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 3,
                runs: text("Overview")
            }
        );
        assert!(matches!(&blocks[1], Block::List { kind: ListKind::Plain, .. }));
    }

    #[test]
    fn test_chat_dialect_keeps_indentation() {
        let blocks = parse("  * indented", Dialect::Chat);
        assert_eq!(blocks, vec![Block::Paragraph(text("  * indented"))]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("", Dialect::Chat).is_empty());
        assert!(parse("\n\n", Dialect::Plan).is_empty());
    }
}
