//! Plain terminal rendering for `st render` and headless output

use colored::Colorize;

use super::{Block, DiagramRenderer, ListItem, ListKind, Run};

fn styled_runs(runs: &[Run]) -> String {
    runs.iter()
        .map(|r| match r {
            Run::Bold(t) => t.bold().to_string(),
            Run::Text(t) => t.clone(),
        })
        .collect()
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let columns = std::iter::once(header.len()).chain(rows.iter().map(Vec::len)).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect();
        format!("│ {} │", cells.join(" │ "))
    };

    let mut out = vec![format_row(header).bold().to_string()];
    let divider: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push(format!("├─{}─┤", divider.join("─┼─")));
    out.extend(rows.iter().map(|r| format_row(r)));
    out
}

/// Render blocks as styled terminal text
pub fn render_terminal(blocks: &[Block], diagrams: &dyn DiagramRenderer) -> String {
    let mut out: Vec<String> = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, runs } => {
                let text = super::runs_text(runs);
                let heading = if *level == 1 {
                    text.bright_cyan().bold().to_string()
                } else {
                    text.cyan().bold().to_string()
                };
                out.push(heading);
            }
            Block::Paragraph(runs) => out.push(styled_runs(runs)),
            Block::List { kind, items } => {
                for (n, item) in items.iter().enumerate() {
                    let line = match (kind, item) {
                        (_, ListItem::Check(c)) => {
                            let mark = if c.is_checked() { "[x]" } else { "[ ]" };
                            format!("  {} {}", mark, styled_runs(&c.runs))
                        }
                        (ListKind::Numbered, ListItem::Plain(runs)) => format!("  {}. {}", n + 1, styled_runs(runs)),
                        (ListKind::Bulleted, ListItem::Plain(runs)) => format!("  • {}", styled_runs(runs)),
                        (ListKind::Plain, ListItem::Plain(runs)) => format!("    {}", styled_runs(runs)),
                    };
                    out.push(line);
                }
            }
            Block::Table { header, rows } => out.extend(render_table(header, rows)),
            Block::Rule => out.push("─".repeat(40).dimmed().to_string()),
            Block::Diagram { source } => {
                out.extend(diagrams.render_or_notice(source).into_iter().map(|l| l.yellow().to_string()));
            }
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Dialect, OutlineRenderer, parse};

    #[test]
    fn test_render_terminal_plain_output() {
        colored::control::set_override(false);
        let blocks = parse("# Cells\n* nucleus\n1. read\n* [ ] quiz", Dialect::Chat);
        let text = render_terminal(&blocks, &OutlineRenderer);
        assert_eq!(text, "Cells\n  • nucleus\n  1. read\n  [ ] quiz");
    }

    #[test]
    fn test_render_table_aligns_columns() {
        colored::control::set_override(false);
        let blocks = parse("| Term | Meaning |\n|---|---|\n| ATP | energy |", Dialect::Plan);
        let text = render_terminal(&blocks, &OutlineRenderer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "│ Term │ Meaning │");
        assert_eq!(lines[2], "│ ATP  │ energy  │");
    }

    #[test]
    fn test_bad_diagram_shows_notice() {
        colored::control::set_override(false);
        let blocks = parse("```mermaid\nscribble\n```", Dialect::Chat);
        assert_eq!(render_terminal(&blocks, &OutlineRenderer), crate::markdown::DIAGRAM_FAILURE_NOTICE);
    }
}
