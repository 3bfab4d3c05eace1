//! Markdown blocks as ratatui lines

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::markdown::{Block, DiagramRenderer, ListItem, ListKind, Run, parse_inline};

const HEADING: Color = Color::Rgb(0, 255, 255);
const CHECKED: Color = Color::Rgb(50, 205, 50);
const DIAGRAM: Color = Color::Rgb(255, 215, 0);
const RULE: Color = Color::DarkGray;

fn spans(runs: &[Run], base: Style) -> Vec<Span<'static>> {
    runs.iter()
        .map(|run| match run {
            Run::Bold(text) => Span::styled(text.clone(), base.add_modifier(Modifier::BOLD)),
            Run::Text(text) => Span::styled(text.clone(), base),
        })
        .collect()
}

fn indented(indent: &str, mut body: Vec<Span<'static>>) -> Line<'static> {
    body.insert(0, Span::raw(indent.to_string()));
    Line::from(body)
}

fn table_lines(header: &[String], rows: &[Vec<String>], indent: &str) -> Vec<Line<'static>> {
    let columns = std::iter::once(header.len()).chain(rows.iter().map(Vec::len)).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(crate::markdown::runs_text(&parse_inline(cell)).chars().count());
        }
    }

    let row_line = |row: &[String], style: Style| {
        let mut body = vec![Span::styled("│ ", Style::default().fg(RULE))];
        for (i, width) in widths.iter().enumerate() {
            let runs = row.get(i).map(|c| parse_inline(c)).unwrap_or_default();
            let len = crate::markdown::runs_text(&runs).chars().count();
            body.extend(spans(&runs, style));
            body.push(Span::raw(" ".repeat(width.saturating_sub(len))));
            body.push(Span::styled(" │ ", Style::default().fg(RULE)));
        }
        indented(indent, body)
    };

    let mut lines = vec![row_line(header, Style::default().add_modifier(Modifier::BOLD))];
    let divider: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    lines.push(indented(
        indent,
        vec![Span::styled(format!("├─{}─┤", divider.join("─┼─")), Style::default().fg(RULE))],
    ));
    lines.extend(rows.iter().map(|r| row_line(r, Style::default())));
    lines
}

/// Lay out blocks as display lines
///
/// `cursor` highlights one checklist item, counted across all blocks in
/// document order.
pub fn block_lines(
    blocks: &[Block],
    diagrams: &dyn DiagramRenderer,
    indent: &str,
    cursor: Option<usize>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut check_index = 0usize;

    for block in blocks {
        match block {
            Block::Heading { level, runs } => {
                let mut style = Style::default().fg(HEADING).add_modifier(Modifier::BOLD);
                if *level == 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                lines.push(indented(indent, spans(runs, style)));
            }
            Block::Paragraph(runs) => lines.push(indented(indent, spans(runs, Style::default()))),
            Block::List { kind, items } => {
                for (n, item) in items.iter().enumerate() {
                    let line = match (kind, item) {
                        (_, ListItem::Check(check)) => {
                            let highlighted = cursor == Some(check_index);
                            check_index += 1;
                            let (mark, style) = if check.is_checked() {
                                (
                                    "[x] ",
                                    Style::default().fg(CHECKED).add_modifier(Modifier::CROSSED_OUT),
                                )
                            } else {
                                ("[ ] ", Style::default())
                            };
                            let mark_style = if highlighted {
                                Style::default().add_modifier(Modifier::REVERSED)
                            } else {
                                Style::default().fg(CHECKED)
                            };
                            let mut body = vec![Span::raw("  "), Span::styled(mark, mark_style)];
                            body.extend(spans(&check.runs, style));
                            indented(indent, body)
                        }
                        (ListKind::Numbered, ListItem::Plain(runs)) => {
                            let mut body = vec![Span::raw(format!("  {}. ", n + 1))];
                            body.extend(spans(runs, Style::default()));
                            indented(indent, body)
                        }
                        (ListKind::Bulleted, ListItem::Plain(runs)) => {
                            let mut body = vec![Span::raw("  • ")];
                            body.extend(spans(runs, Style::default()));
                            indented(indent, body)
                        }
                        (ListKind::Plain, ListItem::Plain(runs)) => {
                            let mut body = vec![Span::raw("    ")];
                            body.extend(spans(runs, Style::default()));
                            indented(indent, body)
                        }
                    };
                    lines.push(line);
                }
            }
            Block::Table { header, rows } => lines.extend(table_lines(header, rows, indent)),
            Block::Rule => lines.push(indented(indent, vec![Span::styled("─".repeat(40), Style::default().fg(RULE))])),
            Block::Diagram { source } => {
                for text in diagrams.render_or_notice(source) {
                    lines.push(indented(indent, vec![Span::styled(text, Style::default().fg(DIAGRAM))]));
                }
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{DIAGRAM_FAILURE_NOTICE, Dialect, OutlineRenderer, parse};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_heading_and_bold_styles() {
        let blocks = parse("# Cells\nThe **nucleus** holds DNA.", Dialect::Chat);
        let lines = block_lines(&blocks, &OutlineRenderer, "", None);
        assert_eq!(text(&lines[0]), "Cells");
        assert!(lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));

        let bold = lines[1].spans.iter().find(|s| s.content == "nucleus").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_checklist_marks_and_cursor() {
        let mut blocks = parse("* [ ] Read\n* [ ] Write", Dialect::Chat);
        crate::markdown::checklist_items_mut(&mut blocks).next().unwrap().toggle();

        let lines = block_lines(&blocks, &OutlineRenderer, "", Some(1));
        assert_eq!(text(&lines[0]), "  [x] Read");
        assert_eq!(text(&lines[1]), "  [ ] Write");
        assert!(lines[1].spans[2].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_table_columns_align() {
        let blocks = parse("| Term | Meaning |\n|---|---|\n| ATP | energy |", Dialect::Chat);
        let lines = block_lines(&blocks, &OutlineRenderer, "", None);
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]).chars().count(), text(&lines[2]).chars().count());
    }

    #[test]
    fn test_bad_diagram_shows_notice() {
        let blocks = parse("```mermaid\nnot a diagram\n```", Dialect::Chat);
        let lines = block_lines(&blocks, &OutlineRenderer, "  ", None);
        assert_eq!(text(&lines[0]), format!("  {}", DIAGRAM_FAILURE_NOTICE));
    }
}
