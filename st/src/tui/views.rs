//! TUI views and rendering
//!
//! Drawing only. Views read the session snapshot and the AppState; the one
//! thing they write back is the scroll bound of the last layout.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use tracing::trace;

use super::markdown::block_lines;
use super::state::{AppState, FormField, InteractionMode};
use crate::domain::{ACCEPTED_TYPES, Confidence, FollowUpAction, Mode, Role, Topic};
use crate::markdown::{Dialect, OutlineRenderer, parse};
use crate::session::{CompletionAction, Phase, Session};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const CURRENT: Color = Color::Rgb(255, 215, 0); // Gold
    pub const COMPLETE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const FAILED: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;

    pub const USER: Color = Color::Rgb(0, 255, 127); // Green
    pub const TUTOR: Color = Color::Rgb(100, 149, 237); // Cornflower blue
}

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

fn keybind(key: &str) -> Span<'static> {
    Span::styled(
        key.to_string(),
        Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD),
    )
}

fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}

/// Main render function
pub fn render(state: &mut AppState, session: &Session, frame: &mut Frame) {
    trace!(phase = %session.phase(), "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(session, frame, chunks[0]);

    match session.phase() {
        Phase::Upload => render_upload(state, session, frame, chunks[1]),
        Phase::Personalizing => render_personalize(state, session, frame, chunks[1]),
        Phase::GeneratingPlan => render_generating(state, frame, chunks[1]),
        Phase::Studying | Phase::Completed => render_study(state, session, frame, chunks[1]),
    }

    render_footer(state, session, frame, chunks[2]);

    match &state.interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, frame.area()),
        InteractionMode::Confidence(rating) => render_confidence_dialog(*rating, session, frame, frame.area()),
        InteractionMode::TermInput(term) => render_term_dialog(term, frame, frame.area()),
        InteractionMode::ConfirmReset(selected) => render_confirm_dialog(*selected, frame, frame.area()),
        InteractionMode::Normal | InteractionMode::Input => {}
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Upload => "Upload",
        Phase::Personalizing => "Personalize",
        Phase::GeneratingPlan => "Planning",
        Phase::Studying => "Studying",
        Phase::Completed => "Complete",
    }
}

/// Title, document, phase and plan progress
fn render_header(session: &Session, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let mut spans = vec![
        Span::styled(
            " StudyTutor",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(phase_label(session.phase()), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if let Some(document) = session.document() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(document.name().to_string(), Style::default().fg(colors::DIM)));
    }

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !session.phase().has_plan() {
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(32)])
        .split(inner);
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let done = session.plan().iter().filter(|t| t.is_completed()).count();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(colors::COMPLETE).bg(colors::SELECTED_BG))
        .ratio(session.progress().clamp(0.0, 1.0))
        .label(format!("{}/{} topics", done, session.plan().len()));
    frame.render_widget(gauge, chunks[1]);
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  ⚠ {}", message), Style::default().fg(colors::FAILED)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(colors::DIM)),
    ])
}

/// File input with the accepted types and any upload error
fn render_upload(state: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    trace!("render_upload: called");
    let popup = centered_rect(70, 60, area);
    let extensions: Vec<&str> = ACCEPTED_TYPES.iter().map(|(ext, _)| *ext).collect();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Upload your study material",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("I'll read it and build a personalized study plan, then guide you through it topic by topic."),
        Line::from(Span::styled(
            format!("Accepted: {}", extensions.join(", ")),
            Style::default().fg(colors::DIM),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("File: ", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
            Span::raw(state.upload_path.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
    ];

    if let Some(error) = state.upload_error.as_deref().or(session.error()) {
        lines.push(error_line(error));
    }
    if let Some(document) = session.document() {
        lines.push(Line::from(Span::styled(
            format!("Press Enter with no path to try {} again.", document.name()),
            Style::default().fg(colors::DIM),
        )));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" New Session "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, popup);
}

/// Personalization form
fn render_personalize(state: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    trace!(field = state.form.field, "render_personalize: called");
    let popup = centered_rect(60, 60, area);
    let current = state.form.current_field();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Personalize Your Learning",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("for {}", session.document().map(|d| d.name()).unwrap_or("your document")),
            Style::default().fg(colors::DIM),
        )),
        Line::from(""),
    ];

    for field in FormField::ALL {
        let focused = field == current;
        let base = if focused {
            Style::default().bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let line = if field == FormField::Submit {
            Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!(" {} ", field.label()),
                    if focused {
                        Style::default().fg(Color::Black).bg(colors::COMPLETE).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors::COMPLETE)
                    },
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled(if focused { "▶ " } else { "  " }, Style::default().fg(colors::KEYBIND)),
                Span::styled(format!("{:<10}", field.label()), base),
                Span::styled(" ◀ ", Style::default().fg(colors::DIM)),
                Span::styled(state.form.value_label(field), base.fg(colors::HEADER)),
                Span::styled(" ▶", Style::default().fg(colors::DIM)),
            ])
        };
        lines.push(line);
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Personalize "));
    frame.render_widget(widget, popup);
}

fn render_generating(state: &AppState, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 30, area);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Analyzing Document...", spinner(state.tick)),
            Style::default().fg(colors::CURRENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Building your personalized study plan!"),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(widget, popup);
}

/// Plan sidebar, transcript, follow-ups and input
fn render_study(state: &mut AppState, session: &Session, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(area);

    render_sidebar(state, session, frame, columns[0]);

    let shelf_height = u16::from(follow_ups_visible(session) || session.phase() == Phase::Completed);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(shelf_height),
            Constraint::Length(3),
        ])
        .split(columns[1]);

    render_transcript(state, session, frame, rows[0]);
    render_shelf(session, frame, rows[1]);
    render_input(state, session, frame, rows[2]);
}

fn topic_line(index: usize, topic: &Topic, current: usize, viewed: usize, phase: Phase) -> Line<'static> {
    let (marker, color) = if topic.is_completed() {
        ("✓", colors::COMPLETE)
    } else if index == current && phase == Phase::Studying {
        ("●", colors::CURRENT)
    } else {
        ("○", colors::DIM)
    };

    let mut style = Style::default();
    if index == viewed {
        style = style.bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(format!(" {} ", marker), style.fg(color)),
        Span::styled(format!("{}. {}", index + 1, topic.title), style),
    ];
    if let Some(confidence) = topic.confidence() {
        spans.push(Span::styled(format!(" {}", confidence.stars()), style.fg(colors::CURRENT)));
    }
    Line::from(spans)
}

fn render_sidebar(state: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    trace!(viewed = state.viewed_topic, "render_sidebar: called");
    let block = Block::default().borders(Borders::ALL).title(" Study Plan ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(inner);

    let lines: Vec<Line> = session
        .plan()
        .iter()
        .enumerate()
        .map(|(i, t)| topic_line(i, t, session.current_topic_index(), state.viewed_topic, session.phase()))
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[0]);

    if let Some(topic) = session.plan().get(state.viewed_topic) {
        let source = format!("---\n### {}\n{}", topic.title, topic.objective);
        let detail = block_lines(&parse(&source, Dialect::Plan), &OutlineRenderer, "", None);
        frame.render_widget(Paragraph::new(detail).wrap(Wrap { trim: true }), chunks[1]);
    }
}

/// Wrapped height of the lines at the given width
fn wrapped_height(lines: &[Line], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines.iter().map(|l| l.width().div_ceil(width).max(1)).sum()
}

fn render_transcript(state: &mut AppState, session: &Session, frame: &mut Frame, area: Rect) {
    trace!(messages = session.transcript().len(), "render_transcript: called");
    let title = match (session.phase(), session.current_topic()) {
        (Phase::Completed, _) => " Plan Complete ".to_string(),
        (_, Some(topic)) => format!(" Topic {}: {} ", session.current_topic_index() + 1, topic.title),
        _ => " Tutor ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for (index, message) in session.transcript().iter().enumerate() {
        match message.role {
            Role::User => {
                for (i, text) in message.content.lines().enumerate() {
                    let prefix = if i == 0 { "> " } else { "  " };
                    lines.push(Line::from(vec![
                        Span::styled(prefix, Style::default().fg(colors::USER).add_modifier(Modifier::BOLD)),
                        Span::styled(text.to_string(), Style::default().fg(colors::USER)),
                    ]));
                }
            }
            Role::Model => {
                lines.push(Line::from(vec![
                    Span::styled("Tutor", Style::default().fg(colors::TUTOR).add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", message.timestamp.with_timezone(&chrono::Local).format("%H:%M")),
                        Style::default().fg(colors::DIM),
                    ),
                ]));
                match state.latest.as_ref().filter(|l| l.index() == index) {
                    Some(latest) => {
                        let cursor = (latest.checklist_len() > 0).then_some(latest.checklist_cursor);
                        lines.extend(block_lines(&latest.blocks, &OutlineRenderer, "  ", cursor));
                    }
                    None => {
                        let blocks = parse(&message.content, Dialect::Chat);
                        lines.extend(block_lines(&blocks, &OutlineRenderer, "  ", None));
                    }
                }
            }
        }
        lines.push(Line::from(""));
    }

    if session.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{} Tutor is thinking...", spinner(state.tick)),
            Style::default().fg(colors::DIM),
        )));
    }
    if let Some(error) = session.error() {
        lines.push(error_line(error));
    }

    let total = wrapped_height(&lines, inner.width);
    let max_scroll = u16::try_from(total.saturating_sub(usize::from(inner.height))).unwrap_or(u16::MAX);
    state.max_scroll = max_scroll;
    let offset = max_scroll - state.scroll_back.min(max_scroll);

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((offset, 0));
    frame.render_widget(widget, inner);
}

fn follow_ups_visible(session: &Session) -> bool {
    !session.is_loading() && session.last_model_message().is_some_and(|m| m.mode != Some(Mode::Diagram))
}

/// Follow-up bar or completion actions
fn render_shelf(session: &Session, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let mut spans = vec![Span::raw(" ")];
    if session.phase() == Phase::Completed {
        for (key, action) in [("[r]", CompletionAction::ReviewNotes), ("[Q]", CompletionAction::TakeQuiz)] {
            spans.push(keybind(key));
            spans.push(Span::raw(format!(" {}  ", action.label())));
        }
    } else {
        for (key, action) in FollowUpAction::BAR {
            spans.push(keybind(&format!("[{}]", key)));
            spans.push(Span::raw(format!(" {}  ", action.label())));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn mode_tabs(active: Mode) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for mode in Mode::SELECTABLE {
        let style = if mode == active {
            Style::default().fg(Color::Black).bg(colors::HEADER).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::DIM)
        };
        spans.push(Span::styled(format!(" {} ", mode.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_input(state: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    let typing = state.interaction_mode == InteractionMode::Input;
    let border = if typing { colors::USER } else { colors::DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(mode_tabs(state.active_mode));

    let placeholder = match state.topic_override.and_then(|i| session.plan().get(i)) {
        Some(topic) => format!("Ask about {}...", topic.title),
        None => state.active_mode.placeholder().to_string(),
    };

    let mut spans = vec![Span::styled(
        "> ",
        Style::default().fg(colors::USER).add_modifier(Modifier::BOLD),
    )];
    if state.input.is_empty() && !typing {
        spans.push(Span::styled(placeholder, Style::default().fg(colors::DIM)));
    } else {
        let style = if session.is_loading() {
            Style::default().fg(colors::DIM)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(state.input.clone(), style));
        if typing {
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_footer(state: &AppState, session: &Session, frame: &mut Frame, area: Rect) {
    trace!(?state.interaction_mode, "render_footer: called");
    let keybinds: Vec<(&str, &str)> = match (&state.interaction_mode, session.phase()) {
        (InteractionMode::Input, _) => vec![("[Enter]", "Send"), ("[Tab]", "Mode"), ("[Esc]", "Done")],
        (InteractionMode::Help, _) => vec![("[Esc]", "Close")],
        (InteractionMode::TermInput(_) | InteractionMode::Confidence(_) | InteractionMode::ConfirmReset(_), _) => {
            vec![("[Enter]", "Confirm"), ("[Esc]", "Cancel")]
        }
        (InteractionMode::Normal, Phase::Upload) => vec![("[Enter]", "Load"), ("[Esc]", "Clear"), ("[Ctrl+C]", "Quit")],
        (InteractionMode::Normal, Phase::Personalizing) => {
            vec![("[↑↓]", "Field"), ("[←→]", "Change"), ("[Enter]", "Generate"), ("[Esc]", "Back")]
        }
        (InteractionMode::Normal, Phase::GeneratingPlan) => vec![("[N]", "New Session")],
        (InteractionMode::Normal, Phase::Studying) => vec![
            ("[i]", "Type"),
            ("[Tab]", "Mode"),
            ("[c]", "Complete Topic"),
            ("[t]", "Term"),
            ("[[ ]]", "Browse"),
            ("[v]", "Ask"),
        ],
        (InteractionMode::Normal, Phase::Completed) => vec![("[i]", "Type"), ("[Tab]", "Mode"), ("[N]", "New Session")],
    };

    let mut left_spans = vec![Span::raw(" ")];
    for (key, action) in keybinds {
        left_spans.push(keybind(key));
        left_spans.push(Span::raw(format!(" {} ", action)));
    }

    let right_line = Line::from(vec![keybind("[?]"), Span::raw(" Help "), keybind("[q]"), Span::raw(" Quit ")]);

    let footer_block = Block::default().borders(Borders::ALL);
    let inner = footer_block.inner(area);
    frame.render_widget(footer_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_line.width() as u16)])
        .split(inner);

    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(right_line), chunks[1]);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )),
        Line::from(""),
        section("Global"),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
        key_line("Ctrl+C", "Quit from anywhere"),
        key_line("N", "New session"),
        key_line("Esc", "Dismiss error / clear selected term"),
        Line::from(""),
        section("Studying"),
        key_line("i / Enter", "Type a message"),
        key_line("Tab", "Switch learning mode"),
        key_line("c", "Complete topic and rate confidence"),
        key_line("t", "Explain a term (Tab cycles bold terms)"),
        key_line("[ / ]", "Browse plan topics"),
        key_line("v", "Ask about the browsed topic"),
        key_line("↑ ↓ PgUp PgDn", "Scroll transcript"),
        key_line(", / .", "Move checklist cursor"),
        key_line("Space", "Tick checklist item"),
        Line::from(""),
        section("Follow-ups"),
        key_line("s e k d", "Simplify, example, explain simply, diagram"),
        key_line("u / a", "Summarize / explain again"),
        Line::from(""),
        section("Plan complete"),
        key_line("r", "Review notes"),
        key_line("Q", "Take the final quiz"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<14}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

fn render_confidence_dialog(rating: u8, session: &Session, frame: &mut Frame, area: Rect) {
    trace!(rating, "render_confidence_dialog: called");
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let title = session.current_topic().map(|t| t.title.as_str()).unwrap_or("this topic");
    let stars = Confidence::new(rating).map(|c| c.stars()).unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(format!("How confident do you feel about {}?", title)),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}  {}/{}", stars, rating, Confidence::MAX),
            Style::default().fg(colors::CURRENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "←→: adjust  1-5: rate  Enter: confirm  Esc: cancel",
            Style::default().fg(colors::DIM),
        )),
    ];

    let dialog = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Topic Complete ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(dialog, popup_area);
}

fn render_term_dialog(term: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Term: ", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
            Span::raw(term.to_string()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: next highlighted term  Enter: explain  Esc: cancel",
            Style::default().fg(colors::DIM),
        )),
    ];

    let dialog = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Explain a Term ")
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(dialog, popup_area);
}

fn render_confirm_dialog(selected: bool, frame: &mut Frame, area: Rect) {
    trace!("render_confirm_dialog: called");
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let yes_style = if selected {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let no_style = if !selected {
        Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };

    let content = vec![
        Line::from(""),
        Line::from("Start a new session? The current plan and conversation will be discarded."),
        Line::from(""),
        Line::from(vec![
            Span::styled(" No ", no_style),
            Span::raw("    "),
            Span::styled(" Yes ", yes_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab/←→: switch  Enter: confirm  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let dialog = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(dialog, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
