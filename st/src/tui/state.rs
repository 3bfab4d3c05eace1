//! TUI application state
//!
//! Pure data structures for the surfaces. Session data lives in the
//! `Session`; this holds only what the terminal needs on top of it (input
//! buffers, cursors, overlays).

use std::path::PathBuf;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Goal, LANGUAGES, Level, Message, Mode, Settings, Tone};
use crate::markdown::{Block, Dialect, ListItem, Run, checklist_count, checklist_items_mut, parse};
use crate::session::{Intent, Session};

/// Work queued by key handling for the runner to carry out
#[derive(Debug)]
pub enum PendingAction {
    /// Feed an intent to the session driver
    Dispatch(Intent),
    /// Read a document from disk, then upload it
    LoadDocument(PathBuf),
}

/// Which key handler is active
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Keys are commands
    #[default]
    Normal,
    /// Typing into the message input
    Input,
    /// Typing the term to explain
    TermInput(String),
    /// Confidence rating modal with the highlighted rating
    Confidence(u8),
    /// Confirm starting a new session; true when "Yes" is highlighted
    ConfirmReset(bool),
    Help,
}

/// Personalization form fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Language,
    Level,
    Tone,
    Goal,
    Submit,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Language,
        FormField::Level,
        FormField::Tone,
        FormField::Goal,
        FormField::Submit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Language => "Language",
            FormField::Level => "Level",
            FormField::Tone => "Tone",
            FormField::Goal => "Goal",
            FormField::Submit => "Generate My Study Plan",
        }
    }
}

/// Cycle through a fixed option list
fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}

/// The personalization form
#[derive(Debug, Clone)]
pub struct PersonalizationForm {
    pub field: usize,
    pub languages: Vec<String>,
    pub language: usize,
    pub level: Level,
    pub tone: Tone,
    pub goal: Goal,
}

impl PersonalizationForm {
    /// Form preselected from configured defaults
    ///
    /// A configured language outside the offered list is added to it.
    pub fn new(defaults: &Settings) -> Self {
        debug!(language = %defaults.language, "PersonalizationForm::new: called");
        let mut languages: Vec<String> = LANGUAGES.iter().map(|l| l.to_string()).collect();
        let language = match languages.iter().position(|l| l.eq_ignore_ascii_case(&defaults.language)) {
            Some(idx) => idx,
            None => {
                languages.insert(0, defaults.language.clone());
                0
            }
        };
        Self {
            field: 0,
            languages,
            language,
            level: defaults.level,
            tone: defaults.tone,
            goal: defaults.goal,
        }
    }

    pub fn current_field(&self) -> FormField {
        FormField::ALL[self.field.min(FormField::ALL.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.field = (self.field + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    /// Change the value of the focused field
    pub fn cycle_value(&mut self, forward: bool) {
        match self.current_field() {
            FormField::Language => {
                let len = self.languages.len();
                self.language = if forward {
                    (self.language + 1) % len
                } else {
                    (self.language + len - 1) % len
                };
            }
            FormField::Level => self.level = cycle(&Level::ALL, self.level, forward),
            FormField::Tone => self.tone = cycle(&Tone::ALL, self.tone, forward),
            FormField::Goal => self.goal = cycle(&Goal::ALL, self.goal, forward),
            FormField::Submit => {}
        }
    }

    pub fn value_label(&self, field: FormField) -> String {
        match field {
            FormField::Language => self.languages.get(self.language).cloned().unwrap_or_default(),
            FormField::Level => self.level.label().to_string(),
            FormField::Tone => self.tone.label().to_string(),
            FormField::Goal => self.goal.label().to_string(),
            FormField::Submit => String::new(),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            language: self.value_label(FormField::Language),
            level: self.level,
            tone: self.tone,
            goal: self.goal,
        }
    }
}

/// Parsed blocks of the most recent tutor message, with checklist toggle state
///
/// Toggles live here and never touch the message text. They are kept until
/// another tutor message arrives or the transcript is replaced.
#[derive(Debug, Clone)]
pub struct LatestMessage {
    key: (Uuid, u64, usize),
    pub blocks: Vec<Block>,
    pub checklist_cursor: usize,
}

impl LatestMessage {
    /// Transcript position of the message
    pub fn index(&self) -> usize {
        self.key.2
    }

    pub fn checklist_len(&self) -> usize {
        checklist_count(&self.blocks)
    }

    pub fn toggle_current(&mut self) {
        let cursor = self.checklist_cursor;
        if let Some(item) = checklist_items_mut(&mut self.blocks).nth(cursor) {
            item.toggle();
        }
    }

    pub fn move_cursor(&mut self, forward: bool) {
        let len = self.checklist_len();
        if len == 0 {
            return;
        }
        self.checklist_cursor = if forward {
            (self.checklist_cursor + 1).min(len - 1)
        } else {
            self.checklist_cursor.saturating_sub(1)
        };
    }

    /// Bold spans, offered as terms to explain
    pub fn bold_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push_runs = |runs: &[Run]| {
            for run in runs.iter().filter(|r| r.is_bold()) {
                let text = run.text().trim();
                if !text.is_empty() && !terms.iter().any(|t| t == text) {
                    terms.push(text.to_string());
                }
            }
        };
        for block in &self.blocks {
            match block {
                Block::Heading { runs, .. } | Block::Paragraph(runs) => push_runs(runs),
                Block::List { items, .. } => items.iter().for_each(|item: &ListItem| push_runs(item.runs())),
                Block::Table { .. } | Block::Rule | Block::Diagram { .. } => {}
            }
        }
        terms
    }
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,
    pub pending_actions: Vec<PendingAction>,

    /// Path typed on the upload screen
    pub upload_path: String,
    /// File input error (unsupported type, unreadable file)
    pub upload_error: Option<String>,

    pub form: PersonalizationForm,

    /// Message being typed
    pub input: String,
    pub active_mode: Mode,
    /// Plan index the next message asks about, when not the current topic
    pub topic_override: Option<usize>,

    /// Sidebar cursor; browsing never changes the current topic
    pub viewed_topic: usize,

    /// Lines scrolled back from the bottom of the transcript
    pub scroll_back: u16,
    /// Set by the renderer from the last layout
    pub max_scroll: u16,
    transcript_len: usize,

    pub latest: Option<LatestMessage>,
    /// Index into the latest message's bold terms while typing a term
    pub term_cursor: usize,

    /// Animation counter advanced on every tick
    pub tick: u64,
}

impl AppState {
    pub fn new(defaults: &Settings) -> Self {
        debug!("AppState::new: called");
        Self {
            interaction_mode: InteractionMode::Normal,
            should_quit: false,
            pending_actions: Vec::new(),
            upload_path: String::new(),
            upload_error: None,
            form: PersonalizationForm::new(defaults),
            input: String::new(),
            active_mode: Mode::Chat,
            topic_override: None,
            viewed_topic: 0,
            scroll_back: 0,
            max_scroll: 0,
            transcript_len: 0,
            latest: None,
            term_cursor: 0,
            tick: 0,
        }
    }

    /// Bring UI state in line with the session after it changed
    pub fn sync(&mut self, session: &Session) {
        let transcript = session.transcript();
        if transcript.len() != self.transcript_len {
            self.transcript_len = transcript.len();
            self.scroll_back = 0;
        }

        let plan_len = session.plan().len();
        if plan_len > 0 && self.viewed_topic >= plan_len {
            self.viewed_topic = plan_len - 1;
        }

        let Some(index) = transcript.iter().rposition(Message::is_model) else {
            self.latest = None;
            return;
        };
        let key = (session.id(), session.transcript_epoch(), index);
        if self.latest.as_ref().is_some_and(|l| l.key == key) {
            return;
        }
        debug!(?key, "AppState::sync: new latest message");
        self.latest = Some(LatestMessage {
            key,
            blocks: parse(&transcript[index].content, Dialect::Chat),
            checklist_cursor: 0,
        });
    }

    /// Forget per-session UI state after a reset
    pub fn clear_session(&mut self, defaults: &Settings) {
        debug!("AppState::clear_session: called");
        self.interaction_mode = InteractionMode::Normal;
        self.upload_path.clear();
        self.upload_error = None;
        self.form = PersonalizationForm::new(defaults);
        self.input.clear();
        self.active_mode = Mode::Chat;
        self.topic_override = None;
        self.viewed_topic = 0;
        self.scroll_back = 0;
        self.latest = None;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn cycle_mode(&mut self, forward: bool) {
        self.active_mode = cycle(&Mode::SELECTABLE, self.active_mode, forward);
    }
}
