//! TUI application - keyboard handling
//!
//! The App owns the AppState and turns key presses into UI changes and
//! queued `PendingAction`s. It never touches the session directly and does
//! no rendering; the runner executes the actions and the views draw.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, InteractionMode, PendingAction};
use crate::domain::{Confidence, FollowUpAction, Mode, Settings};
use crate::session::{CompletionAction, Intent, Phase, Session};

/// Follow-up actions reachable from the keyboard but not shown in the bar
const EXTRA_FOLLOW_UPS: [(char, FollowUpAction); 2] =
    [('u', FollowUpAction::Summarize), ('a', FollowUpAction::ExplainAgain)];

/// Default rating highlighted when the confidence modal opens
const DEFAULT_RATING: u8 = 3;

/// TUI application
#[derive(Debug)]
pub struct App {
    state: AppState,
    /// Personalization defaults restored on every new session
    defaults: Settings,
}

impl App {
    pub fn new(defaults: Settings) -> Self {
        debug!("App::new: called");
        Self {
            state: AppState::new(&defaults),
            defaults,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Drain the actions queued since the last call
    pub fn take_actions(&mut self) -> Vec<PendingAction> {
        std::mem::take(&mut self.state.pending_actions)
    }

    fn dispatch(&mut self, intent: Intent) {
        trace!(?intent, "App::dispatch: queued");
        self.state.pending_actions.push(PendingAction::Dispatch(intent));
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit immediately.
    pub fn handle_key(&mut self, key: KeyEvent, session: &Session) -> bool {
        debug!(?key, mode = ?self.state.interaction_mode, phase = %session.phase(), "App::handle_key: called");
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            debug!("App::handle_key: force quit");
            return true;
        }

        match &self.state.interaction_mode {
            InteractionMode::Normal => match session.phase() {
                Phase::Upload => self.handle_upload_key(key, session),
                Phase::Personalizing => self.handle_personalize_key(key),
                Phase::GeneratingPlan => self.handle_generating_key(key),
                Phase::Studying | Phase::Completed => self.handle_study_key(key, session),
            },
            InteractionMode::Input => self.handle_input_key(key, session),
            InteractionMode::TermInput(_) => self.handle_term_key(key),
            InteractionMode::Confidence(_) => self.handle_confidence_key(key),
            InteractionMode::ConfirmReset(_) => self.handle_confirm_key(key),
            InteractionMode::Help => self.handle_help_key(key),
        }

        self.state.should_quit
    }

    /// Route pasted text into whichever field is accepting input
    pub fn handle_paste(&mut self, text: &str, session: &Session) {
        debug!(len = text.len(), "App::handle_paste: called");
        let text = text.trim_end_matches(['\r', '\n']);
        match &mut self.state.interaction_mode {
            InteractionMode::Input => self.state.input.push_str(text),
            InteractionMode::TermInput(term) => term.push_str(text),
            InteractionMode::Normal if session.phase() == Phase::Upload => {
                // Terminals quote dropped paths
                self.state.upload_path.push_str(text.trim().trim_matches(['\'', '"']));
            }
            _ => {}
        }
    }

    /// A file was read; start a session with it
    pub fn document_loaded(&mut self) {
        debug!("App::document_loaded: called");
        self.state.clear_session(&self.defaults);
    }

    /// A file could not be read or is not an accepted type
    pub fn document_failed(&mut self, message: String) {
        debug!(%message, "App::document_failed: called");
        self.state.upload_error = Some(message);
    }

    fn handle_upload_key(&mut self, key: KeyEvent, session: &Session) {
        match key.code {
            KeyCode::Char('?') if self.state.upload_path.is_empty() => {
                self.state.interaction_mode = InteractionMode::Help;
            }
            KeyCode::Char(c) => {
                self.state.upload_path.push(c);
                self.state.upload_error = None;
            }
            KeyCode::Backspace => {
                self.state.upload_path.pop();
            }
            KeyCode::Enter => {
                let path = self.state.upload_path.trim().to_string();
                if !path.is_empty() {
                    debug!(%path, "App::handle_upload_key: loading document");
                    self.state.pending_actions.push(PendingAction::LoadDocument(PathBuf::from(path)));
                } else if let Some(document) = session.document() {
                    debug!(name = document.name(), "App::handle_upload_key: reusing retained document");
                    self.dispatch(Intent::UploadDocument(document.clone()));
                }
            }
            KeyCode::Esc => {
                self.state.upload_path.clear();
                self.state.upload_error = None;
                if session.error().is_some() {
                    self.dispatch(Intent::DismissError);
                }
            }
            _ => {}
        }
    }

    fn handle_personalize_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.form;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => form.next_field(),
            KeyCode::Left | KeyCode::Char('h') => form.cycle_value(false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => form.cycle_value(true),
            KeyCode::Enter => {
                let settings = form.settings();
                debug!(?settings, "App::handle_personalize_key: submitting personalization");
                self.dispatch(Intent::CompletePersonalization(settings));
            }
            KeyCode::Esc => {
                debug!("App::handle_personalize_key: back to upload");
                self.dispatch(Intent::Reset);
                self.state.clear_session(&self.defaults);
            }
            KeyCode::Char('?') => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Char('q') => self.state.should_quit = true,
            _ => {}
        }
    }

    fn handle_generating_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('N') => self.state.interaction_mode = InteractionMode::ConfirmReset(false),
            KeyCode::Char('?') => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Char('q') => self.state.should_quit = true,
            _ => {}
        }
    }

    fn handle_study_key(&mut self, key: KeyEvent, session: &Session) {
        let studying = session.phase() == Phase::Studying;
        let idle = !session.is_loading();

        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Char('N') => self.state.interaction_mode = InteractionMode::ConfirmReset(false),
            KeyCode::Esc => {
                if session.error().is_some() {
                    self.dispatch(Intent::DismissError);
                } else if session.selected_term().is_some() {
                    self.dispatch(Intent::ClearSelectedTerm);
                }
                self.state.topic_override = None;
            }

            KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('/') => {
                self.state.interaction_mode = InteractionMode::Input;
            }
            KeyCode::Tab => self.state.cycle_mode(true),
            KeyCode::BackTab => self.state.cycle_mode(false),

            KeyCode::Up => self.state.scroll_up(1),
            KeyCode::Down => self.state.scroll_down(1),
            KeyCode::PageUp => self.state.scroll_up(10),
            KeyCode::PageDown => self.state.scroll_down(10),
            KeyCode::End => self.state.scroll_back = 0,

            KeyCode::Char('[') => self.state.viewed_topic = self.state.viewed_topic.saturating_sub(1),
            KeyCode::Char(']') => {
                let last = session.plan().len().saturating_sub(1);
                self.state.viewed_topic = (self.state.viewed_topic + 1).min(last);
            }
            KeyCode::Char('v') if !session.plan().is_empty() => {
                debug!(topic = self.state.viewed_topic, "App::handle_study_key: asking about viewed topic");
                self.state.topic_override = Some(self.state.viewed_topic);
                self.state.interaction_mode = InteractionMode::Input;
            }

            KeyCode::Char(' ') => {
                if let Some(latest) = self.state.latest.as_mut() {
                    latest.toggle_current();
                }
            }
            KeyCode::Char(',') => {
                if let Some(latest) = self.state.latest.as_mut() {
                    latest.move_cursor(false);
                }
            }
            KeyCode::Char('.') => {
                if let Some(latest) = self.state.latest.as_mut() {
                    latest.move_cursor(true);
                }
            }

            KeyCode::Char('t') if studying && idle => {
                let seed = session
                    .selected_term()
                    .map(str::to_string)
                    .or_else(|| self.state.latest.as_ref().and_then(|l| l.bold_terms().into_iter().next()))
                    .unwrap_or_default();
                self.state.term_cursor = 0;
                self.state.interaction_mode = InteractionMode::TermInput(seed);
            }
            KeyCode::Char('c') if studying && idle => {
                self.state.interaction_mode = InteractionMode::Confidence(DEFAULT_RATING);
            }

            KeyCode::Char('r') if !studying && idle => self.dispatch(Intent::Completion(CompletionAction::ReviewNotes)),
            KeyCode::Char('Q') if !studying && idle => self.dispatch(Intent::Completion(CompletionAction::TakeQuiz)),

            KeyCode::Char(c) if idle => {
                if let Some(action) = follow_up_for(c, session) {
                    let last_message = session.last_model_message().map(|m| m.content.clone()).unwrap_or_default();
                    debug!(?action, "App::handle_study_key: follow-up");
                    self.dispatch(Intent::FollowUp { action, last_message });
                }
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, session: &Session) {
        match key.code {
            KeyCode::Esc => self.state.interaction_mode = InteractionMode::Normal,
            KeyCode::Enter => {
                if session.is_loading() {
                    debug!("App::handle_input_key: request in flight, holding input");
                    return;
                }
                let text = std::mem::take(&mut self.state.input);
                if !text.trim().is_empty() {
                    let topic = self.state.topic_override.take();
                    self.dispatch(Intent::SendMessage {
                        text,
                        mode: self.state.active_mode,
                        topic,
                    });
                }
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Tab => self.state.cycle_mode(true),
            KeyCode::BackTab => self.state.cycle_mode(false),
            KeyCode::Char(c) => self.state.input.push(c),
            _ => {}
        }
    }

    fn handle_term_key(&mut self, key: KeyEvent) {
        let InteractionMode::TermInput(term) = &mut self.state.interaction_mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
                self.dispatch(Intent::ClearSelectedTerm);
            }
            KeyCode::Enter => {
                let term = term.trim().to_string();
                self.state.interaction_mode = InteractionMode::Normal;
                if !term.is_empty() {
                    debug!(%term, "App::handle_term_key: explaining term");
                    self.dispatch(Intent::SelectTerm(term.clone()));
                    self.dispatch(Intent::RequestTermExplanation(term));
                }
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Tab => {
                let terms = self.state.latest.as_ref().map(|l| l.bold_terms()).unwrap_or_default();
                if !terms.is_empty() {
                    self.state.term_cursor = (self.state.term_cursor + 1) % terms.len();
                    *term = terms[self.state.term_cursor].clone();
                }
            }
            KeyCode::Char(c) => term.push(c),
            _ => {}
        }
    }

    fn handle_confidence_key(&mut self, key: KeyEvent) {
        let InteractionMode::Confidence(rating) = self.state.interaction_mode else {
            return;
        };
        let submit = match key.code {
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.state.interaction_mode = InteractionMode::Confidence(rating.saturating_sub(1).max(Confidence::MIN));
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.interaction_mode = InteractionMode::Confidence((rating + 1).min(Confidence::MAX));
                None
            }
            KeyCode::Enter => Confidence::new(rating),
            KeyCode::Char(c) => c.to_digit(10).and_then(|d| u8::try_from(d).ok()).and_then(Confidence::new),
            _ => None,
        };

        if let Some(confidence) = submit {
            debug!(%confidence, "App::handle_confidence_key: completing topic");
            self.state.interaction_mode = InteractionMode::Normal;
            self.dispatch(Intent::CompleteCurrentTopic(confidence));
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InteractionMode::ConfirmReset(selected) = self.state.interaction_mode else {
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => self.state.interaction_mode = InteractionMode::Normal,
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.state.interaction_mode = InteractionMode::ConfirmReset(!selected);
            }
            KeyCode::Char('y') => self.reset(),
            KeyCode::Enter => {
                if selected {
                    self.reset();
                } else {
                    self.state.interaction_mode = InteractionMode::Normal;
                }
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.state.interaction_mode = InteractionMode::Normal;
        }
    }

    fn reset(&mut self) {
        debug!("App::reset: starting a new session");
        self.dispatch(Intent::Reset);
        self.state.clear_session(&self.defaults);
    }
}

/// The follow-up bound to a key, if follow-ups are on offer
///
/// Follow-ups hang off the latest tutor message and are hidden after a diagram.
fn follow_up_for(c: char, session: &Session) -> Option<FollowUpAction> {
    let last = session.last_model_message()?;
    if last.mode == Some(Mode::Diagram) {
        return None;
    }
    FollowUpAction::BAR
        .iter()
        .chain(EXTRA_FOLLOW_UPS.iter())
        .find(|(key, _)| *key == c)
        .map(|(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentRef, TopicDraft};
    use crate::session::TransitionKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn intents(app: &mut App) -> Vec<Intent> {
        app.take_actions()
            .into_iter()
            .filter_map(|a| match a {
                PendingAction::Dispatch(intent) => Some(intent),
                PendingAction::LoadDocument(_) => None,
            })
            .collect()
    }

    /// A session in Studying with one tutor message
    fn studying_session(welcome: &str) -> Session {
        let mut session = Session::new();
        session.apply(Intent::UploadDocument(DocumentRef::from_bytes(b"notes", "notes.md", "text/markdown")));
        let tag = session.apply(Intent::CompletePersonalization(Settings::default()))[0].tag();
        let drafts = vec![
            TopicDraft {
                title: "Cells".to_string(),
                objective: "name organelles".to_string(),
            },
            TopicDraft {
                title: "Energy".to_string(),
                objective: "explain ATP".to_string(),
            },
        ];
        let tag = session.apply(Intent::PlanGenerated { tag, result: Ok(drafts) })[0].tag();
        session.apply(Intent::TransitionGenerated {
            tag,
            kind: TransitionKind::Start,
            result: Ok(welcome.to_string()),
        });
        session
    }

    #[test]
    fn test_ctrl_c_force_quits() {
        let mut app = App::new(Settings::default());
        let session = Session::new();
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &session));
    }

    #[test]
    fn test_upload_enter_queues_load() {
        let mut app = App::new(Settings::default());
        let session = Session::new();
        for c in "notes.pdf".chars() {
            app.handle_key(key(KeyCode::Char(c)), &session);
        }
        app.handle_key(key(KeyCode::Enter), &session);

        let actions = app.take_actions();
        assert!(matches!(actions.as_slice(), [PendingAction::LoadDocument(p)] if p == &PathBuf::from("notes.pdf")));
    }

    #[test]
    fn test_upload_enter_without_path_reuses_retained_document() {
        let mut app = App::new(Settings::default());
        let mut session = Session::new();
        let document = DocumentRef::from_bytes(b"notes", "notes.md", "text/markdown");
        session.apply(Intent::UploadDocument(document.clone()));
        let tag = session.apply(Intent::CompletePersonalization(Settings::default()))[0].tag();
        session.apply(Intent::PlanGenerated {
            tag,
            result: Ok(vec![]),
        });
        assert_eq!(session.phase(), Phase::Upload);

        app.handle_key(key(KeyCode::Enter), &session);
        assert!(matches!(intents(&mut app).as_slice(), [Intent::UploadDocument(d)] if d == &document));
    }

    #[test]
    fn test_personalization_submit() {
        let mut app = App::new(Settings::default());
        let mut session = Session::new();
        session.apply(Intent::UploadDocument(DocumentRef::from_bytes(b"x", "x.txt", "text/plain")));

        app.handle_key(key(KeyCode::Down), &session);
        app.handle_key(key(KeyCode::Left), &session);
        app.handle_key(key(KeyCode::Enter), &session);

        match intents(&mut app).as_slice() {
            [Intent::CompletePersonalization(settings)] => {
                assert_eq!(settings.level, crate::domain::Level::Beginner);
                assert_eq!(settings.language, "English");
            }
            other => panic!("unexpected intents: {:?}", other),
        }
    }

    #[test]
    fn test_send_message_uses_active_mode_and_topic_override() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");

        app.handle_key(key(KeyCode::Tab), &session);
        app.handle_key(key(KeyCode::Char(']')), &session);
        app.handle_key(key(KeyCode::Char('v')), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::Input);
        for c in "atp?".chars() {
            app.handle_key(key(KeyCode::Char(c)), &session);
        }
        app.handle_key(key(KeyCode::Enter), &session);

        match intents(&mut app).as_slice() {
            [Intent::SendMessage { text, mode, topic }] => {
                assert_eq!(text, "atp?");
                assert_eq!(*mode, Mode::Todo);
                assert_eq!(*topic, Some(1));
            }
            other => panic!("unexpected intents: {:?}", other),
        }
        assert!(app.state().topic_override.is_none());
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('i')), &session);
        app.handle_key(key(KeyCode::Char(' ')), &session);
        app.handle_key(key(KeyCode::Enter), &session);
        assert!(intents(&mut app).is_empty());
    }

    #[test]
    fn test_follow_up_keys() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('s')), &session);
        app.handle_key(key(KeyCode::Char('u')), &session);

        let intents = intents(&mut app);
        assert!(matches!(
            &intents[0],
            Intent::FollowUp { action: FollowUpAction::Simplify, last_message } if last_message == "Welcome!"
        ));
        assert!(matches!(&intents[1], Intent::FollowUp { action: FollowUpAction::Summarize, .. }));
    }

    #[test]
    fn test_follow_ups_hidden_after_diagram() {
        let mut session = studying_session("Welcome!");
        let tag = session.tag();
        session.apply(Intent::FollowUp {
            action: FollowUpAction::Diagram,
            last_message: "Welcome!".to_string(),
        });
        session.apply(Intent::ResponseGenerated {
            tag,
            mode: Mode::Diagram,
            result: Ok("```mermaid\ngraph TD\nA-->B\n```".to_string()),
        });
        assert!(follow_up_for('s', &session).is_none());
    }

    #[test]
    fn test_confidence_modal_completes_topic() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('c')), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::Confidence(3));
        app.handle_key(key(KeyCode::Right), &session);
        app.handle_key(key(KeyCode::Right), &session);
        app.handle_key(key(KeyCode::Right), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::Confidence(5));
        app.handle_key(key(KeyCode::Enter), &session);

        assert!(matches!(
            intents(&mut app).as_slice(),
            [Intent::CompleteCurrentTopic(c)] if c.value() == 5
        ));
        assert_eq!(app.state().interaction_mode, InteractionMode::Normal);
    }

    #[test]
    fn test_confidence_digit_submits_directly() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('c')), &session);
        app.handle_key(key(KeyCode::Char('9')), &session);
        assert!(intents(&mut app).is_empty());
        app.handle_key(key(KeyCode::Char('2')), &session);
        assert!(matches!(intents(&mut app).as_slice(), [Intent::CompleteCurrentTopic(c)] if c.value() == 2));
    }

    #[test]
    fn test_term_input_seeds_from_bold_terms() {
        let mut app = App::new(Settings::default());
        let session = studying_session("The **mitochondria** make **ATP**.");
        app.state_mut().sync(&session);

        app.handle_key(key(KeyCode::Char('t')), &session);
        assert_eq!(
            app.state().interaction_mode,
            InteractionMode::TermInput("mitochondria".to_string())
        );
        app.handle_key(key(KeyCode::Tab), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::TermInput("ATP".to_string()));
        app.handle_key(key(KeyCode::Enter), &session);

        let intents = intents(&mut app);
        assert!(matches!(&intents[0], Intent::SelectTerm(t) if t == "ATP"));
        assert!(matches!(&intents[1], Intent::RequestTermExplanation(t) if t == "ATP"));
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('N')), &session);
        app.handle_key(key(KeyCode::Enter), &session);
        assert!(intents(&mut app).is_empty());

        app.handle_key(key(KeyCode::Char('N')), &session);
        app.handle_key(key(KeyCode::Char('y')), &session);
        assert!(matches!(intents(&mut app).as_slice(), [Intent::Reset]));
    }

    #[test]
    fn test_completion_actions_only_after_plan() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('r')), &session);
        assert!(intents(&mut app).is_empty());
    }

    #[test]
    fn test_help_toggle() {
        let mut app = App::new(Settings::default());
        let session = studying_session("Welcome!");
        app.handle_key(key(KeyCode::Char('?')), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::Help);
        app.handle_key(key(KeyCode::Esc), &session);
        assert_eq!(app.state().interaction_mode, InteractionMode::Normal);
    }

    #[test]
    fn test_paste_into_upload_path_strips_quotes() {
        let mut app = App::new(Settings::default());
        let session = Session::new();
        app.handle_paste("'/tmp/my notes.pdf'\n", &session);
        assert_eq!(app.state().upload_path, "/tmp/my notes.pdf");
    }
}
