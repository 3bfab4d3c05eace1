//! Session reducer
//!
//! `Session::apply` is the only way session state changes. It is synchronous
//! and performs no I/O: generation work is described as `Effect`s, and the
//! effect layer reports back with result intents carrying the `RequestTag`
//! they were issued under. Results whose tag no longer matches are dropped.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{CLOSING_FALLBACK_TEXT, CompletionAction, PLAN_FAILURE_TEXT, Phase, RequestTag, Session, TransitionKind};
use crate::domain::{Confidence, DocumentRef, FollowUpAction, Message, Mode, Settings, Topic, TopicDraft};
use crate::error::TutorError;

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum Intent {
    /// A new document replaces any previous one and starts over
    UploadDocument(DocumentRef),
    CompletePersonalization(Settings),
    SendMessage {
        text: String,
        mode: Mode,
        /// Explicit plan index overriding the current topic
        topic: Option<usize>,
    },
    CompleteCurrentTopic(Confidence),
    SelectTerm(String),
    ClearSelectedTerm,
    RequestTermExplanation(String),
    FollowUp {
        action: FollowUpAction,
        last_message: String,
    },
    Completion(CompletionAction),
    DismissError,
    Reset,

    PlanGenerated {
        tag: RequestTag,
        result: Result<Vec<TopicDraft>, TutorError>,
    },
    TransitionGenerated {
        tag: RequestTag,
        kind: TransitionKind,
        result: Result<String, TutorError>,
    },
    ResponseGenerated {
        tag: RequestTag,
        mode: Mode,
        result: Result<String, TutorError>,
    },
    ClosingGenerated {
        tag: RequestTag,
        result: Result<String, TutorError>,
    },
}

/// Generation work requested by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    GeneratePlan {
        tag: RequestTag,
        document: DocumentRef,
        settings: Settings,
    },
    GenerateTransition {
        tag: RequestTag,
        kind: TransitionKind,
        document: DocumentRef,
        settings: Settings,
        topic: Topic,
    },
    GenerateResponse {
        tag: RequestTag,
        document: DocumentRef,
        settings: Settings,
        history: Vec<Message>,
        message: String,
        mode: Mode,
        topic: Option<Topic>,
    },
    GenerateClosing {
        tag: RequestTag,
        document: DocumentRef,
        settings: Settings,
        history: Vec<Message>,
    },
}

impl Effect {
    pub fn tag(&self) -> RequestTag {
        match self {
            Effect::GeneratePlan { tag, .. }
            | Effect::GenerateTransition { tag, .. }
            | Effect::GenerateResponse { tag, .. }
            | Effect::GenerateClosing { tag, .. } => *tag,
        }
    }
}

impl Session {
    /// Apply one intent and return the generation work it requires
    pub fn apply(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::UploadDocument(document) => self.upload_document(document),
            Intent::CompletePersonalization(settings) => self.complete_personalization(settings),
            Intent::SendMessage { text, mode, topic } => self.send_message(&text, mode, topic),
            Intent::CompleteCurrentTopic(confidence) => self.complete_current_topic(confidence),
            Intent::SelectTerm(term) => {
                let term = term.trim();
                self.selected_term = (!term.is_empty()).then(|| term.to_string());
                vec![]
            }
            Intent::ClearSelectedTerm => {
                self.selected_term = None;
                vec![]
            }
            Intent::RequestTermExplanation(term) => self.request_term_explanation(term),
            Intent::FollowUp { action, last_message } => {
                debug!(?action, last_len = last_message.len(), "Session::apply: follow-up requested");
                self.send_message(action.request_text(), action.mode(), None)
            }
            Intent::Completion(action) => {
                // The closing message lands first
                if self.phase != Phase::Completed || self.loading {
                    return vec![];
                }
                self.send_message(action.request_text(), action.mode(), None)
            }
            Intent::DismissError => {
                self.error = None;
                vec![]
            }
            Intent::Reset => {
                self.reset();
                vec![]
            }
            Intent::PlanGenerated { tag, result } => self.plan_generated(tag, result),
            Intent::TransitionGenerated { tag, kind, result } => self.transition_generated(tag, kind, result),
            Intent::ResponseGenerated { tag, mode, result } => self.response_generated(tag, mode, result),
            Intent::ClosingGenerated { tag, result } => self.closing_generated(tag, result),
        }
    }

    /// Clear everything and return to upload under a fresh identity
    fn reset(&mut self) {
        info!(session = %self.id, "Session reset");
        *self = Session::new();
    }

    /// Fresh identity so results issued before this point go stale
    fn renew_identity(&mut self) {
        self.id = Uuid::now_v7();
        self.transcript_epoch = 0;
    }

    fn upload_document(&mut self, document: DocumentRef) -> Vec<Effect> {
        debug!(name = %document.name(), media_type = %document.media_type(), "Session::upload_document: called");
        self.renew_identity();
        self.document = Some(document);
        self.settings = None;
        self.plan.clear();
        self.transcript.clear();
        self.current_topic = 0;
        self.error = None;
        self.loading = false;
        self.selected_term = None;
        self.phase = Phase::Personalizing;
        vec![]
    }

    fn complete_personalization(&mut self, settings: Settings) -> Vec<Effect> {
        debug!(phase = %self.phase, "Session::complete_personalization: called");
        if self.phase != Phase::Personalizing {
            warn!(phase = %self.phase, "Session::complete_personalization: not personalizing, ignoring");
            return vec![];
        }

        let Some(document) = self.document.clone() else {
            self.error = Some(TutorError::MissingDocument.to_string());
            self.phase = Phase::Upload;
            return vec![];
        };

        self.settings = Some(settings.clone());
        self.error = None;
        self.loading = true;
        self.phase = Phase::GeneratingPlan;
        vec![Effect::GeneratePlan {
            tag: self.tag(),
            document,
            settings,
        }]
    }

    fn plan_generated(&mut self, tag: RequestTag, result: Result<Vec<TopicDraft>, TutorError>) -> Vec<Effect> {
        if !self.is_current(&tag) || self.phase != Phase::GeneratingPlan {
            warn!(?tag, phase = %self.phase, "Session::plan_generated: discarding stale plan");
            return vec![];
        }

        let drafts = match result {
            Ok(drafts) if !drafts.is_empty() => drafts,
            outcome => {
                match outcome {
                    Err(e) => warn!(error = %e, "Plan generation failed"),
                    Ok(_) => warn!("Plan generation returned no topics"),
                }
                self.error = Some(PLAN_FAILURE_TEXT.to_string());
                self.settings = None;
                self.loading = false;
                self.phase = Phase::Upload;
                return vec![];
            }
        };

        info!(topics = drafts.len(), "Study plan ready");
        self.plan = drafts.into_iter().map(Topic::from).collect();
        self.current_topic = 0;
        self.phase = Phase::Studying;
        self.request_topic_transition(0, TransitionKind::Start)
    }

    /// Replace the transcript and ask for an opening message for `index`
    ///
    /// Failures never block: the result handler falls back to a local message.
    fn request_topic_transition(&mut self, index: usize, kind: TransitionKind) -> Vec<Effect> {
        debug!(%index, ?kind, "Session::request_topic_transition: called");
        self.transcript.clear();
        self.transcript_epoch += 1;
        self.selected_term = None;
        self.error = None;

        let Some(topic) = self.plan.get(index).cloned() else {
            warn!(%index, "Session::request_topic_transition: no such topic");
            self.loading = false;
            return vec![];
        };

        match (self.document.clone(), self.settings.clone()) {
            (Some(document), Some(settings)) => {
                self.loading = true;
                vec![Effect::GenerateTransition {
                    tag: self.tag(),
                    kind,
                    document,
                    settings,
                    topic,
                }]
            }
            _ => {
                self.transcript.push(Message::model(kind.fallback(&topic), Some(Mode::Chat)));
                self.loading = false;
                vec![]
            }
        }
    }

    fn transition_generated(&mut self, tag: RequestTag, kind: TransitionKind, result: Result<String, TutorError>) -> Vec<Effect> {
        if !self.is_current(&tag) {
            warn!(?tag, "Session::transition_generated: discarding stale transition");
            return vec![];
        }
        let content = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, ?kind, "Topic transition message failed, using fallback");
                match self.current_topic() {
                    Some(topic) => kind.fallback(topic),
                    None => {
                        self.loading = false;
                        return vec![];
                    }
                }
            }
        };
        self.transcript = vec![Message::model(content, Some(Mode::Chat))];
        self.loading = false;
        vec![]
    }

    fn send_message(&mut self, text: &str, mode: Mode, topic: Option<usize>) -> Vec<Effect> {
        debug!(%mode, ?topic, "Session::send_message: called");
        if text.trim().is_empty() {
            return vec![];
        }
        let (Some(document), Some(settings)) = (self.document.clone(), self.settings.clone()) else {
            debug!("Session::send_message: no document or settings, ignoring");
            return vec![];
        };

        let topic = topic
            .and_then(|index| self.plan.get(index))
            .or_else(|| self.current_topic())
            .cloned();
        let history = self.transcript.clone();

        self.transcript.push(Message::user(text));
        self.loading = true;
        self.error = None;
        self.selected_term = None;

        vec![Effect::GenerateResponse {
            tag: self.tag(),
            document,
            settings,
            history,
            message: text.to_string(),
            mode,
            topic,
        }]
    }

    fn response_generated(&mut self, tag: RequestTag, mode: Mode, result: Result<String, TutorError>) -> Vec<Effect> {
        if !self.is_current(&tag) {
            warn!(?tag, "Session::response_generated: discarding stale response");
            return vec![];
        }
        match result {
            Ok(text) => self.transcript.push(Message::model(text, Some(mode))),
            Err(e) => {
                warn!(error = %e, %mode, "Tutor response failed");
                self.error = Some(format!("Sorry, I ran into a problem: {}", e));
            }
        }
        self.loading = false;
        vec![]
    }

    fn complete_current_topic(&mut self, confidence: Confidence) -> Vec<Effect> {
        debug!(rating = confidence.value(), index = self.current_topic, "Session::complete_current_topic: called");
        if self.phase != Phase::Studying {
            return vec![];
        }
        let Some(topic) = self.plan.get_mut(self.current_topic) else {
            return vec![];
        };
        topic.complete(confidence);
        info!(title = %topic.title, rating = confidence.value(), "Topic completed");

        let next = self.current_topic + 1;
        if next < self.plan.len() {
            self.current_topic = next;
            return self.request_topic_transition(next, TransitionKind::Next);
        }

        info!("Study plan completed");
        self.phase = Phase::Completed;
        self.selected_term = None;
        self.error = None;
        // Replies still in flight for the last topic go stale
        self.transcript_epoch += 1;
        match (self.document.clone(), self.settings.clone()) {
            (Some(document), Some(settings)) => {
                self.loading = true;
                vec![Effect::GenerateClosing {
                    tag: self.tag(),
                    document,
                    settings,
                    history: self.transcript.clone(),
                }]
            }
            _ => {
                self.transcript.push(Message::model(CLOSING_FALLBACK_TEXT, None));
                vec![]
            }
        }
    }

    fn closing_generated(&mut self, tag: RequestTag, result: Result<String, TutorError>) -> Vec<Effect> {
        if !self.is_current(&tag) {
            warn!(?tag, "Session::closing_generated: discarding stale closing message");
            return vec![];
        }
        let content = result.unwrap_or_else(|e| {
            warn!(error = %e, "Closing message failed, using fallback");
            CLOSING_FALLBACK_TEXT.to_string()
        });
        self.transcript.push(Message::model(content, None));
        self.loading = false;
        vec![]
    }

    fn request_term_explanation(&mut self, term: String) -> Vec<Effect> {
        if self.phase != Phase::Studying {
            return vec![];
        }
        self.send_message(&term, Mode::ExplainTerm, None)
    }
}
