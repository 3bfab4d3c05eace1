//! Effect layer
//!
//! Performs the generation calls the reducer asks for and turns each outcome
//! into the result intent that feeds back into the session. Every call is
//! bounded by a timeout so a silent service can never wedge the session.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::reducer::{Effect, Intent};
use crate::domain::Mode;
use crate::error::TutorError;
use crate::generation::GenerationService;

/// Executes effects against a generation service
#[derive(Clone)]
pub struct EffectRunner {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
}

impl EffectRunner {
    pub fn new(service: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        debug!(?timeout, "EffectRunner::new: called");
        Self { service, timeout }
    }

    /// Run one effect to completion and report its result intent
    pub async fn run(&self, effect: Effect) -> Intent {
        debug!(tag = ?effect.tag(), "EffectRunner::run: called");
        match effect {
            Effect::GeneratePlan { tag, document, settings } => {
                let result = self
                    .bounded(self.service.generate_plan(&document, &settings))
                    .await
                    .and_then(|r| r);
                Intent::PlanGenerated { tag, result }
            }
            Effect::GenerateTransition {
                tag,
                kind,
                document,
                settings,
                topic,
            } => {
                let result = self
                    .bounded(
                        self.service
                            .generate_response(&document, &[], "", kind.mode(), &settings, Some(&topic)),
                    )
                    .await
                    .and_then(|r| r);
                Intent::TransitionGenerated { tag, kind, result }
            }
            Effect::GenerateResponse {
                tag,
                document,
                settings,
                history,
                message,
                mode,
                topic,
            } => {
                let result = self
                    .bounded(
                        self.service
                            .generate_response(&document, &history, &message, mode, &settings, topic.as_ref()),
                    )
                    .await
                    .and_then(|r| r);
                Intent::ResponseGenerated { tag, mode, result }
            }
            Effect::GenerateClosing {
                tag,
                document,
                settings,
                history,
            } => {
                let result = self
                    .bounded(
                        self.service
                            .generate_response(&document, &history, "", Mode::FinishPlan, &settings, None),
                    )
                    .await
                    .and_then(|r| r);
                Intent::ClosingGenerated { tag, result }
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = T>) -> Result<T, TutorError> {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            warn!(timeout = ?self.timeout, "EffectRunner: generation request timed out");
            TutorError::GenerationFailed(format!("request timed out after {:?}", self.timeout))
        })
    }
}
