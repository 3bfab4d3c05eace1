//! Session driver
//!
//! Owns the `Session`, feeds intents through the reducer and spawns the
//! effects it returns. Results come back over a channel and are applied on
//! the driver's side, so the session is only ever touched from one place.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::effects::EffectRunner;
use super::model::Session;
use super::reducer::{Effect, Intent};

/// Single owner of a tutoring session
pub struct SessionDriver {
    session: Session,
    runner: EffectRunner,
    tx: mpsc::UnboundedSender<Intent>,
    rx: mpsc::UnboundedReceiver<Intent>,
    in_flight: usize,
}

impl SessionDriver {
    pub fn new(runner: EffectRunner) -> Self {
        debug!("SessionDriver::new: called");
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            runner,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Read-only snapshot for the surfaces
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of effects whose results have not come back yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply an intent and start any generation work it asks for
    pub fn dispatch(&mut self, intent: Intent) {
        trace!(?intent, "SessionDriver::dispatch: called");
        let effects = self.session.apply(intent);
        for effect in effects {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        debug!(tag = ?effect.tag(), "SessionDriver::spawn: called");
        self.in_flight += 1;
        let runner = self.runner.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let intent = runner.run(effect).await;
            if tx.send(intent).is_err() {
                debug!("SessionDriver: driver dropped before result arrived");
            }
        });
    }

    /// Apply every result that has already arrived, without waiting
    ///
    /// Returns true when anything was applied.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(intent) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(intent);
            applied = true;
        }
        applied
    }

    /// Wait for the next result and apply it
    ///
    /// Pends forever while nothing is in flight. Cancel-safe, so it can sit in
    /// a `select!` next to terminal events.
    pub async fn next_result(&mut self) {
        if self.in_flight == 0 {
            std::future::pending::<()>().await;
        }
        if let Some(intent) = self.rx.recv().await {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(intent);
        }
    }

    /// Wait until every spawned effect, including follow-on effects, has landed
    pub async fn run_until_idle(&mut self) {
        debug!(in_flight = self.in_flight, "SessionDriver::run_until_idle: called");
        while self.in_flight > 0 {
            self.next_result().await;
        }
    }
}
