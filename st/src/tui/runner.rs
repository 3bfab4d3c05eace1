//! TUI Runner - main loop that owns the terminal and the session driver
//!
//! The TuiRunner is responsible for:
//! - Rendering the session snapshot on every loop turn
//! - Dispatching key events to App and executing the actions it queues
//! - Applying generation results as soon as they arrive

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::Result;
use tracing::{debug, info, warn};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::PendingAction;
use super::views;
use crate::domain::{DocumentRef, Settings};
use crate::session::{Intent, SessionDriver};

/// Redraw cadence when nothing else happens (~30 FPS)
const TICK_RATE: Duration = Duration::from_millis(33);

/// Resolve a leading `~/` against the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    driver: SessionDriver,
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, driver: SessionDriver, defaults: Settings) -> Self {
        debug!("TuiRunner::new: called");
        Self {
            app: App::new(defaults),
            terminal,
            driver,
            event_handler: EventHandler::new(TICK_RATE),
        }
    }

    /// Read a document and start a session with it
    ///
    /// Unreadable or unsupported files leave the session alone and show the
    /// problem on the upload screen.
    pub async fn open(&mut self, path: &Path) {
        let path = expand_home(path);
        debug!(?path, "TuiRunner::open: called");
        match DocumentRef::from_path(&path).await {
            Ok(document) => {
                info!(name = document.name(), media_type = document.media_type(), "Document loaded");
                self.app.document_loaded();
                self.driver.dispatch(Intent::UploadDocument(document));
            }
            Err(e) => {
                warn!(?path, error = %e, "TuiRunner::open: document rejected");
                self.app.document_failed(e.to_string());
            }
        }
    }

    async fn run_actions(&mut self) {
        for action in self.app.take_actions() {
            match action {
                PendingAction::Dispatch(intent) => self.driver.dispatch(intent),
                PendingAction::LoadDocument(path) => self.open(&path).await,
            }
        }
    }

    /// Run the main loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.app.state_mut().sync(self.driver.session());
            self.terminal
                .draw(|frame| views::render(self.app.state_mut(), self.driver.session(), frame))?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => {
                            let state = self.app.state_mut();
                            state.tick = state.tick.wrapping_add(1);
                        }
                        Event::Key(key) => {
                            if self.app.handle_key(key, self.driver.session()) {
                                debug!("TuiRunner::run: quit requested");
                                break;
                            }
                            self.run_actions().await;
                        }
                        Event::Paste(text) => self.app.handle_paste(&text, self.driver.session()),
                        Event::Resize(width, height) => debug!(width, height, "TuiRunner::run: resized"),
                    }
                }
                _ = self.driver.next_result() => {
                    debug!(in_flight = self.driver.in_flight(), "TuiRunner::run: result applied");
                }
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }
}
