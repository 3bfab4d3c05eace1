//! Session State Machine
//!
//! A pure reducer (`Session::apply`) over the session aggregate, an effect
//! layer that performs generation calls, and a driver that owns the session
//! and feeds results back in as intents.
//!
//! Lifecycle: upload → personalizing → generating_plan → studying → completed,
//! with plan failures returning to upload.

mod driver;
mod effects;
mod model;
mod reducer;

pub use driver::SessionDriver;
pub use effects::EffectRunner;
pub use model::{
    CLOSING_FALLBACK_TEXT, CompletionAction, PLAN_FAILURE_TEXT, Phase, RequestTag, Session, TransitionKind,
};
pub use reducer::{Effect, Intent};
