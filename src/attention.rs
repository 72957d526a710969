//! Unsolicited-attention prompt state machine
//!
//! While the widget is collapsed, a "come talk to me" tooltip is shown on a
//! timed cycle: wait, show briefly, cool down, repeat. Opening the widget or
//! touching its toggle silences the cycle. The transition logic is a pure
//! function (Elm-style: state + event in, state + effects out); the
//! [`scheduler::AttentionScheduler`] drives it with real tokio timers and
//! guarantees at most one pending timer at any instant.

mod effect;
mod event;
mod scheduler;
mod state;
mod transition;

pub use effect::AttentionEffect;
pub use event::AttentionEvent;
pub use scheduler::AttentionScheduler;
pub use state::{AttentionConfig, AttentionState};
pub use transition::transition;

#[cfg(test)]
mod proptests;
