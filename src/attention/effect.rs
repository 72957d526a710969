//! Effects produced by attention transitions

use std::time::Duration;

/// Effects to execute after an attention transition.
///
/// `Arm` is consumed by the scheduler (it starts the single pending
/// timer); `ShowPrompt`/`HidePrompt` bubble up to the UI stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionEffect {
    /// Start the phase timer. At most one per transition.
    Arm(Duration),
    /// Make the tooltip visible.
    ShowPrompt,
    /// Hide the tooltip.
    HidePrompt,
}
