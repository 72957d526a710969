//! Attention cycle states and timing configuration

use std::time::Duration;

/// Where the attention cycle currently is.
///
/// Transitions are linear: `Idle ⇄ ArmedWaiting → Showing → Cooldown →
/// ArmedWaiting → …`. `Idle` means the widget is open (or the machine was
/// just reset) and nothing is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttentionState {
    /// Widget open, no timer armed.
    #[default]
    Idle,
    /// Widget closed, waiting out the arm delay before showing the prompt.
    ArmedWaiting,
    /// Prompt visible, waiting out the show duration.
    Showing,
    /// Prompt hidden again, waiting out the cooldown before re-arming.
    Cooldown,
}

/// Timing knobs for the attention cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionConfig {
    /// Quiet period after the widget closes before the prompt appears.
    pub arm_delay: Duration,
    /// How long the prompt stays visible.
    pub show_duration: Duration,
    /// Quiet period after the prompt hides before the next cycle.
    pub cooldown: Duration,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            arm_delay: Duration::from_secs(20),
            show_duration: Duration::from_secs(3),
            cooldown: Duration::from_secs(30),
        }
    }
}
