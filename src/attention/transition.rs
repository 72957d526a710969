//! Pure attention transition function

use super::{AttentionConfig, AttentionEffect, AttentionEvent, AttentionState};

/// Apply one event to the attention cycle.
///
/// Total over every (state, event) pair: user interactions reset the cycle,
/// timer events advance it, and a timer event that arrives after a reset
/// (stale callback) is a no-op in `Idle`. Pure — timers are requested via
/// [`AttentionEffect::Arm`], never started here.
pub fn transition(
    state: AttentionState,
    config: &AttentionConfig,
    event: AttentionEvent,
) -> (AttentionState, Vec<AttentionEffect>) {
    match (state, event) {
        // Opening the widget (or interacting while it is open) silences
        // everything. The pending timer is cancelled by the scheduler.
        (
            state,
            AttentionEvent::WidgetOpened | AttentionEvent::Interacted { widget_open: true },
        ) => (AttentionState::Idle, hide_if_showing(state)),

        // Closing, or interacting while still closed, restarts the arm
        // delay from scratch so the prompt never reappears immediately
        // after the user touched the toggle.
        (
            state,
            AttentionEvent::WidgetClosed | AttentionEvent::Interacted { widget_open: false },
        ) => {
            let mut effects = hide_if_showing(state);
            effects.push(AttentionEffect::Arm(config.arm_delay));
            (AttentionState::ArmedWaiting, effects)
        }

        (AttentionState::ArmedWaiting, AttentionEvent::TimerElapsed) => (
            AttentionState::Showing,
            vec![
                AttentionEffect::ShowPrompt,
                AttentionEffect::Arm(config.show_duration),
            ],
        ),

        (AttentionState::Showing, AttentionEvent::TimerElapsed) => (
            AttentionState::Cooldown,
            vec![
                AttentionEffect::HidePrompt,
                AttentionEffect::Arm(config.cooldown),
            ],
        ),

        (AttentionState::Cooldown, AttentionEvent::TimerElapsed) => (
            AttentionState::ArmedWaiting,
            vec![AttentionEffect::Arm(config.arm_delay)],
        ),

        // Stale timer callback after a reset.
        (AttentionState::Idle, AttentionEvent::TimerElapsed) => (AttentionState::Idle, vec![]),
    }
}

fn hide_if_showing(state: AttentionState) -> Vec<AttentionEffect> {
    if state == AttentionState::Showing {
        vec![AttentionEffect::HidePrompt]
    } else {
        vec![]
    }
}
