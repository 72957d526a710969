//! Property-based tests for the attention transition function

use super::*;
use proptest::prelude::*;
use std::time::Duration;

fn config() -> AttentionConfig {
    AttentionConfig {
        arm_delay: Duration::from_secs(20),
        show_duration: Duration::from_secs(3),
        cooldown: Duration::from_secs(30),
    }
}

fn arb_event() -> impl Strategy<Value = AttentionEvent> {
    prop_oneof![
        Just(AttentionEvent::WidgetOpened),
        Just(AttentionEvent::WidgetClosed),
        any::<bool>().prop_map(|widget_open| AttentionEvent::Interacted { widget_open }),
        Just(AttentionEvent::TimerElapsed),
    ]
}

/// Track whether the widget is open as implied by the event stream.
fn widget_open_after(open: bool, event: AttentionEvent) -> bool {
    match event {
        AttentionEvent::WidgetOpened => true,
        AttentionEvent::WidgetClosed => false,
        AttentionEvent::Interacted { widget_open } => widget_open,
        AttentionEvent::TimerElapsed => open,
    }
}

proptest! {
    /// The prompt is never shown while the widget is open, across any
    /// sequence of opens, closes, interactions, and timer firings.
    #[test]
    fn never_shows_while_open(events in proptest::collection::vec(arb_event(), 0..64)) {
        let cfg = config();
        let mut state = AttentionState::Idle;
        let mut open = true;

        for event in events {
            open = widget_open_after(open, event);
            let (next, effects) = transition(state, &cfg, event);
            if effects.contains(&AttentionEffect::ShowPrompt) {
                prop_assert!(!open, "ShowPrompt emitted while widget open");
            }
            state = next;
        }
    }

    /// Every transition arms at most one timer.
    #[test]
    fn at_most_one_arm_per_transition(events in proptest::collection::vec(arb_event(), 0..64)) {
        let cfg = config();
        let mut state = AttentionState::Idle;

        for event in events {
            let (next, effects) = transition(state, &cfg, event);
            let arms = effects
                .iter()
                .filter(|e| matches!(e, AttentionEffect::Arm(_)))
                .count();
            prop_assert!(arms <= 1);
            state = next;
        }
    }

    /// Opening the widget always lands in Idle with nothing armed.
    #[test]
    fn opening_forces_idle(events in proptest::collection::vec(arb_event(), 0..32)) {
        let cfg = config();
        let mut state = AttentionState::Idle;
        for event in events {
            (state, _) = transition(state, &cfg, event);
        }

        let (state, effects) = transition(state, &cfg, AttentionEvent::WidgetOpened);
        prop_assert_eq!(state, AttentionState::Idle);
        prop_assert!(!effects.iter().any(|e| matches!(e, AttentionEffect::Arm(_))));
    }

    /// Idle only ever leaves via a close/interact-while-closed event, and
    /// the states a timer can fire in always re-arm — the cycle never
    /// stalls while the widget stays closed.
    #[test]
    fn closed_cycle_always_rearms(events in proptest::collection::vec(arb_event(), 0..64)) {
        let cfg = config();
        let mut state = AttentionState::Idle;

        for event in events {
            let (next, effects) = transition(state, &cfg, event);
            if next != AttentionState::Idle {
                prop_assert!(
                    effects.iter().any(|e| matches!(e, AttentionEffect::Arm(_))),
                    "non-idle state {:?} left without an armed timer",
                    next
                );
            }
            state = next;
        }
    }
}
