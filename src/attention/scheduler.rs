//! Timer driver for the attention cycle
//!
//! Owns the single pending timer. Every applied event cancels whatever is
//! armed before the transition runs, so two timers can never be alive at
//! once, and dropping the scheduler mid-cycle leaks no callback.

use super::{transition, AttentionConfig, AttentionEffect, AttentionEvent, AttentionState};
use crate::runtime::WidgetEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct AttentionScheduler {
    state: AttentionState,
    config: AttentionConfig,
    /// Bumped on every cancellation; elapsed events carrying an older
    /// generation are already-dead callbacks and are dropped.
    generation: u64,
    timer: Option<(CancellationToken, JoinHandle<()>)>,
    event_tx: mpsc::Sender<WidgetEvent>,
}

impl AttentionScheduler {
    pub fn new(config: AttentionConfig, event_tx: mpsc::Sender<WidgetEvent>) -> Self {
        Self {
            state: AttentionState::Idle,
            config,
            generation: 0,
            timer: None,
            event_tx,
        }
    }

    #[allow(dead_code)] // State query utility
    pub fn state(&self) -> AttentionState {
        self.state
    }

    /// Apply one event. Arms/cancels timers internally and returns only the
    /// visibility effects for the caller to broadcast.
    pub fn apply(&mut self, event: AttentionEvent) -> Vec<AttentionEffect> {
        self.cancel_timer();
        let (next, effects) = transition(self.state, &self.config, event);
        tracing::debug!(from = ?self.state, to = ?next, event = ?event, "attention transition");
        self.state = next;

        let mut visibility = Vec::new();
        for effect in effects {
            match effect {
                AttentionEffect::Arm(delay) => self.arm(delay),
                other => visibility.push(other),
            }
        }
        visibility
    }

    /// Handle a fired timer. Stale generations (armed before the most
    /// recent cancellation) are dropped without touching the machine.
    pub fn timer_elapsed(&mut self, generation: u64) -> Vec<AttentionEffect> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale attention timer");
            return Vec::new();
        }
        self.apply(AttentionEvent::TimerElapsed)
    }

    fn arm(&mut self, delay: std::time::Duration) {
        let generation = self.generation;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(WidgetEvent::AttentionElapsed { generation }).await;
                }
                () = cancelled.cancelled() => {}
            }
        });
        self.timer = Some((token, handle));
    }

    fn cancel_timer(&mut self) {
        self.generation += 1;
        if let Some((token, handle)) = self.timer.take() {
            token.cancel();
            handle.abort();
        }
    }
}

impl Drop for AttentionScheduler {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
