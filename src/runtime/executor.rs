//! Widget runtime executor
//!
//! Owns one session end to end: seeds it on open, serializes gateway
//! turns, absorbs gateway failures into the log, drives the attention
//! cycle, and emits itinerary hand-offs. All mutation happens on this
//! task; the outside world only ever sees events.

use super::{SessionSnapshot, UiEvent, WidgetConfig, WidgetEvent};
use crate::assistant::{AssistantClient, AssistantReply, GatewayError, TurnRequest};
use crate::attention::{AttentionEffect, AttentionEvent, AttentionScheduler};
use crate::handoff::{self, HandoffRequest, SuggestionAction};
use crate::session::Session;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

pub struct WidgetRuntime<C: AssistantClient + 'static> {
    config: WidgetConfig,
    session: Session,
    scheduler: AttentionScheduler,
    client: Arc<C>,
    event_rx: mpsc::Receiver<WidgetEvent>,
    event_tx: mpsc::Sender<WidgetEvent>,
    broadcast_tx: broadcast::Sender<UiEvent>,
    handoff_tx: mpsc::Sender<HandoffRequest>,
    /// At most one gateway call may be outstanding; sends arriving in the
    /// meantime are rejected so the log stays in strict append order.
    in_flight: bool,
}

impl<C: AssistantClient + 'static> WidgetRuntime<C> {
    pub fn new(
        config: WidgetConfig,
        client: C,
        event_rx: mpsc::Receiver<WidgetEvent>,
        event_tx: mpsc::Sender<WidgetEvent>,
        broadcast_tx: broadcast::Sender<UiEvent>,
        handoff_tx: mpsc::Sender<HandoffRequest>,
    ) -> Self {
        let scheduler = AttentionScheduler::new(config.attention, event_tx.clone());
        Self {
            config,
            session: Session::new(),
            scheduler,
            client: Arc::new(client),
            event_rx,
            event_tx,
            broadcast_tx,
            handoff_tx,
            in_flight: false,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("starting widget runtime");

        while let Some(event) = self.event_rx.recv().await {
            if matches!(event, WidgetEvent::Shutdown) {
                break;
            }
            self.process_event(event).await;
        }

        // Dropping the scheduler aborts any pending attention timer.
        tracing::info!("widget runtime stopped");
    }

    async fn process_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Opened => {
                let seeded = self.session.open();
                if seeded {
                    if let Some(greeting) = self.session.messages().last().cloned() {
                        self.broadcast(UiEvent::Message { message: greeting });
                    }
                }
                self.broadcast(UiEvent::Unread { count: 0 });
                self.apply_attention(AttentionEvent::WidgetOpened);
            }

            WidgetEvent::Closed => {
                self.session.close();
                self.apply_attention(AttentionEvent::WidgetClosed);
            }

            WidgetEvent::ToggleInteracted => {
                let widget_open = self.session.is_open();
                self.apply_attention(AttentionEvent::Interacted { widget_open });
            }

            WidgetEvent::UserMessage { text } => self.handle_user_text(&text).await,

            WidgetEvent::SuggestionClicked { label } => {
                let pending = self.session.pending_itinerary();
                let today = Utc::now().date_naive();
                match handoff::on_suggestion_click(&label, pending.as_ref(), today) {
                    SuggestionAction::OpenForm(form) => {
                        // The remembered facts are good for one shortcut.
                        self.session.take_pending_itinerary();
                        self.emit_handoff(HandoffRequest::Form { form }).await;
                    }
                    SuggestionAction::Forward => self.handle_user_text(&label).await,
                }
            }

            WidgetEvent::AssistantReplied { reply } => self.handle_reply(reply),

            WidgetEvent::AssistantFailed { error } => self.handle_failure(&error),

            WidgetEvent::AttentionElapsed { generation } => {
                let effects = self.scheduler.timer_elapsed(generation);
                self.broadcast_attention(&effects);
            }

            WidgetEvent::HandoffDue { request } => self.emit_handoff(request).await,

            WidgetEvent::Snapshot { reply_tx } => {
                let _ = reply_tx.send(self.snapshot());
            }

            // Handled in `run` before dispatch.
            WidgetEvent::Shutdown => {}
        }
    }

    /// One user turn: append, flip the typing indicator on, and spawn the
    /// gateway call. The result comes back as an event on our own channel.
    async fn handle_user_text(&mut self, text: &str) {
        if self.in_flight {
            tracing::warn!("send rejected: a turn is already in flight");
            self.broadcast(UiEvent::Busy);
            return;
        }

        // A send into a never-opened widget still initializes the session.
        if self.session.id().is_none() {
            self.session.open();
        }

        // History is the log *before* this message.
        let history = self.session.transport_history();
        let Some(message) = self.session.append_user_message(text) else {
            return; // blank input is dropped, not an error
        };
        self.broadcast(UiEvent::Message { message });

        self.in_flight = true;
        self.broadcast(UiEvent::Typing { active: true });

        let turn = TurnRequest {
            message: text.to_string(),
            history,
            session_id: self.session.id().unwrap_or_default().to_string(),
            context: self.session.context().clone(),
        };
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match client.send(turn).await {
                Ok(reply) => WidgetEvent::AssistantReplied { reply },
                Err(error) => WidgetEvent::AssistantFailed { error },
            };
            let _ = tx.send(event).await;
        });
    }

    fn handle_reply(&mut self, reply: AssistantReply) {
        self.in_flight = false;
        self.broadcast(UiEvent::Typing { active: false });

        // Server-assigned session ids win over ours.
        if let Some(server_id) = reply.session_id.as_deref() {
            if self.session.id() != Some(server_id) {
                self.session.adopt_session_id(server_id);
            }
        }

        let message = self.session.append_assistant_reply(&reply);
        self.broadcast(UiEvent::Message { message });
        if !self.session.is_open() {
            self.broadcast(UiEvent::Unread {
                count: self.session.unread(),
            });
        }

        if let Some(request) = handoff::on_assistant_reply(&reply) {
            if let HandoffRequest::Form { form } = &request {
                // Keep the trip facts around for the sentinel shortcut.
                self.session.store_pending_itinerary(form);
            }
            self.schedule_handoff(request);
        }
    }

    /// Every gateway failure lands here and becomes exactly one apology
    /// message; the typing indicator is cleared on this path too.
    fn handle_failure(&mut self, error: &GatewayError) {
        self.in_flight = false;
        self.broadcast(UiEvent::Typing { active: false });

        tracing::warn!(kind = ?error.kind, error = %error.message, "assistant turn failed");
        let message = self.session.append_error_message();
        self.broadcast(UiEvent::Message { message });
        if !self.session.is_open() {
            self.broadcast(UiEvent::Unread {
                count: self.session.unread(),
            });
        }
    }

    /// Let the reply render before the itinerary flow takes over.
    fn schedule_handoff(&self, request: HandoffRequest) {
        let delay = self.config.handoff_delay;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(WidgetEvent::HandoffDue { request }).await;
        });
    }

    async fn emit_handoff(&self, request: HandoffRequest) {
        if self.handoff_tx.send(request).await.is_err() {
            tracing::warn!("itinerary hand-off dropped: no consumer");
        }
    }

    fn apply_attention(&mut self, event: AttentionEvent) {
        let effects = self.scheduler.apply(event);
        self.broadcast_attention(&effects);
    }

    fn broadcast_attention(&self, effects: &[AttentionEffect]) {
        for effect in effects {
            let visible = matches!(effect, AttentionEffect::ShowPrompt);
            self.broadcast(UiEvent::AttentionPrompt { visible });
        }
    }

    fn broadcast(&self, event: UiEvent) {
        // No subscribers is fine; SSE clients come and go.
        let _ = self.broadcast_tx.send(event);
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session.id().map(ToString::to_string),
            is_open: self.session.is_open(),
            typing: self.in_flight,
            unread: self.session.unread(),
            messages: self.session.messages().to_vec(),
        }
    }
}
