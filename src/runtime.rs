//! Widget runtimes and their manager
//!
//! One tokio task owns each widget's state (session, attention cycle,
//! in-flight flag) and is driven through an mpsc event channel; everything
//! user-visible leaves through a broadcast channel the SSE layer subscribes
//! to. Itinerary hand-offs ride their own single-shot mpsc channel so the
//! core never depends on whatever consumes them.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::WidgetRuntime;

use crate::assistant::{AssistantClient, AssistantReply, GatewayError};
use crate::attention::AttentionConfig;
use crate::handoff::HandoffRequest;
use crate::session::ChatMessage;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Timing knobs a widget runtime needs.
#[derive(Debug, Clone, Copy)]
pub struct WidgetConfig {
    pub attention: AttentionConfig,
    /// Pause between a hand-off reply rendering and the itinerary flow
    /// opening, so the user sees the assistant's answer first.
    pub handoff_delay: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            attention: AttentionConfig::default(),
            handoff_delay: Duration::from_millis(400),
        }
    }
}

/// Events driving a widget runtime.
pub enum WidgetEvent {
    /// The widget was expanded.
    Opened,
    /// The widget was collapsed.
    Closed,
    /// The user touched the toggle control.
    ToggleInteracted,
    /// The user submitted text.
    UserMessage { text: String },
    /// The user clicked a quick-reply chip.
    SuggestionClicked { label: String },
    /// Internal: the spawned gateway call finished.
    AssistantReplied { reply: AssistantReply },
    /// Internal: the spawned gateway call failed.
    AssistantFailed { error: GatewayError },
    /// Internal: an attention timer fired.
    AttentionElapsed { generation: u64 },
    /// Internal: the hand-off render delay elapsed.
    HandoffDue { request: HandoffRequest },
    /// Reply with the current session state.
    Snapshot {
        reply_tx: oneshot::Sender<SessionSnapshot>,
    },
    /// Stop the runtime and release its timers.
    Shutdown,
}

impl fmt::Debug for WidgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetEvent::Opened => write!(f, "Opened"),
            WidgetEvent::Closed => write!(f, "Closed"),
            WidgetEvent::ToggleInteracted => write!(f, "ToggleInteracted"),
            WidgetEvent::UserMessage { text } => {
                f.debug_struct("UserMessage").field("text", text).finish()
            }
            WidgetEvent::SuggestionClicked { label } => f
                .debug_struct("SuggestionClicked")
                .field("label", label)
                .finish(),
            WidgetEvent::AssistantReplied { reply } => f
                .debug_struct("AssistantReplied")
                .field("reply", reply)
                .finish(),
            WidgetEvent::AssistantFailed { error } => f
                .debug_struct("AssistantFailed")
                .field("error", error)
                .finish(),
            WidgetEvent::AttentionElapsed { generation } => f
                .debug_struct("AttentionElapsed")
                .field("generation", generation)
                .finish(),
            WidgetEvent::HandoffDue { request } => f
                .debug_struct("HandoffDue")
                .field("request", request)
                .finish(),
            WidgetEvent::Snapshot { .. } => write!(f, "Snapshot"),
            WidgetEvent::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Events sent to UI subscribers.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A message was appended to the log.
    Message { message: ChatMessage },
    /// The typing indicator changed.
    Typing { active: bool },
    /// The attention tooltip became visible/hidden.
    AttentionPrompt { visible: bool },
    /// Unread counter changed (messages arriving while collapsed).
    Unread { count: u32 },
    /// A hand-off left the chat loop (bridged from the hand-off channel).
    Handoff { request: HandoffRequest },
    /// A send was rejected because a turn is already in flight.
    Busy,
}

/// Point-in-time view of a widget, for reconnecting clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub is_open: bool,
    pub typing: bool,
    pub unread: u32,
    pub messages: Vec<ChatMessage>,
}

/// Handle to interact with a running widget
pub struct WidgetHandle {
    pub event_tx: mpsc::Sender<WidgetEvent>,
    pub broadcast_tx: broadcast::Sender<UiEvent>,
}

/// Manager for all widget runtimes
pub struct WidgetManager {
    config: WidgetConfig,
    client: Arc<dyn AssistantClient>,
    widgets: RwLock<HashMap<String, WidgetHandle>>,
}

impl WidgetManager {
    pub fn new(config: WidgetConfig, client: Arc<dyn AssistantClient>) -> Self {
        Self {
            config,
            client,
            widgets: RwLock::new(HashMap::new()),
        }
    }

    /// Create a widget runtime and return its id.
    pub async fn create_widget(&self) -> String {
        let widget_id = uuid::Uuid::new_v4().to_string();
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (handoff_tx, mut handoff_rx) = mpsc::channel(8);

        // Bridge hand-off emissions onto the widget's UI stream; the
        // itinerary flow lives in the browser and listens over SSE.
        let bridge_tx = broadcast_tx.clone();
        let bridge_id = widget_id.clone();
        tokio::spawn(async move {
            while let Some(request) = handoff_rx.recv().await {
                tracing::info!(widget_id = %bridge_id, "itinerary hand-off");
                let _ = bridge_tx.send(UiEvent::Handoff { request });
            }
        });

        let runtime = WidgetRuntime::new(
            self.config,
            Arc::clone(&self.client),
            event_rx,
            event_tx.clone(),
            broadcast_tx.clone(),
            handoff_tx,
        );
        let run_id = widget_id.clone();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(widget_id = %run_id, "widget runtime finished");
        });

        self.widgets.write().await.insert(
            widget_id.clone(),
            WidgetHandle {
                event_tx,
                broadcast_tx,
            },
        );

        tracing::info!(widget_id = %widget_id, "widget created");
        widget_id
    }

    /// Send an event to a widget.
    pub async fn send_event(&self, widget_id: &str, event: WidgetEvent) -> Result<(), String> {
        let widgets = self.widgets.read().await;
        let handle = widgets
            .get(widget_id)
            .ok_or_else(|| format!("unknown widget: {widget_id}"))?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }

    /// Subscribe to a widget's UI stream.
    pub async fn subscribe(&self, widget_id: &str) -> Result<broadcast::Receiver<UiEvent>, String> {
        let widgets = self.widgets.read().await;
        let handle = widgets
            .get(widget_id)
            .ok_or_else(|| format!("unknown widget: {widget_id}"))?;
        Ok(handle.broadcast_tx.subscribe())
    }

    /// Current state of a widget (by message passing; the runtime owns it).
    pub async fn snapshot(&self, widget_id: &str) -> Result<SessionSnapshot, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send_event(widget_id, WidgetEvent::Snapshot { reply_tx })
            .await?;
        reply_rx
            .await
            .map_err(|_| "widget stopped before replying".to_string())
    }

    /// Tear a widget down: stops its runtime (releasing any pending
    /// attention timer) and forgets the handle.
    pub async fn remove_widget(&self, widget_id: &str) -> Result<(), String> {
        self.send_event(widget_id, WidgetEvent::Shutdown).await?;
        self.widgets.write().await.remove(widget_id);
        Ok(())
    }
}
