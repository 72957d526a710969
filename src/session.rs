//! Conversation session state
//!
//! One [`Session`] exists per widget lifetime. It owns the session id, the
//! append-only message log, and the context map the backend accumulates
//! across turns. Nothing here touches the network or timers; the runtime
//! drives all mutation from its event loop.

use crate::assistant::{AssistantReply, HandoffSignal, HistoryEntry, TripForm};
use crate::handoff::PendingItinerary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Greeting seeded into a fresh session.
pub const GREETING_TEXT: &str =
    "Xin chào! Mình là trợ lý du lịch của TripMate. Bạn muốn đi đâu trong chuyến tới?";

/// Quick replies attached to the greeting.
pub const STARTER_SUGGESTIONS: &[&str] = &[
    "Gợi ý địa điểm du lịch",
    "Tìm khách sạn giá tốt",
    "Lập lịch trình cho chuyến đi",
];

/// The one user-facing apology for any gateway failure.
pub const ERROR_REPLY_TEXT: &str =
    "Xin lỗi, mình đang gặp chút trục trặc khi kết nối. Bạn thử lại sau ít phút nhé!";

/// Reserved context key holding the trip facts of a pending form hand-off.
pub const PENDING_ITINERARY_KEY: &str = "pendingItinerary";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the message log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffSignal>,
    pub is_error: bool,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            created_at: Utc::now(),
            suggestions: Vec::new(),
            handoff: None,
            is_error: false,
        }
    }
}

/// Session state: id, ordered log, accumulated context, open flag.
#[derive(Debug, Default)]
pub struct Session {
    id: Option<String>,
    messages: Vec<ChatMessage>,
    context: Map<String, Value>,
    is_open: bool,
    unread: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn unread(&self) -> u32 {
        self.unread
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Open the widget. On the very first open the session id is generated
    /// and the greeting (with starter suggestions) is seeded; afterwards
    /// this only flips `is_open` and clears the unread counter. Returns
    /// whether the session was newly seeded.
    pub fn open(&mut self) -> bool {
        let seeded = if self.id.is_none() {
            self.id = Some(uuid::Uuid::new_v4().to_string());
            let mut greeting = ChatMessage::new(Sender::Assistant, GREETING_TEXT);
            greeting.suggestions = STARTER_SUGGESTIONS.iter().map(ToString::to_string).collect();
            self.messages.push(greeting);
            true
        } else {
            false
        };
        self.is_open = true;
        self.unread = 0;
        seeded
    }

    /// Collapse the widget. The log and id stay; only `is_open` flips.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Append a user message. Empty or whitespace-only text is dropped
    /// without trace (`None`) — it is not an error.
    pub fn append_user_message(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let message = ChatMessage::new(Sender::User, text);
        self.messages.push(message.clone());
        Some(message)
    }

    /// Append the assistant's reply and merge its context over ours,
    /// key by key (overwrite, not deep-merge).
    pub fn append_assistant_reply(&mut self, reply: &AssistantReply) -> ChatMessage {
        for (key, value) in &reply.context {
            self.context.insert(key.clone(), value.clone());
        }

        let mut message = ChatMessage::new(Sender::Assistant, reply.text.as_str());
        message.suggestions = reply.suggestions.clone();
        message.handoff = reply.handoff.clone();
        self.push_assistant(message)
    }

    /// Append the fixed apology as a synthetic assistant message.
    pub fn append_error_message(&mut self) -> ChatMessage {
        let mut message = ChatMessage::new(Sender::Assistant, ERROR_REPLY_TEXT);
        message.is_error = true;
        self.push_assistant(message)
    }

    fn push_assistant(&mut self, message: ChatMessage) -> ChatMessage {
        if !self.is_open {
            self.unread += 1;
        }
        self.messages.push(message.clone());
        message
    }

    /// Adopt a server-assigned session id. The one id change permitted
    /// after the log is non-empty.
    pub fn adopt_session_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!(session_id = %id, "adopting server-assigned session id");
        self.id = Some(id);
    }

    /// The log mapped to the transport shape: sender kind, text, timestamp.
    /// Suggestions and hand-off payloads do not travel.
    pub fn transport_history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|m| HistoryEntry::new(m.sender, m.text.as_str(), m.created_at))
            .collect()
    }

    /// Trip facts of a pending form hand-off, if present. A JSON `null`
    /// under the key counts as absent.
    pub fn pending_itinerary(&self) -> Option<PendingItinerary> {
        self.context
            .get(PENDING_ITINERARY_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Single-read variant: returns the facts and removes the key.
    pub fn take_pending_itinerary(&mut self) -> Option<PendingItinerary> {
        self.context
            .remove(PENDING_ITINERARY_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Remember the trip facts behind a form hand-off for later reuse.
    pub fn store_pending_itinerary(&mut self, form: &TripForm) {
        let facts = PendingItinerary {
            destination: form.destination.clone(),
            days: form.days,
            budget: form.budget,
        };
        self.context.insert(
            PENDING_ITINERARY_KEY.to_string(),
            serde_json::to_value(facts).unwrap_or(Value::Null),
        );
    }
}
