//! Parsed gateway types
//!
//! [`TurnRequest`] is what the runtime hands the client; [`AssistantReply`]
//! is the normalized result every implementation produces, transport
//! details already stripped.

use super::wire::HistoryEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One outbound turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// The user's text. Non-empty; blank input is dropped before it gets here.
    pub message: String,
    /// The log *prior to* this message, in transport shape.
    pub history: Vec<HistoryEntry>,
    pub session_id: String,
    pub context: Map<String, Value>,
}

/// Normalized assistant reply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantReply {
    pub text: String,
    pub suggestions: Vec<String>,
    /// Replacement context; merged over the session's map key by key.
    pub context: Map<String, Value>,
    pub handoff: Option<HandoffSignal>,
    /// Server-assigned session id, adopted by the caller when it differs.
    pub session_id: Option<String>,
}

#[allow(dead_code)] // Reply builders, used by tests and mock clients
impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn with_handoff(mut self, handoff: HandoffSignal) -> Self {
        self.handoff = Some(handoff);
        self
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }
}

/// Instruction to leave the chat loop for the itinerary flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandoffSignal {
    /// Open the itinerary form pre-filled with `form`.
    OpenItineraryForm { form: TripForm },
    /// A ready itinerary to present directly, no form step.
    ItineraryPreview { itinerary: Value },
}

/// Structured trip parameters for the itinerary flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripForm {
    pub destination: String,
    pub days: u32,
    pub budget: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}
