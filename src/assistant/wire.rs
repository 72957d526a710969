//! Wire format for the assistant endpoint
//!
//! The endpoint speaks a flat JSON shape; this module owns the serde types
//! and the normalization of a raw response into an [`AssistantReply`].

use super::types::{AssistantReply, HandoffSignal, TripForm};
use super::GatewayError;
use crate::session::Sender;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One prior message in transport shape. Suggestions, hand-off payloads and
/// error flags are stripped before transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn new(sender: Sender, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        let kind = match sender {
            Sender::User => "user",
            Sender::Assistant => "bot",
        };
        Self {
            kind: kind.to_string(),
            content: content.into(),
            timestamp: at.to_rfc3339(),
        }
    }
}

/// Request body for the assistant endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryEntry>,
    pub conversation_id: String,
    pub context: Map<String, Value>,
}

impl WireRequest {
    pub fn from_turn(turn: super::TurnRequest) -> Self {
        Self {
            message: turn.message,
            conversation_history: turn.history,
            conversation_id: turn.session_id,
            context: turn.context,
        }
    }
}

/// Raw response body from the assistant endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WireResponse {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub itinerary_data: Option<Value>,
    #[serde(default)]
    pub open_ai_modal: bool,
    #[serde(default)]
    pub form_data: Option<Value>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Error detail when `success == false`.
    #[serde(default)]
    pub message: Option<String>,
}

impl WireResponse {
    /// Normalize into an [`AssistantReply`].
    ///
    /// The form hand-off outranks the preview hand-off when a response
    /// carries both. A modal flag with unusable `form_data` is a protocol
    /// violation, not something to guess around.
    pub fn into_reply(self) -> Result<AssistantReply, GatewayError> {
        if !self.success {
            let detail = self
                .message
                .unwrap_or_else(|| "assistant reported failure without detail".to_string());
            return Err(GatewayError::assistant(detail));
        }

        let handoff = match (self.open_ai_modal, self.form_data, self.itinerary_data) {
            (true, Some(value), _) => {
                let form: TripForm = serde_json::from_value(value)
                    .map_err(|e| GatewayError::malformed(format!("unusable form_data: {e}")))?;
                Some(HandoffSignal::OpenItineraryForm { form })
            }
            (_, _, Some(itinerary)) => Some(HandoffSignal::ItineraryPreview { itinerary }),
            _ => None,
        };

        Ok(AssistantReply {
            text: self.response,
            suggestions: self.suggestions,
            context: self.context.unwrap_or_default(),
            handoff,
            session_id: self.conversation_id,
        })
    }
}
