//! Hand-off from the chat loop to the itinerary flow
//!
//! After each assistant turn or suggestion click the runtime consults this
//! module: keep chatting, or leave the loop and emit structured trip data
//! to the external itinerary flow. The decisions are pure; the runtime owns
//! the channel send and the render delay.

use crate::assistant::{AssistantReply, HandoffSignal, TripForm};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Quick-reply label that re-opens the itinerary form from remembered
/// trip facts, skipping the network round-trip entirely.
pub const OPEN_ITINERARY_FORM_LABEL: &str = "Mở form tạo lịch trình";

/// Span of the synthesized default date range.
pub const DEFAULT_TRIP_SPAN_DAYS: i64 = 3;

/// Trip facts remembered in the session context between a form hand-off
/// and a later sentinel click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItinerary {
    pub destination: String,
    pub days: u32,
    pub budget: u64,
}

/// Payload of the single-shot emission consumed by the itinerary flow.
/// At most one is sent per hand-off event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandoffRequest {
    /// Open the itinerary form pre-filled with these parameters.
    Form { form: TripForm },
    /// Present a ready itinerary directly.
    Itinerary { itinerary: Value },
}

/// What a just-received reply asks for. The form signal outranks the
/// preview signal; both are emitted only after the render delay, which the
/// runtime owns.
pub fn on_assistant_reply(reply: &AssistantReply) -> Option<HandoffRequest> {
    match &reply.handoff {
        Some(HandoffSignal::OpenItineraryForm { form }) => Some(HandoffRequest::Form {
            form: form.clone(),
        }),
        Some(HandoffSignal::ItineraryPreview { itinerary }) => Some(HandoffRequest::Itinerary {
            itinerary: itinerary.clone(),
        }),
        None => None,
    }
}

/// Decision for a clicked suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionAction {
    /// Sentinel label with remembered facts: emit this form immediately,
    /// no gateway call.
    OpenForm(TripForm),
    /// Everything else: feed the label back as if the user typed it.
    Forward,
}

/// The sentinel check runs before the forward fallback — swapping the two
/// would make the shortcut unreachable.
pub fn on_suggestion_click(
    label: &str,
    pending: Option<&PendingItinerary>,
    today: NaiveDate,
) -> SuggestionAction {
    if label == OPEN_ITINERARY_FORM_LABEL {
        if let Some(facts) = pending {
            return SuggestionAction::OpenForm(synthesize_form(facts, today));
        }
    }
    SuggestionAction::Forward
}

/// Default trip dates (today through today + 3 days) merged with the
/// remembered facts.
pub fn synthesize_form(facts: &PendingItinerary, today: NaiveDate) -> TripForm {
    let end = today + chrono::Duration::days(DEFAULT_TRIP_SPAN_DAYS);
    TripForm {
        destination: facts.destination.clone(),
        days: facts.days,
        budget: facts.budget,
        start_date: Some(today.format("%Y-%m-%d").to_string()),
        end_date: Some(end.format("%Y-%m-%d").to_string()),
    }
}
