//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Request to click a quick-reply suggestion
#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub label: String,
}

/// Response for widget creation
#[derive(Debug, Serialize)]
pub struct WidgetCreatedResponse {
    pub widget_id: String,
}

/// Response for accepted widget events
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build version
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
