//! Server-Sent Events support

use crate::classifier::classify;
use crate::runtime::{SessionSnapshot, UiEvent};
use crate::session::{ChatMessage, Sender};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert a widget's broadcast stream to SSE, starting with an init
/// snapshot so reconnecting clients can rebuild their view.
pub fn ui_stream(
    snapshot: SessionSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<UiEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(init_event(snapshot)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(ui_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn init_event(snapshot: SessionSnapshot) -> Event {
    let data = json!({
        "type": "init",
        "session": snapshot,
    });
    Event::default().event("init").data(data.to_string())
}

fn ui_event_to_axum(event: UiEvent) -> Event {
    let (event_type, data) = match event {
        UiEvent::Message { message } => {
            let lines = rendered_lines(&message);
            (
                "message",
                json!({
                    "type": "message",
                    "message": message,
                    "lines": lines
                }),
            )
        }
        UiEvent::Typing { active } => (
            "typing",
            json!({
                "type": "typing",
                "active": active
            }),
        ),
        UiEvent::AttentionPrompt { visible } => (
            "attention",
            json!({
                "type": "attention",
                "visible": visible
            }),
        ),
        UiEvent::Unread { count } => (
            "unread",
            json!({
                "type": "unread",
                "count": count
            }),
        ),
        UiEvent::Handoff { request } => (
            "handoff",
            json!({
                "type": "handoff",
                "request": request
            }),
        ),
        UiEvent::Busy => (
            "busy",
            json!({
                "type": "busy"
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}

/// Assistant text is pre-classified line by line so the client renders
/// headings, time slots and cost items without parsing of its own.
fn rendered_lines(message: &ChatMessage) -> Option<Vec<Value>> {
    if message.sender != Sender::Assistant || message.is_error {
        return None;
    }
    Some(
        message
            .text
            .lines()
            .map(|line| {
                json!({
                    "text": line,
                    "category": classify(line)
                })
            })
            .collect(),
    )
}
