//! HTTP request handlers

use super::sse::ui_stream;
use super::types::{
    ErrorResponse, MessageRequest, QueuedResponse, SuggestionRequest, VersionResponse,
    WidgetCreatedResponse,
};
use super::AppState;
use crate::runtime::WidgetEvent;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Widget lifecycle
        .route("/api/widgets", post(create_widget))
        .route("/api/widgets/:id", delete(remove_widget))
        .route("/api/widgets/:id/open", post(open_widget))
        .route("/api/widgets/:id/close", post(close_widget))
        .route("/api/widgets/:id/toggle", post(toggle_widget))
        // Conversation
        .route("/api/widgets/:id/message", post(send_message))
        .route("/api/widgets/:id/suggestion", post(click_suggestion))
        // State for (re)connecting clients
        .route("/api/widgets/:id/snapshot", get(get_snapshot))
        .route("/api/widgets/:id/stream", get(stream_widget))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

fn not_found(error: String) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error })).into_response()
}

async fn dispatch(state: &AppState, widget_id: &str, event: WidgetEvent) -> Response {
    match state.widgets.send_event(widget_id, event).await {
        Ok(()) => Json(QueuedResponse { queued: true }).into_response(),
        Err(error) => not_found(error),
    }
}

async fn create_widget(State(state): State<AppState>) -> impl IntoResponse {
    let widget_id = state.widgets.create_widget().await;
    Json(WidgetCreatedResponse { widget_id })
}

async fn remove_widget(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.widgets.remove_widget(&id).await {
        Ok(()) => Json(QueuedResponse { queued: true }).into_response(),
        Err(error) => not_found(error),
    }
}

async fn open_widget(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    dispatch(&state, &id, WidgetEvent::Opened).await
}

async fn close_widget(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    dispatch(&state, &id, WidgetEvent::Closed).await
}

async fn toggle_widget(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    dispatch(&state, &id, WidgetEvent::ToggleInteracted).await
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Response {
    dispatch(&state, &id, WidgetEvent::UserMessage { text: request.text }).await
}

async fn click_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SuggestionRequest>,
) -> Response {
    dispatch(
        &state,
        &id,
        WidgetEvent::SuggestionClicked {
            label: request.label,
        },
    )
    .await
}

async fn get_snapshot(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.widgets.snapshot(&id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(error) => not_found(error),
    }
}

async fn stream_widget(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let snapshot = match state.widgets.snapshot(&id).await {
        Ok(snapshot) => snapshot,
        Err(error) => return not_found(error),
    };
    match state.widgets.subscribe(&id).await {
        Ok(broadcast_rx) => ui_stream(snapshot, broadcast_rx).into_response(),
        Err(error) => not_found(error),
    }
}

async fn get_version() -> impl IntoResponse {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}
