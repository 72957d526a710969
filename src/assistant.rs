//! Remote assistant gateway
//!
//! Provides the seam between the widget runtime and the travel-assistant
//! endpoint: a transport-neutral [`AssistantClient`] trait, the parsed
//! [`AssistantReply`] shape, and the HTTP implementation.

mod error;
mod http;
mod types;
mod wire;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::{EnvTokenProvider, HttpAssistantClient};
pub use types::*;
pub use wire::HistoryEntry;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface to the assistant endpoint.
///
/// `send` carries one turn: the user's text, the prior log in transport
/// shape, the session id, and the accumulated context. Implementations
/// classify every failure into a [`GatewayError`]; callers decide how to
/// surface it.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError>;
}

#[async_trait]
impl<T: AssistantClient + ?Sized> AssistantClient for Arc<T> {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError> {
        (**self).send(turn).await
    }
}

/// Supplies the bearer credential, read at call time.
///
/// A missing token does not block the call; the server decides whether an
/// unauthenticated request is acceptable.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Logging wrapper for assistant clients
pub struct LoggingClient {
    inner: Arc<dyn AssistantClient>,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn AssistantClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AssistantClient for LoggingClient {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError> {
        let start = std::time::Instant::now();
        let history_len = turn.history.len();
        let result = self.inner.send(turn).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    history_len,
                    suggestions = reply.suggestions.len(),
                    handoff = reply.handoff.is_some(),
                    "assistant turn completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    history_len,
                    kind = ?e.kind,
                    error = %e.message,
                    "assistant turn failed"
                );
            }
        }

        result
    }
}
