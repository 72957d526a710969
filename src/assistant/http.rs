//! HTTP implementation of the assistant client

use super::wire::{WireRequest, WireResponse};
use super::{AssistantClient, AssistantReply, GatewayError, TokenProvider, TurnRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Assistant client over HTTP.
pub struct HttpAssistantClient {
    client: Client,
    endpoint: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl HttpAssistantClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.into(),
            token_provider,
        }
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn send(&self, turn: TurnRequest) -> Result<AssistantReply, GatewayError> {
        let request = WireRequest::from_turn(turn);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        // Token is fetched per call; without one the request still goes
        // out and the server decides.
        if let Some(token) = self.token_provider.bearer_token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::network(format!("assistant endpoint unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("failed reading response body: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let wire: WireResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::malformed(format!("invalid assistant response: {e}")))?;
        wire.into_reply()
    }
}

fn classify_status(status: reqwest::StatusCode, body: &str) -> GatewayError {
    match status.as_u16() {
        401 | 403 => GatewayError::http(format!("authentication rejected ({status}): {body}")),
        429 => GatewayError::http(format!("rate limited: {body}")),
        500..=599 => GatewayError::http(format!("assistant server error ({status}): {body}")),
        _ => GatewayError::http(format!("unexpected status {status}: {body}")),
    }
}

/// Reads the bearer token from an environment variable at call time.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}
