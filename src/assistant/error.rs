//! Gateway error types

use thiserror::Error;

/// Gateway error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Http, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Malformed, message)
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Assistant, message)
    }
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Endpoint unreachable, connection reset, timeout
    Network,
    /// Non-2xx status from the endpoint
    Http,
    /// Response body did not parse into the expected shape
    Malformed,
    /// Well-formed response with `success == false`
    Assistant,
}
