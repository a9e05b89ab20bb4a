//! Gateway error types

use thiserror::Error;

/// Failure of a single round trip to the answering service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unreachable, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Rejected, message)
    }

    pub fn is_rejected(&self) -> bool {
        self.kind == GatewayErrorKind::Rejected
    }
}

/// Error classification for user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Connect failure, timeout, unreadable or malformed response
    Unreachable,
    /// The service answered with a non-success status
    Rejected,
}

impl GatewayErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GatewayErrorKind::Unreachable => "unreachable",
            GatewayErrorKind::Rejected => "rejected",
        }
    }
}
