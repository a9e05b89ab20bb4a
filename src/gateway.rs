//! Request gateway to the answering service
//!
//! Every operation is a single round trip that resolves to a typed outcome.
//! Transport faults never escape as panics; callers always get a `Result`.

mod error;
mod http;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;

use crate::source::DocumentFile;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Text used when the service answers without an answer
pub const NO_RESPONSE_FALLBACK: &str = "No response received.";

/// Acknowledged document upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReceipt {
    pub name: String,
    pub size_bytes: u64,
}

/// Acknowledged transcript load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReceipt {
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

/// Backend health as reported by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub vectorstore_loaded: bool,
    #[serde(default)]
    pub source: Option<String>,
}

/// Outbound operations against the answering service
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Upload a document to become the active source
    async fn submit_document(&self, file: &DocumentFile) -> Result<DocumentReceipt, GatewayError>;

    /// Ask the service to load a video transcript as the active source
    async fn submit_video(&self, url: &str) -> Result<VideoReceipt, GatewayError>;

    /// Ask a question about the active source
    async fn ask(&self, question: &str) -> Result<Answer, GatewayError>;

    /// Probe the service. Read-only, never part of a session transition.
    async fn health(&self) -> Result<HealthStatus, GatewayError>;
}

#[async_trait]
impl<T: RequestGateway + ?Sized> RequestGateway for Arc<T> {
    async fn submit_document(&self, file: &DocumentFile) -> Result<DocumentReceipt, GatewayError> {
        (**self).submit_document(file).await
    }

    async fn submit_video(&self, url: &str) -> Result<VideoReceipt, GatewayError> {
        (**self).submit_video(url).await
    }

    async fn ask(&self, question: &str) -> Result<Answer, GatewayError> {
        (**self).ask(question).await
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        (**self).health().await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn RequestGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn RequestGateway>) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &str, start: Instant, result: &Result<T, GatewayError>) {
    let duration = start.elapsed();
    match result {
        Ok(_) => {
            tracing::info!(
                operation,
                duration_ms = %duration.as_millis(),
                "Gateway request completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                operation,
                duration_ms = %duration.as_millis(),
                kind = e.kind.as_str(),
                error = %e.message,
                "Gateway request failed"
            );
        }
    }
}

#[async_trait]
impl RequestGateway for LoggingGateway {
    async fn submit_document(&self, file: &DocumentFile) -> Result<DocumentReceipt, GatewayError> {
        let start = Instant::now();
        let result = self.inner.submit_document(file).await;
        log_outcome("submit_document", start, &result);
        result
    }

    async fn submit_video(&self, url: &str) -> Result<VideoReceipt, GatewayError> {
        let start = Instant::now();
        let result = self.inner.submit_video(url).await;
        log_outcome("submit_video", start, &result);
        result
    }

    async fn ask(&self, question: &str) -> Result<Answer, GatewayError> {
        let start = Instant::now();
        let result = self.inner.ask(question).await;
        log_outcome("ask", start, &result);
        result
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let start = Instant::now();
        let result = self.inner.health().await;
        log_outcome("health", start, &result);
        result
    }
}
