//! Mock implementations for testing
//!
//! These mocks enable controller testing without real I/O.

use super::SessionUpdate;
use crate::gateway::{
    Answer, DocumentReceipt, GatewayError, HealthStatus, RequestGateway, VideoReceipt,
};
use crate::source::DocumentFile;
use crate::state_machine::SessionView;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Notify};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A call the mock gateway received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SubmitDocument { name: String },
    SubmitVideo { url: String },
    Ask { question: String },
    Health,
}

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock gateway that returns queued outcomes.
///
/// Documents succeed by default with a receipt built from the file. Videos
/// and answers fail as unreachable when nothing is queued.
pub struct MockGateway {
    documents: Mutex<VecDeque<Result<DocumentReceipt, GatewayError>>>,
    videos: Mutex<VecDeque<Result<VideoReceipt, GatewayError>>>,
    answers: Mutex<VecDeque<Result<Answer, GatewayError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<GatewayCall>>,
    /// When set, every call waits for one permit before resolving
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(VecDeque::new()),
            videos: Mutex::new(VecDeque::new()),
            answers: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn queue_document(&self, outcome: Result<DocumentReceipt, GatewayError>) {
        self.documents.lock().unwrap().push_back(outcome);
    }

    pub fn queue_video(&self, outcome: Result<VideoReceipt, GatewayError>) {
        self.videos.lock().unwrap().push_back(outcome);
    }

    pub fn queue_answer(&self, outcome: Result<Answer, GatewayError>) {
        self.answers.lock().unwrap().push_back(outcome);
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestGateway for MockGateway {
    async fn submit_document(&self, file: &DocumentFile) -> Result<DocumentReceipt, GatewayError> {
        self.record(GatewayCall::SubmitDocument {
            name: file.name.clone(),
        });
        self.pass_gate().await;
        let queued = self.documents.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(DocumentReceipt {
                name: file.name.clone(),
                size_bytes: file.size_bytes(),
            })
        })
    }

    async fn submit_video(&self, url: &str) -> Result<VideoReceipt, GatewayError> {
        self.record(GatewayCall::SubmitVideo {
            url: url.to_string(),
        });
        self.pass_gate().await;
        let queued = self.videos.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Err(GatewayError::unreachable("No mock response queued")))
    }

    async fn ask(&self, question: &str) -> Result<Answer, GatewayError> {
        self.record(GatewayCall::Ask {
            question: question.to_string(),
        });
        self.pass_gate().await;
        let queued = self.answers.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Err(GatewayError::unreachable("No mock response queued")))
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.record(GatewayCall::Health);
        Ok(HealthStatus {
            status: "running".to_string(),
            vectorstore_loaded: false,
            source: None,
        })
    }
}

// ============================================================================
// Waiting helpers
// ============================================================================

/// Wait until the published view satisfies `predicate`
pub async fn wait_for_view(
    views: &mut watch::Receiver<SessionView>,
    predicate: impl FnMut(&SessionView) -> bool,
) -> SessionView {
    let view = tokio::time::timeout(WAIT_TIMEOUT, views.wait_for(predicate))
        .await
        .expect("timed out waiting for view")
        .expect("controller dropped its view channel");
    (*view).clone()
}

/// Skip view updates until the next notice arrives
pub async fn next_notice(updates: &mut broadcast::Receiver<SessionUpdate>) -> String {
    loop {
        let update = tokio::time::timeout(WAIT_TIMEOUT, updates.recv())
            .await
            .expect("timed out waiting for notice")
            .expect("update channel closed");
        if let SessionUpdate::Notice { message } = update {
            return message;
        }
    }
}
