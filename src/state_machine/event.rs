//! Events that can occur in a session

use crate::gateway::{Answer, DocumentReceipt, GatewayError, VideoReceipt};
use crate::source::DocumentFile;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User intents
    SubmitDocument {
        file: DocumentFile,
    },
    SubmitVideo {
        url: String,
    },
    SendQuestion {
        text: String,
    },
    ClearSource,

    // Gateway outcomes
    DocumentAttached {
        receipt: DocumentReceipt,
    },
    DocumentFailed {
        error: GatewayError,
    },
    VideoAttached {
        receipt: VideoReceipt,
    },
    VideoFailed {
        error: GatewayError,
    },
    AnswerReceived {
        answer: Answer,
    },
    AskFailed {
        error: GatewayError,
    },
}

impl Event {
    pub fn document_outcome(outcome: Result<DocumentReceipt, GatewayError>) -> Self {
        match outcome {
            Ok(receipt) => Event::DocumentAttached { receipt },
            Err(error) => Event::DocumentFailed { error },
        }
    }

    pub fn video_outcome(outcome: Result<VideoReceipt, GatewayError>) -> Self {
        match outcome {
            Ok(receipt) => Event::VideoAttached { receipt },
            Err(error) => Event::VideoFailed { error },
        }
    }

    pub fn answer_outcome(outcome: Result<Answer, GatewayError>) -> Self {
        match outcome {
            Ok(answer) => Event::AnswerReceived { answer },
            Err(error) => Event::AskFailed { error },
        }
    }

    /// True for events that originate from the user rather than the gateway
    pub fn is_user_intent(&self) -> bool {
        matches!(
            self,
            Event::SubmitDocument { .. }
                | Event::SubmitVideo { .. }
                | Event::SendQuestion { .. }
                | Event::ClearSource
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitDocument { .. } => "submit_document",
            Event::SubmitVideo { .. } => "submit_video",
            Event::SendQuestion { .. } => "send_question",
            Event::ClearSource => "clear_source",
            Event::DocumentAttached { .. } => "document_attached",
            Event::DocumentFailed { .. } => "document_failed",
            Event::VideoAttached { .. } => "video_attached",
            Event::VideoFailed { .. } => "video_failed",
            Event::AnswerReceived { .. } => "answer_received",
            Event::AskFailed { .. } => "ask_failed",
        }
    }
}
