//! Pure state transition function

use super::{Effect, Event, OperationKind, SessionState};
use crate::conversation::Turn;
use crate::gateway::{GatewayError, GatewayErrorKind};
use crate::source::SourceBinding;
use thiserror::Error;

pub(crate) const VIDEO_LOADED: &str = "YouTube transcript loaded!";
pub(crate) const DOCUMENT_FAILED: &str = "Error uploading PDF.";
pub(crate) const VIDEO_UNREACHABLE: &str = "Failed to load transcript.";
pub(crate) const ASK_UNREACHABLE: &str = "Error connecting to backend.";
pub(crate) const ASK_REJECTED: &str = "The answering service could not answer that question.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Accepted event that changes nothing
    pub fn unchanged(state: &SessionState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. State is never modified on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Please upload a PDF file (got {media_type})")]
    InvalidSourceKind { media_type: String },
    #[error("Still {}; try again once it finishes", .pending.describe())]
    Busy { pending: OperationKind },
    #[error("Upload a PDF or add a YouTube link before asking questions")]
    NoSource,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Whether the user should be told about this rejection
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, TransitionError::InvalidTransition(_))
    }
}

/// Pure transition function
///
/// Given the same inputs this always produces the same outputs and performs
/// no I/O. Network calls are requested through effects.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.pending, event) {
        // ============================================================
        // Local detach, accepted in every phase
        // ============================================================
        (_, Event::ClearSource) => {
            if state.binding.is_empty() {
                return Ok(TransitionResult::unchanged(state));
            }
            let mut next = state.clone();
            next.binding.clear();
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        // ============================================================
        // Nothing submitted
        // ============================================================
        (_, Event::SubmitVideo { url }) if url.trim().is_empty() => {
            Ok(TransitionResult::unchanged(state))
        }
        (_, Event::SendQuestion { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::unchanged(state))
        }

        // ============================================================
        // At most one call in flight; nothing is queued
        // ============================================================
        (Some(pending), event) if event.is_user_intent() => Err(TransitionError::Busy { pending }),

        // ============================================================
        // User intents while idle
        // ============================================================
        (None, Event::SubmitDocument { file }) => {
            if !file.is_accepted() {
                return Err(TransitionError::InvalidSourceKind {
                    media_type: file.media_type,
                });
            }
            let next = SessionState {
                pending: Some(OperationKind::AttachDocument),
                ..state.clone()
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishView)
                .with_effect(Effect::UploadDocument { file }))
        }

        (None, Event::SubmitVideo { url }) => {
            let next = SessionState {
                pending: Some(OperationKind::AttachVideo),
                ..state.clone()
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishView)
                .with_effect(Effect::LoadVideo {
                    url: url.trim().to_string(),
                }))
        }

        (None, Event::SendQuestion { text }) => {
            if state.binding.is_empty() {
                return Err(TransitionError::NoSource);
            }
            let question = text.trim().to_string();
            // The question is in the log before the call is issued
            let next = SessionState {
                pending: Some(OperationKind::Ask),
                ..state.clone()
            }
            .with_turn(Turn::user(text));
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishView)
                .with_effect(Effect::Ask { question }))
        }

        // ============================================================
        // Attach outcomes
        // ============================================================
        (Some(OperationKind::AttachDocument), Event::DocumentAttached { receipt }) => {
            let confirmation = format!("PDF uploaded: {}", receipt.name);
            let next = settle(
                state,
                SourceBinding::Document {
                    name: receipt.name,
                    size_bytes: receipt.size_bytes,
                },
            )
            .with_turn(Turn::assistant(confirmation));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        (Some(OperationKind::AttachDocument), Event::DocumentFailed { error: _ }) => {
            let next = settle(state, state.binding.clone()).with_turn(Turn::assistant(DOCUMENT_FAILED));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        (Some(OperationKind::AttachVideo), Event::VideoAttached { receipt }) => {
            let next = settle(
                state,
                SourceBinding::Video {
                    video_id: receipt.video_id,
                },
            )
            .with_turn(Turn::assistant(VIDEO_LOADED));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        (Some(OperationKind::AttachVideo), Event::VideoFailed { error }) => {
            let next = settle(state, state.binding.clone())
                .with_turn(Turn::assistant(video_failure_text(&error)));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        // ============================================================
        // Answer outcomes
        // ============================================================
        (Some(OperationKind::Ask), Event::AnswerReceived { answer }) => {
            let next = settle(state, state.binding.clone()).with_turn(Turn::assistant(answer.text));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        (Some(OperationKind::Ask), Event::AskFailed { error }) => {
            let text = match error.kind {
                GatewayErrorKind::Unreachable => ASK_UNREACHABLE,
                GatewayErrorKind::Rejected => ASK_REJECTED,
            };
            let next = settle(state, state.binding.clone()).with_turn(Turn::assistant(text));
            Ok(TransitionResult::new(next).with_effect(Effect::PublishView))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (_, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {:?} with event {}",
            state.phase(),
            event.name()
        ))),
    }
}

/// Clear `pending` and install `binding`
fn settle(state: &SessionState, binding: SourceBinding) -> SessionState {
    SessionState {
        binding,
        log: state.log.clone(),
        pending: None,
    }
}

fn video_failure_text(error: &GatewayError) -> String {
    match error.kind {
        GatewayErrorKind::Rejected => format!("Error: {}", error.message),
        GatewayErrorKind::Unreachable => VIDEO_UNREACHABLE.to_string(),
    }
}
