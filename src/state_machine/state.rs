//! Session state types

use crate::conversation::{ConversationLog, Turn};
use crate::source::SourceBinding;
use serde::Serialize;

/// Kind of the gateway call currently outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    AttachDocument,
    AttachVideo,
    Ask,
}

impl OperationKind {
    pub fn phase(self) -> Phase {
        match self {
            OperationKind::AttachDocument | OperationKind::AttachVideo => Phase::AwaitingAttach,
            OperationKind::Ask => Phase::AwaitingAnswer,
        }
    }

    /// Short present-progressive description for notices
    pub fn describe(self) -> &'static str {
        match self {
            OperationKind::AttachDocument => "uploading the PDF",
            OperationKind::AttachVideo => "loading the transcript",
            OperationKind::Ask => "waiting for an answer",
        }
    }
}

/// Coarse controller phase, derived from `pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingAttach,
    AwaitingAnswer,
}

/// Everything the controller knows about the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub binding: SourceBinding,
    pub log: ConversationLog,
    /// Set while exactly one gateway call is outstanding
    pub pending: Option<OperationKind>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.pending.map_or(Phase::Idle, OperationKind::phase)
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a new source may be picked right now
    pub fn can_add_source(&self) -> bool {
        !self.is_busy()
    }

    /// Whether the question input is enabled
    pub fn can_ask(&self) -> bool {
        !self.binding.is_empty() && !self.is_busy()
    }

    pub fn input_placeholder(&self) -> &'static str {
        if self.binding.is_empty() {
            "Upload a source first..."
        } else {
            "Ask something..."
        }
    }

    pub(crate) fn with_turn(mut self, turn: Turn) -> Self {
        self.log.append(turn);
        self
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase(),
            binding: self.binding.clone(),
            turns: self.log.turns().to_vec(),
            busy: self.is_busy(),
            can_add_source: self.can_add_source(),
            can_ask: self.can_ask(),
            input_placeholder: self.input_placeholder(),
        }
    }
}

/// Read-only projection handed to the presentation layer.
///
/// Always recomputed from `SessionState`, never stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub binding: SourceBinding,
    pub turns: Vec<Turn>,
    pub busy: bool,
    pub can_add_source: bool,
    pub can_ask: bool,
    pub input_placeholder: &'static str,
}

impl Default for SessionView {
    fn default() -> Self {
        SessionState::new().view()
    }
}
