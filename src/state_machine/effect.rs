//! Effects produced by state transitions

use super::OperationKind;
use crate::source::DocumentFile;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish a fresh view to the presentation layer
    PublishView,

    /// Upload a document (spawns as background task)
    UploadDocument { file: DocumentFile },

    /// Load a video transcript (spawns as background task)
    LoadVideo { url: String },

    /// Ask the answering service (spawns as background task)
    Ask { question: String },
}

impl Effect {
    /// The gateway operation this effect starts, if any
    pub fn operation(&self) -> Option<OperationKind> {
        match self {
            Effect::PublishView => None,
            Effect::UploadDocument { .. } => Some(OperationKind::AttachDocument),
            Effect::LoadVideo { .. } => Some(OperationKind::AttachVideo),
            Effect::Ask { .. } => Some(OperationKind::Ask),
        }
    }
}
