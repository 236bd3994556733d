use thiserror::Error;

use super::intent::IntentKind;
use super::types::EntityKind;

/// Why an intent was not applied. Never fatal: the snapshot is always left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{intent} is not allowed while the {entity} is {status}")]
    IllegalTransition {
        intent: IntentKind,
        entity: EntityKind,
        status: &'static str,
    },

    #[error("{intent} requires a {entity}, which does not exist yet")]
    MissingPrerequisite {
        intent: IntentKind,
        entity: EntityKind,
    },

    #[error("{intent} would create a second {entity}")]
    DuplicateEntity {
        intent: IntentKind,
        entity: EntityKind,
    },

    #[error("{intent} payload rejected: {reason}")]
    InvalidPayload { intent: IntentKind, reason: String },
}

impl PipelineError {
    pub fn intent(&self) -> IntentKind {
        match self {
            PipelineError::IllegalTransition { intent, .. }
            | PipelineError::MissingPrerequisite { intent, .. }
            | PipelineError::DuplicateEntity { intent, .. }
            | PipelineError::InvalidPayload { intent, .. } => *intent,
        }
    }
}
