// Precondition helpers shared by the reducer and the cascade rules

use super::error::PipelineError;
use super::intent::IntentKind;
use super::machines::StatusMachine;
use super::types::EntityKind;

pub(crate) fn require<T>(
    slot: &mut Option<T>,
    intent: IntentKind,
    entity: EntityKind,
) -> Result<&mut T, PipelineError> {
    slot.as_mut()
        .ok_or(PipelineError::MissingPrerequisite { intent, entity })
}

pub(crate) fn ensure_absent<T>(
    slot: &Option<T>,
    intent: IntentKind,
    entity: EntityKind,
) -> Result<(), PipelineError> {
    match slot {
        Some(_) => Err(PipelineError::DuplicateEntity { intent, entity }),
        None => Ok(()),
    }
}

pub(crate) fn advance<S: StatusMachine>(
    status: S,
    step: S::Step,
    intent: IntentKind,
    entity: EntityKind,
) -> Result<S, PipelineError> {
    status.next(step).ok_or(PipelineError::IllegalTransition {
        intent,
        entity,
        status: status.label(),
    })
}
