//! Event state machine.
//!
//! PENDING is the only entry state. PENDING moves to PUBLISHED (admin publish)
//! or CANCELED (admin reject, owner cancel). CANCELED moves back to PENDING
//! when the owner resubmits. Nothing leaves PUBLISHED.

use crate::error::{EventError, EventResult};
use crate::models::{AdminStateAction, EventState, UserStateAction};

/// Resulting state of an admin moderation action, or a conflict.
pub fn admin_transition(state: EventState, action: AdminStateAction) -> EventResult<EventState> {
    match action {
        AdminStateAction::PublishEvent => match state {
            EventState::Pending => Ok(EventState::Published),
            other => Err(EventError::StateConflict(format!(
                "Cannot publish an event in state {}",
                other
            ))),
        },
        AdminStateAction::RejectEvent => match state {
            EventState::Published => Err(EventError::StateConflict(
                "Cannot reject an already published event".to_string(),
            )),
            _ => Ok(EventState::Canceled),
        },
    }
}

/// Whether the owner may touch an event at all in this state.
pub fn owner_can_modify(state: EventState) -> bool {
    matches!(state, EventState::Pending | EventState::Canceled)
}

/// Resulting state of an owner lifecycle action, or a conflict.
pub fn owner_transition(state: EventState, action: UserStateAction) -> EventResult<EventState> {
    if !owner_can_modify(state) {
        return Err(EventError::StateConflict(
            "Only pending or canceled events can be changed by their owner".to_string(),
        ));
    }

    match action {
        UserStateAction::SendToReview => Ok(EventState::Pending),
        UserStateAction::CancelReview => Ok(EventState::Canceled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventState::{Canceled, Pending, Published};

    #[test]
    fn test_admin_publish_table() {
        assert_eq!(
            admin_transition(Pending, AdminStateAction::PublishEvent).unwrap(),
            Published
        );
        assert!(admin_transition(Published, AdminStateAction::PublishEvent).is_err());
        assert!(admin_transition(Canceled, AdminStateAction::PublishEvent).is_err());
    }

    #[test]
    fn test_admin_reject_table() {
        assert_eq!(
            admin_transition(Pending, AdminStateAction::RejectEvent).unwrap(),
            Canceled
        );
        assert_eq!(
            admin_transition(Canceled, AdminStateAction::RejectEvent).unwrap(),
            Canceled
        );
        assert!(admin_transition(Published, AdminStateAction::RejectEvent).is_err());
    }

    #[test]
    fn test_owner_send_to_review_table() {
        assert_eq!(
            owner_transition(Pending, UserStateAction::SendToReview).unwrap(),
            Pending
        );
        assert_eq!(
            owner_transition(Canceled, UserStateAction::SendToReview).unwrap(),
            Pending
        );
        assert!(owner_transition(Published, UserStateAction::SendToReview).is_err());
    }

    #[test]
    fn test_owner_cancel_review_table() {
        assert_eq!(
            owner_transition(Pending, UserStateAction::CancelReview).unwrap(),
            Canceled
        );
        assert_eq!(
            owner_transition(Canceled, UserStateAction::CancelReview).unwrap(),
            Canceled
        );
        assert!(owner_transition(Published, UserStateAction::CancelReview).is_err());
    }

    #[test]
    fn test_nothing_leaves_published() {
        for action in [AdminStateAction::PublishEvent, AdminStateAction::RejectEvent] {
            assert!(admin_transition(Published, action).is_err());
        }
        for action in [UserStateAction::SendToReview, UserStateAction::CancelReview] {
            assert!(owner_transition(Published, action).is_err());
        }
    }
}
