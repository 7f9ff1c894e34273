//! Collaborator traits wired up by the application.
//!
//! Request rules need a few facts about events and users that live in other
//! domains. Keeping them behind traits keeps this crate free of cross-domain
//! dependencies and lets tests substitute mocks.

use async_trait::async_trait;

use crate::error::RequestResult;

#[cfg(test)]
use mockall::automock;

/// The slice of an event that request rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFacts {
    pub id: i64,
    pub initiator_id: i64,
    pub published: bool,
    /// 0 means unlimited
    pub participant_limit: i64,
    pub request_moderation: bool,
}

/// Read access to events owned by another domain
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Facts about an event, or None when it does not exist
    async fn event_facts(&self, event_id: i64) -> RequestResult<Option<EventFacts>>;
}

/// Read access to user existence owned by another domain
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn user_exists(&self, user_id: i64) -> RequestResult<bool>;
}
