//! Collaborator traits wired up by the application.
//!
//! The query pipeline needs confirmed request counts, view statistics and a
//! few existence checks owned by other domains or external services. Keeping
//! them behind traits keeps this crate free of cross-domain dependencies and
//! lets tests substitute mocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::EventResult;
use crate::models::Location;

#[cfg(test)]
use mockall::automock;

/// Batched confirmed participation counts.
///
/// A failure here is fatal to the calling request: confirmed counts decide
/// availability and are part of every response.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParticipationCounter: Send + Sync {
    /// Confirmed request count per event. Events with no confirmed requests
    /// may be absent from the map.
    async fn confirmed_counts(&self, event_ids: Vec<i64>) -> EventResult<HashMap<i64, i64>>;
}

/// View statistics from the external collector.
///
/// A failure here degrades to zero views and is never surfaced to callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ViewSource: Send + Sync {
    /// View count per URI over the given window.
    async fn view_counts(
        &self,
        uris: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        unique: bool,
    ) -> EventResult<HashMap<String, i64>>;
}

/// Read access to categories owned by another domain
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn category_exists(&self, category_id: i64) -> EventResult<bool>;
}

/// Read access to users and the subscription graph owned by another domain
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn user_exists(&self, user_id: i64) -> EventResult<bool>;

    /// IDs of all users the given user follows
    async fn followed_ids(&self, user_id: i64) -> EventResult<Vec<i64>>;
}

/// Deduplicating store of event venues.
///
/// Locations are matched by exact coordinates and never updated.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// ID of the stored location with these coordinates, creating it when
    /// absent.
    async fn resolve(&self, location: Location) -> EventResult<i64>;
}

/// Sink for usage hits recorded on public reads.
///
/// Implementations must not fail the calling request; delivery problems are
/// theirs to log.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HitSink: Send + Sync {
    async fn record_hit(&self, uri: String, ip: Option<String>);
}
