//! Adapters behind the domain ports.
//!
//! Each domain reaches its collaborators through traits; this module wires
//! those traits to the sibling repositories and the stats collector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::Arc;

use domain_categories::repository::CategoryRepository;
use domain_events::ports::{
    CategorySource, HitSink, ParticipationCounter, UserSource as EventUserSource, ViewSource,
};
use domain_events::repository::EventRepository;
use domain_events::{EventError, EventResult, EventState};
use domain_requests::ports::{EventFacts, EventSource, UserSource as RequestUserSource};
use domain_requests::repository::RequestRepository;
use domain_requests::{RequestError, RequestResult};
use domain_users::repository::UserRepository;
use stats_client::StatsClient;

fn event_to_request(err: EventError) -> RequestError {
    match err {
        EventError::Database(e) => RequestError::Database(e),
        other => RequestError::Database(DbErr::Custom(other.to_string())),
    }
}

fn to_event_error(err: impl std::fmt::Display) -> EventError {
    EventError::Database(DbErr::Custom(err.to_string()))
}

/// Serves event facts to the requests domain from the events store
#[derive(Clone)]
pub struct EventFactsAdapter<R: EventRepository> {
    events: Arc<R>,
}

impl<R: EventRepository> EventFactsAdapter<R> {
    pub fn new(events: Arc<R>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl<R: EventRepository> EventSource for EventFactsAdapter<R> {
    async fn event_facts(&self, event_id: i64) -> RequestResult<Option<EventFacts>> {
        let event = self
            .events
            .get_by_id(event_id)
            .await
            .map_err(event_to_request)?;

        Ok(event.map(|e| EventFacts {
            id: e.id,
            initiator_id: e.initiator_id,
            published: e.state == EventState::Published,
            participant_limit: i64::from(e.participant_limit),
            request_moderation: e.request_moderation,
        }))
    }
}

/// Serves user existence and the subscription graph from the users store
#[derive(Clone)]
pub struct UserLookupAdapter<R: UserRepository> {
    users: Arc<R>,
}

impl<R: UserRepository> UserLookupAdapter<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R: UserRepository> RequestUserSource for UserLookupAdapter<R> {
    async fn user_exists(&self, user_id: i64) -> RequestResult<bool> {
        let user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| RequestError::Database(DbErr::Custom(e.to_string())))?;
        Ok(user.is_some())
    }
}

#[async_trait]
impl<R: UserRepository> EventUserSource for UserLookupAdapter<R> {
    async fn user_exists(&self, user_id: i64) -> EventResult<bool> {
        let user = self.users.get_by_id(user_id).await.map_err(to_event_error)?;
        Ok(user.is_some())
    }

    async fn followed_ids(&self, user_id: i64) -> EventResult<Vec<i64>> {
        self.users
            .followed_ids(user_id)
            .await
            .map_err(to_event_error)
    }
}

/// Serves category existence from the categories store
pub struct CategoryLookupAdapter<R: CategoryRepository> {
    categories: Arc<R>,
}

impl<R: CategoryRepository> CategoryLookupAdapter<R> {
    pub fn new(categories: Arc<R>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl<R: CategoryRepository> CategorySource for CategoryLookupAdapter<R> {
    async fn category_exists(&self, category_id: i64) -> EventResult<bool> {
        let category = self
            .categories
            .get_by_id(category_id)
            .await
            .map_err(to_event_error)?;
        Ok(category.is_some())
    }
}

/// Serves confirmed request counts from the requests store.
///
/// Failures surface as [`EventError::Stats`]: the pipeline treats missing
/// confirmed counts as fatal.
pub struct ConfirmedCountsAdapter<R: RequestRepository> {
    requests: Arc<R>,
}

impl<R: RequestRepository> ConfirmedCountsAdapter<R> {
    pub fn new(requests: Arc<R>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl<R: RequestRepository> ParticipationCounter for ConfirmedCountsAdapter<R> {
    async fn confirmed_counts(&self, event_ids: Vec<i64>) -> EventResult<HashMap<i64, i64>> {
        self.requests
            .count_confirmed_batch(event_ids)
            .await
            .map_err(|e| EventError::Stats(e.to_string()))
    }
}

/// Serves view counts from the stats collector
pub struct CollectorViewSource {
    client: Arc<StatsClient>,
}

impl CollectorViewSource {
    pub fn new(client: Arc<StatsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ViewSource for CollectorViewSource {
    async fn view_counts(
        &self,
        uris: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        unique: bool,
    ) -> EventResult<HashMap<String, i64>> {
        let stats = self
            .client
            .get_stats(start, end, &uris, unique)
            .await
            .map_err(|e| EventError::Stats(e.to_string()))?;

        Ok(stats.into_iter().map(|s| (s.uri, s.hits)).collect())
    }
}

/// Records endpoint hits with the stats collector.
///
/// Failures are logged and swallowed; hit recording never affects the
/// calling request.
pub struct CollectorHitSink {
    client: Arc<StatsClient>,
}

impl CollectorHitSink {
    pub fn new(client: Arc<StatsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HitSink for CollectorHitSink {
    async fn record_hit(&self, uri: String, ip: Option<String>) {
        let ip = ip.unwrap_or_else(|| "unknown".to_string());
        if let Err(e) = self.client.record_hit(&uri, &ip).await {
            tracing::warn!(error = %e, uri, "Failed to record endpoint hit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain_events::{InMemoryEventRepository, Location, NewEvent};
    use domain_requests::repository::InMemoryRequestRepository;
    use domain_users::models::NewUser;
    use domain_users::repository::InMemoryUserRepository;

    #[tokio::test]
    async fn test_event_facts_reflect_store_state() {
        let events = Arc::new(InMemoryEventRepository::new());
        let created = events
            .create(
                7,
                NewEvent {
                    title: "Open air".to_string(),
                    annotation: "An annotation of at least twenty chars".to_string(),
                    description: "A description of at least twenty chars".to_string(),
                    category_id: 1,
                    event_date: Utc::now() + Duration::days(3),
                    location: Location { lat: 0.0, lon: 0.0 },
                    paid: false,
                    participant_limit: 5,
                },
                1,
            )
            .await
            .unwrap();

        let adapter = EventFactsAdapter::new(events);
        let facts = adapter.event_facts(created.id).await.unwrap().unwrap();

        assert_eq!(facts.initiator_id, 7);
        assert!(!facts.published);
        assert_eq!(facts.participant_limit, 5);
        assert!(facts.request_moderation);

        assert!(adapter.event_facts(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_lookup_reports_existence() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users
            .create(NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let adapter = UserLookupAdapter::new(users);

        assert!(RequestUserSource::user_exists(&adapter, user.id).await.unwrap());
        assert!(!RequestUserSource::user_exists(&adapter, user.id + 1).await.unwrap());
        assert!(
            EventUserSource::followed_ids(&adapter, user.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_confirmed_counts_come_from_request_store() {
        let requests = Arc::new(InMemoryRequestRepository::new());
        requests
            .insert(1, 10, domain_requests::RequestState::Confirmed)
            .await
            .unwrap();
        requests
            .insert(1, 11, domain_requests::RequestState::Confirmed)
            .await
            .unwrap();
        requests
            .insert(1, 12, domain_requests::RequestState::Pending)
            .await
            .unwrap();

        let adapter = ConfirmedCountsAdapter::new(requests);
        let counts = adapter.confirmed_counts(vec![1, 2]).await.unwrap();

        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), None);
    }
}
