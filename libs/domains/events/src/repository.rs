use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::EventResult;
use crate::filter::EventFilter;
use crate::models::{Event, EventState, Location, NewEvent};
use crate::ports::LocationStore;

#[cfg(test)]
use mockall::automock;

/// Repository trait for Event persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist a new event in the PENDING state
    async fn create(
        &self,
        initiator_id: i64,
        input: NewEvent,
        location_id: i64,
    ) -> EventResult<Event>;

    /// Get an event by ID
    async fn get_by_id(&self, id: i64) -> EventResult<Option<Event>>;

    /// Get an event by owner and ID
    async fn get_by_initiator_and_id(
        &self,
        initiator_id: i64,
        id: i64,
    ) -> EventResult<Option<Event>>;

    /// Events matching the filter, ordered by ID. `page` applies a
    /// store-level (offset, limit) window; None fetches everything.
    async fn find(
        &self,
        filter: &EventFilter,
        page: Option<(u64, u64)>,
    ) -> EventResult<Vec<Event>>;

    /// The owner's events, ordered by ID, windowed by from/size
    async fn list_by_initiator(
        &self,
        initiator_id: i64,
        from: u64,
        size: u64,
    ) -> EventResult<Vec<Event>>;

    /// Persist field and state changes of an existing event
    async fn save(&self, event: Event) -> EventResult<Event>;
}

/// In-memory implementation of EventRepository (for development/testing).
///
/// Availability filtering needs confirmed request counts, which live outside
/// this store; tests inject them with [`set_confirmed_count`].
///
/// [`set_confirmed_count`]: InMemoryEventRepository::set_confirmed_count
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<i64, Event>>>,
    confirmed: Arc<RwLock<HashMap<i64, i64>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            confirmed: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Inject the confirmed request count used by availability filtering.
    pub async fn set_confirmed_count(&self, event_id: i64, count: i64) {
        self.confirmed.write().await.insert(event_id, count);
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(
        &self,
        initiator_id: i64,
        input: NewEvent,
        location_id: i64,
    ) -> EventResult<Event> {
        let mut events = self.events.write().await;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            title: input.title,
            annotation: input.annotation,
            description: input.description,
            category_id: input.category_id,
            initiator_id,
            location_id,
            location: input.location,
            event_date: input.event_date,
            paid: input.paid,
            participant_limit: input.participant_limit,
            request_moderation: true,
            state: EventState::Pending,
            created_on: Utc::now(),
            published_on: None,
        };
        events.insert(id, event.clone());

        tracing::info!(event_id = id, initiator_id, "Created event");
        Ok(event)
    }

    async fn get_by_id(&self, id: i64) -> EventResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn get_by_initiator_and_id(
        &self,
        initiator_id: i64,
        id: i64,
    ) -> EventResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events
            .get(&id)
            .filter(|e| e.initiator_id == initiator_id)
            .cloned())
    }

    async fn find(
        &self,
        filter: &EventFilter,
        page: Option<(u64, u64)>,
    ) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;
        let confirmed = self.confirmed.read().await;

        let mut result: Vec<Event> = events
            .values()
            .filter(|e| filter.matches(e, confirmed.get(&e.id).copied().unwrap_or(0)))
            .cloned()
            .collect();
        result.sort_by_key(|e| e.id);

        Ok(match page {
            Some((from, size)) => result
                .into_iter()
                .skip(from as usize)
                .take(size as usize)
                .collect(),
            None => result,
        })
    }

    async fn list_by_initiator(
        &self,
        initiator_id: i64,
        from: u64,
        size: u64,
    ) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;

        let mut result: Vec<Event> = events
            .values()
            .filter(|e| e.initiator_id == initiator_id)
            .cloned()
            .collect();
        result.sort_by_key(|e| e.id);

        Ok(result
            .into_iter()
            .skip(from as usize)
            .take(size as usize)
            .collect())
    }

    async fn save(&self, event: Event) -> EventResult<Event> {
        let mut events = self.events.write().await;
        events.insert(event.id, event.clone());

        tracing::info!(event_id = event.id, "Saved event");
        Ok(event)
    }
}

/// In-memory implementation of LocationStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryLocationStore {
    // keyed by exact bit patterns; dedup is by exact coordinate match
    locations: Arc<RwLock<HashMap<(u64, u64), i64>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self {
            locations: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Number of distinct stored locations
    pub async fn count(&self) -> usize {
        self.locations.read().await.len()
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn resolve(&self, location: Location) -> EventResult<i64> {
        let mut locations = self.locations.write().await;

        let key = (location.lat.to_bits(), location.lon.to_bits());
        let id = *locations
            .entry(key)
            .or_insert_with(|| self.next_id.fetch_add(1, Ordering::SeqCst));

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            annotation: "An annotation of at least twenty chars".to_string(),
            description: "A description of at least twenty chars".to_string(),
            category_id: 1,
            event_date: Utc::now() + Duration::days(7),
            location: Location { lat: 1.0, lon: 2.0 },
            paid: false,
            participant_limit: 0,
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending_with_moderation_on() {
        let repo = InMemoryEventRepository::new();

        let event = repo.create(1, new_event("Open air"), 1).await.unwrap();

        assert_eq!(event.state, EventState::Pending);
        assert!(event.request_moderation);
        assert!(event.published_on.is_none());
    }

    #[tokio::test]
    async fn test_get_by_initiator_and_id_checks_owner() {
        let repo = InMemoryEventRepository::new();
        let event = repo.create(1, new_event("Open air"), 1).await.unwrap();

        assert!(repo.get_by_initiator_and_id(1, event.id).await.unwrap().is_some());
        assert!(repo.get_by_initiator_and_id(2, event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_orders_by_id_and_pages() {
        let repo = InMemoryEventRepository::new();
        for i in 0..5 {
            repo.create(1, new_event(&format!("Event {}", i)), 1)
                .await
                .unwrap();
        }

        let page = repo
            .find(&EventFilter::default(), Some((1, 2)))
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_availability_uses_injected_counts() {
        let repo = InMemoryEventRepository::new();
        let mut input = new_event("Limited");
        input.participant_limit = 2;
        let limited = repo.create(1, input, 1).await.unwrap();
        let open = repo.create(1, new_event("Open"), 1).await.unwrap();

        repo.set_confirmed_count(limited.id, 2).await;

        let filter = EventFilter {
            only_available: true,
            ..Default::default()
        };
        let found = repo.find(&filter, None).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![open.id]);
    }

    #[tokio::test]
    async fn test_location_store_dedups_exact_coordinates() {
        let store = InMemoryLocationStore::new();

        let a = store.resolve(Location { lat: 55.7, lon: 37.6 }).await.unwrap();
        let b = store.resolve(Location { lat: 55.7, lon: 37.6 }).await.unwrap();
        let c = store.resolve(Location { lat: 55.8, lon: 37.6 }).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.count().await, 2);
    }
}
