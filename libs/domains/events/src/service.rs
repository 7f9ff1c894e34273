use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::enrich::Enricher;
use crate::error::{EventError, EventResult};
use crate::filter::EventFilter;
use crate::models::{
    AdminEventUpdate, AdminSearch, Event, EventFull, EventPage, EventPatch, EventSort, EventState,
    NewEvent, PublicSearch, UserEventUpdate,
};
use crate::ports::{CategorySource, LocationStore, ParticipationCounter, UserSource, ViewSource};
use crate::repository::EventRepository;
use crate::state;

/// Minimum lead time between now and the event date on owner paths
const OWNER_LEAD_HOURS: i64 = 2;
/// Minimum lead time on the admin path
const ADMIN_LEAD_HOURS: i64 = 1;

/// Query orchestrator and mutation entry point for events.
///
/// Reads run filter → fetch → enrich → sort → window; mutations run a single
/// read-modify-write cycle and return the enriched event.
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
    locations: Arc<dyn LocationStore>,
    categories: Arc<dyn CategorySource>,
    users: Arc<dyn UserSource>,
    enricher: Enricher,
}

impl<R: EventRepository> Clone for EventService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            locations: Arc::clone(&self.locations),
            categories: Arc::clone(&self.categories),
            users: Arc::clone(&self.users),
            enricher: self.enricher.clone(),
        }
    }
}

impl<R: EventRepository> EventService<R> {
    pub fn new(
        repository: R,
        locations: Arc<dyn LocationStore>,
        categories: Arc<dyn CategorySource>,
        users: Arc<dyn UserSource>,
        counter: Arc<dyn ParticipationCounter>,
        views: Arc<dyn ViewSource>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            locations,
            categories,
            users,
            enricher: Enricher::new(counter, views),
        }
    }

    async fn require_user(&self, user_id: i64) -> EventResult<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound(format!("User {} not found", user_id)))
        }
    }

    async fn require_category(&self, category_id: i64) -> EventResult<()> {
        if self.categories.category_exists(category_id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound(format!(
                "Category {} not found",
                category_id
            )))
        }
    }

    fn ensure_lead_time(date: DateTime<Utc>, hours: i64) -> EventResult<()> {
        if date < Utc::now() + Duration::hours(hours) {
            return Err(EventError::Validation(format!(
                "Event date {} must be at least {} hour(s) in the future",
                date, hours
            )));
        }
        Ok(())
    }

    async fn enrich_one(&self, event: Event) -> EventResult<EventFull> {
        let mut enriched = self.enricher.enrich(vec![event]).await?;
        enriched
            .pop()
            .ok_or_else(|| EventError::Stats("enrichment dropped the event".to_string()))
    }

    /// Resolve patch parts that need collaborators, then apply field edits.
    async fn apply_patch(&self, event: &mut Event, patch: &EventPatch) -> EventResult<()> {
        if let Some(category_id) = patch.category_id {
            self.require_category(category_id).await?;
        }
        if let Some(location) = patch.location {
            event.location_id = self.locations.resolve(location).await?;
            event.location = location;
        }
        event.apply_patch(patch);
        Ok(())
    }

    fn sort(events: &mut [EventFull], sort: Option<EventSort>) {
        match sort {
            // store order (ascending IDs) is already deterministic
            None => {}
            Some(EventSort::EventDate) => {
                events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.id.cmp(&b.id)));
            }
            Some(EventSort::Views) => {
                events.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
            }
        }
    }

    fn window(events: Vec<EventFull>, from: u64, size: u64) -> Vec<EventFull> {
        events
            .into_iter()
            .skip(from as usize)
            .take(size as usize)
            .collect()
    }

    /// Sort and window happen strictly after the full result set is enriched,
    /// otherwise a views sort would order on stale zeros.
    async fn run_public_pipeline(
        &self,
        filter: EventFilter,
        sort: Option<EventSort>,
        from: u64,
        size: u64,
    ) -> EventResult<Vec<EventFull>> {
        let events = self.repository.find(&filter, None).await?;
        let mut enriched = self.enricher.enrich(events).await?;
        Self::sort(&mut enriched, sort);
        Ok(Self::window(enriched, from, size))
    }

    /// Admin search with store-level paging
    pub async fn admin_search(&self, search: AdminSearch) -> EventResult<Vec<EventFull>> {
        let filter = EventFilter::admin(
            search.user_ids(),
            search.state_list(),
            search.category_ids(),
            search.range_start,
            search.range_end,
        );

        let events = self
            .repository
            .find(&filter, Some((search.from, search.size)))
            .await?;
        self.enricher.enrich(events).await
    }

    /// Public search over published events
    pub async fn public_search(&self, search: PublicSearch) -> EventResult<Vec<EventFull>> {
        let filter = EventFilter::public_search(
            search.text.clone(),
            search.category_ids(),
            search.paid,
            search.range_start,
            search.range_end,
            search.only_available,
            Utc::now(),
        )?;

        self.run_public_pipeline(filter, search.sort, search.from, search.size)
            .await
    }

    /// Public search constrained to events of users the subscriber follows.
    ///
    /// A subscriber who follows nobody gets an empty result, never the
    /// unconstrained feed.
    pub async fn published_events_of_followed(
        &self,
        subscriber_id: i64,
        search: PublicSearch,
    ) -> EventResult<Vec<EventFull>> {
        self.require_user(subscriber_id).await?;

        let followed = self.users.followed_ids(subscriber_id).await?;
        if followed.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = EventFilter::public_search(
            search.text.clone(),
            search.category_ids(),
            search.paid,
            search.range_start,
            search.range_end,
            search.only_available,
            Utc::now(),
        )?;
        filter.initiator_ids = Some(followed);

        self.run_public_pipeline(filter, search.sort, search.from, search.size)
            .await
    }

    /// One published event, enriched
    pub async fn published_event(&self, id: i64) -> EventResult<EventFull> {
        let event = self
            .repository
            .get_by_id(id)
            .await?
            .filter(|e| e.state == EventState::Published)
            .ok_or_else(|| EventError::NotFound(format!("Event {} not found", id)))?;

        self.enrich_one(event).await
    }

    /// Create an event owned by `user_id`
    pub async fn create_event(&self, user_id: i64, input: NewEvent) -> EventResult<EventFull> {
        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        self.require_user(user_id).await?;
        self.require_category(input.category_id).await?;
        Self::ensure_lead_time(input.event_date, OWNER_LEAD_HOURS)?;

        let location_id = self.locations.resolve(input.location).await?;
        let event = self.repository.create(user_id, input, location_id).await?;

        self.enrich_one(event).await
    }

    /// The owner's own events
    pub async fn events_of_user(
        &self,
        user_id: i64,
        page: EventPage,
    ) -> EventResult<Vec<EventFull>> {
        self.require_user(user_id).await?;

        let events = self
            .repository
            .list_by_initiator(user_id, page.from, page.size)
            .await?;
        self.enricher.enrich(events).await
    }

    /// One of the owner's events, enriched
    pub async fn event_of_user(&self, user_id: i64, event_id: i64) -> EventResult<EventFull> {
        let event = self
            .repository
            .get_by_initiator_and_id(user_id, event_id)
            .await?
            .ok_or_else(|| EventError::NotFound(format!("Event {} not found", event_id)))?;

        self.enrich_one(event).await
    }

    /// Owner update: field edits plus lifecycle actions
    pub async fn user_update(
        &self,
        user_id: i64,
        event_id: i64,
        update: UserEventUpdate,
    ) -> EventResult<EventFull> {
        update
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        let mut event = self
            .repository
            .get_by_initiator_and_id(user_id, event_id)
            .await?
            .ok_or_else(|| EventError::NotFound(format!("Event {} not found", event_id)))?;

        if !state::owner_can_modify(event.state) {
            return Err(EventError::StateConflict(
                "Only pending or canceled events can be changed by their owner".to_string(),
            ));
        }
        if let Some(date) = update.patch.event_date {
            Self::ensure_lead_time(date, OWNER_LEAD_HOURS)?;
        }

        self.apply_patch(&mut event, &update.patch).await?;
        if let Some(action) = update.state_action {
            event.state = state::owner_transition(event.state, action)?;
        }

        let saved = self.repository.save(event).await?;
        self.enrich_one(saved).await
    }

    /// Admin update: field edits plus moderation actions
    pub async fn admin_update(
        &self,
        event_id: i64,
        update: AdminEventUpdate,
    ) -> EventResult<EventFull> {
        update
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        let mut event = self
            .repository
            .get_by_id(event_id)
            .await?
            .ok_or_else(|| EventError::NotFound(format!("Event {} not found", event_id)))?;

        if let Some(date) = update.patch.event_date {
            Self::ensure_lead_time(date, ADMIN_LEAD_HOURS)?;
        }

        self.apply_patch(&mut event, &update.patch).await?;
        if let Some(action) = update.state_action {
            event.state = state::admin_transition(event.state, action)?;
            if event.state == EventState::Published {
                event.published_on = Some(Utc::now());
            }
        }

        let saved = self.repository.save(event).await?;
        self.enrich_one(saved).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminStateAction, Location, UserStateAction};
    use crate::ports::{
        MockCategorySource, MockParticipationCounter, MockUserSource, MockViewSource,
    };
    use crate::repository::{InMemoryEventRepository, InMemoryLocationStore};
    use std::collections::HashMap;

    fn service() -> EventService<InMemoryEventRepository> {
        service_with_followed(Vec::new())
    }

    fn service_with_followed(followed: Vec<i64>) -> EventService<InMemoryEventRepository> {
        let mut categories = MockCategorySource::new();
        categories.expect_category_exists().returning(|_| Ok(true));

        let mut users = MockUserSource::new();
        users.expect_user_exists().returning(|_| Ok(true));
        users
            .expect_followed_ids()
            .returning(move |_| Ok(followed.clone()));

        let mut counter = MockParticipationCounter::new();
        counter
            .expect_confirmed_counts()
            .returning(|_| Ok(HashMap::new()));

        let mut views = MockViewSource::new();
        views
            .expect_view_counts()
            .returning(|_, _, _, _| Ok(HashMap::new()));

        EventService::new(
            InMemoryEventRepository::new(),
            Arc::new(InMemoryLocationStore::new()),
            Arc::new(categories),
            Arc::new(users),
            Arc::new(counter),
            Arc::new(views),
        )
    }

    fn new_event(hours_ahead: i64) -> NewEvent {
        NewEvent {
            title: "Open air".to_string(),
            annotation: "An annotation of at least twenty chars".to_string(),
            description: "A description of at least twenty chars".to_string(),
            category_id: 1,
            event_date: Utc::now() + Duration::hours(hours_ahead),
            location: Location { lat: 55.7, lon: 37.6 },
            paid: false,
            participant_limit: 0,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_too_close_event_date() {
        let service = service();

        let result = service.create_event(1, new_event(1)).await;

        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let mut categories = MockCategorySource::new();
        categories.expect_category_exists().returning(|_| Ok(false));
        let mut users = MockUserSource::new();
        users.expect_user_exists().returning(|_| Ok(true));
        let counter = MockParticipationCounter::new();
        let views = MockViewSource::new();

        let service = EventService::new(
            InMemoryEventRepository::new(),
            Arc::new(InMemoryLocationStore::new()),
            Arc::new(categories),
            Arc::new(users),
            Arc::new(counter),
            Arc::new(views),
        );

        let result = service.create_event(1, new_event(72)).await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_pending_sets_published_on() {
        let service = service();
        let created = service.create_event(1, new_event(72)).await.unwrap();

        let update = AdminEventUpdate {
            state_action: Some(AdminStateAction::PublishEvent),
            ..Default::default()
        };
        let published = service.admin_update(created.id, update).await.unwrap();

        assert_eq!(published.state, EventState::Published);
        assert!(published.published_on.is_some());
    }

    #[tokio::test]
    async fn test_publish_twice_conflicts() {
        let service = service();
        let created = service.create_event(1, new_event(72)).await.unwrap();

        let publish = || AdminEventUpdate {
            state_action: Some(AdminStateAction::PublishEvent),
            ..Default::default()
        };
        service.admin_update(created.id, publish()).await.unwrap();
        let result = service.admin_update(created.id, publish()).await;

        assert!(matches!(result, Err(EventError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_touch_published_event() {
        let service = service();
        let created = service.create_event(1, new_event(72)).await.unwrap();
        service
            .admin_update(
                created.id,
                AdminEventUpdate {
                    state_action: Some(AdminStateAction::PublishEvent),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = service
            .user_update(
                1,
                created.id,
                UserEventUpdate {
                    state_action: Some(UserStateAction::CancelReview),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(EventError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_owner_resubmits_canceled_event() {
        let service = service();
        let created = service.create_event(1, new_event(72)).await.unwrap();
        service
            .user_update(
                1,
                created.id,
                UserEventUpdate {
                    state_action: Some(UserStateAction::CancelReview),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let resubmitted = service
            .user_update(
                1,
                created.id,
                UserEventUpdate {
                    state_action: Some(UserStateAction::SendToReview),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(resubmitted.state, EventState::Pending);
    }

    #[tokio::test]
    async fn test_followed_feed_empty_without_subscriptions() {
        let service = service_with_followed(Vec::new());
        let created = service.create_event(1, new_event(72)).await.unwrap();
        service
            .admin_update(
                created.id,
                AdminEventUpdate {
                    state_action: Some(AdminStateAction::PublishEvent),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let feed = service
            .published_events_of_followed(2, PublicSearch::default())
            .await
            .unwrap();

        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_followed_feed_restricted_to_followed_initiators() {
        let service = service_with_followed(vec![1]);
        for initiator in [1, 2] {
            let created = service
                .create_event(initiator, new_event(72))
                .await
                .unwrap();
            service
                .admin_update(
                    created.id,
                    AdminEventUpdate {
                        state_action: Some(AdminStateAction::PublishEvent),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let feed = service
            .published_events_of_followed(3, PublicSearch::default())
            .await
            .unwrap();

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].initiator_id, 1);
    }

    #[tokio::test]
    async fn test_unpublished_event_hidden_from_public_read() {
        let service = service();
        let created = service.create_event(1, new_event(72)).await.unwrap();

        let result = service.published_event(created.id).await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
