//! Enrichment of persisted events with derived counts.
//!
//! Confirmed request counts and view counts are recomputed on every read via
//! two batched lookups issued concurrently. Output preserves the order and
//! length of the input. A single event goes through the same batch path with
//! a one-element vector.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventFull};
use crate::ports::{ParticipationCounter, ViewSource};

#[derive(Clone)]
pub struct Enricher {
    counter: Arc<dyn ParticipationCounter>,
    views: Arc<dyn ViewSource>,
}

impl Enricher {
    pub fn new(counter: Arc<dyn ParticipationCounter>, views: Arc<dyn ViewSource>) -> Self {
        Self { counter, views }
    }

    /// The collector URI under which views of an event are recorded.
    pub fn event_uri(id: i64) -> String {
        format!("/events/{}", id)
    }

    fn id_from_uri(uri: &str) -> Option<i64> {
        uri.strip_prefix("/events/")?.parse().ok()
    }

    /// Attach confirmed request counts and view counts to a batch of events.
    ///
    /// Counter failure aborts the batch. Collector failure degrades to zero
    /// views for everyone and is only logged.
    pub async fn enrich(&self, events: Vec<Event>) -> EventResult<Vec<EventFull>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let uris: Vec<String> = ids.iter().map(|id| Self::event_uri(*id)).collect();
        // Window covers the whole lifetime of the oldest event in the batch.
        let start = events
            .iter()
            .map(|e| e.created_on)
            .min()
            .unwrap_or_else(Utc::now);
        let end = Utc::now();

        let (counts, views) = tokio::join!(
            self.counter.confirmed_counts(ids),
            self.views.view_counts(uris, start, end, true),
        );

        let counts = counts.map_err(|e| EventError::Stats(e.to_string()))?;
        let views_by_id: HashMap<i64, i64> = match views {
            Ok(raw) => raw
                .into_iter()
                .filter_map(|(uri, count)| Some((Self::id_from_uri(&uri)?, count)))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "View collector unavailable, degrading to zero views");
                HashMap::new()
            }
        };

        Ok(events
            .into_iter()
            .map(|event| {
                let confirmed = counts.get(&event.id).copied().unwrap_or(0);
                let views = views_by_id.get(&event.id).copied().unwrap_or(0);
                EventFull::from_parts(event, confirmed, views)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventState, Location};
    use crate::ports::{MockParticipationCounter, MockViewSource};
    use chrono::Duration;
    use sea_orm::DbErr;

    fn event(id: i64) -> Event {
        let now = Utc::now();
        Event {
            id,
            title: format!("Event {}", id),
            annotation: "An annotation long enough".to_string(),
            description: "A description long enough".to_string(),
            category_id: 1,
            initiator_id: 1,
            location_id: 1,
            location: Location { lat: 0.0, lon: 0.0 },
            event_date: now + Duration::days(1),
            paid: false,
            participant_limit: 0,
            request_moderation: true,
            state: EventState::Published,
            created_on: now - Duration::days(id),
            published_on: Some(now),
        }
    }

    fn enricher(counter: MockParticipationCounter, views: MockViewSource) -> Enricher {
        Enricher::new(Arc::new(counter), Arc::new(views))
    }

    #[tokio::test]
    async fn test_empty_batch_skips_both_lookups() {
        // Mocks with no expectations panic when called.
        let result = enricher(MockParticipationCounter::new(), MockViewSource::new())
            .enrich(Vec::new())
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_order_and_length_preserved() {
        let mut counter = MockParticipationCounter::new();
        counter
            .expect_confirmed_counts()
            .returning(|_| Ok(HashMap::from([(2, 7)])));
        let mut views = MockViewSource::new();
        views
            .expect_view_counts()
            .returning(|_, _, _, _| Ok(HashMap::from([("/events/3".to_string(), 11)])));

        let enriched = enricher(counter, views)
            .enrich(vec![event(3), event(1), event(2)])
            .await
            .unwrap();

        let ids: Vec<i64> = enriched.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(enriched[0].views, 11);
        assert_eq!(enriched[2].confirmed_requests, 7);
        // missing entries default to zero
        assert_eq!(enriched[1].confirmed_requests, 0);
        assert_eq!(enriched[1].views, 0);
    }

    #[tokio::test]
    async fn test_counter_failure_is_fatal() {
        let mut counter = MockParticipationCounter::new();
        counter
            .expect_confirmed_counts()
            .returning(|_| Err(EventError::Database(DbErr::Custom("down".to_string()))));
        let mut views = MockViewSource::new();
        views
            .expect_view_counts()
            .returning(|_, _, _, _| Ok(HashMap::new()));

        let result = enricher(counter, views).enrich(vec![event(1)]).await;

        assert!(matches!(result, Err(EventError::Stats(_))));
    }

    #[tokio::test]
    async fn test_collector_failure_degrades_to_zero_views() {
        let mut counter = MockParticipationCounter::new();
        counter
            .expect_confirmed_counts()
            .returning(|_| Ok(HashMap::from([(1, 4)])));
        let mut views = MockViewSource::new();
        views
            .expect_view_counts()
            .returning(|_, _, _, _| Err(EventError::Stats("collector down".to_string())));

        let enriched = enricher(counter, views).enrich(vec![event(1)]).await.unwrap();

        assert_eq!(enriched[0].confirmed_requests, 4);
        assert_eq!(enriched[0].views, 0);
    }

    #[tokio::test]
    async fn test_enrichment_is_idempotent_for_stable_inputs() {
        let make = || {
            let mut counter = MockParticipationCounter::new();
            counter
                .expect_confirmed_counts()
                .returning(|_| Ok(HashMap::from([(1, 2)])));
            let mut views = MockViewSource::new();
            views
                .expect_view_counts()
                .returning(|_, _, _, _| Ok(HashMap::from([("/events/1".to_string(), 5)])));
            enricher(counter, views)
        };

        let first = make().enrich(vec![event(1)]).await.unwrap();
        let second = make().enrich(vec![event(1)]).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_window_starts_at_oldest_created_on() {
        let events = vec![event(1), event(3), event(2)];
        let oldest = events.iter().map(|e| e.created_on).min().unwrap();

        let mut counter = MockParticipationCounter::new();
        counter
            .expect_confirmed_counts()
            .returning(|_| Ok(HashMap::new()));
        let mut views = MockViewSource::new();
        views
            .expect_view_counts()
            .withf(move |uris, start, _, unique| {
                uris.len() == 3 && *start == oldest && *unique
            })
            .returning(|_, _, _, _| Ok(HashMap::new()));

        enricher(counter, views).enrich(events).await.unwrap();
    }
}
