use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{RequestError, RequestResult};
use crate::models::{ParticipationRequest, RequestState};

#[cfg(test)]
use mockall::automock;

/// Repository trait for ParticipationRequest persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a request in the given initial state
    async fn insert(
        &self,
        event_id: i64,
        requester_id: i64,
        status: RequestState,
    ) -> RequestResult<ParticipationRequest>;

    /// Get a request by ID
    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ParticipationRequest>>;

    /// All requests submitted by a user, ordered by ID
    async fn list_by_requester(&self, requester_id: i64)
    -> RequestResult<Vec<ParticipationRequest>>;

    /// All requests targeting an event, ordered by ID
    async fn list_by_event(&self, event_id: i64) -> RequestResult<Vec<ParticipationRequest>>;

    /// Requests with the given IDs, ordered by ID
    async fn find_many(&self, ids: Vec<i64>) -> RequestResult<Vec<ParticipationRequest>>;

    /// Move the given requests into `status`, returning the updated rows
    async fn set_status(
        &self,
        ids: Vec<i64>,
        status: RequestState,
    ) -> RequestResult<Vec<ParticipationRequest>>;

    /// Number of confirmed requests for one event
    async fn count_confirmed(&self, event_id: i64) -> RequestResult<i64>;

    /// Number of confirmed requests per event, for a batch of events.
    ///
    /// Events with no confirmed requests are absent from the map.
    async fn count_confirmed_batch(
        &self,
        event_ids: Vec<i64>,
    ) -> RequestResult<HashMap<i64, i64>>;
}

/// In-memory implementation of RequestRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestRepository {
    requests: Arc<RwLock<HashMap<i64, ParticipationRequest>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

fn sorted_by_id(mut requests: Vec<ParticipationRequest>) -> Vec<ParticipationRequest> {
    requests.sort_by_key(|r| r.id);
    requests
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn insert(
        &self,
        event_id: i64,
        requester_id: i64,
        status: RequestState,
    ) -> RequestResult<ParticipationRequest> {
        let mut requests = self.requests.write().await;

        let duplicate = requests
            .values()
            .any(|r| r.event_id == event_id && r.requester_id == requester_id);
        if duplicate {
            return Err(RequestError::Duplicate(requester_id, event_id));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = ParticipationRequest {
            id,
            event_id,
            requester_id,
            status,
            created_on: Utc::now(),
        };
        requests.insert(id, request.clone());

        tracing::info!(request_id = id, event_id, requester_id, "Created request");
        Ok(request)
    }

    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ParticipationRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn list_by_requester(
        &self,
        requester_id: i64,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        let requests = self.requests.read().await;
        Ok(sorted_by_id(
            requests
                .values()
                .filter(|r| r.requester_id == requester_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_event(&self, event_id: i64) -> RequestResult<Vec<ParticipationRequest>> {
        let requests = self.requests.read().await;
        Ok(sorted_by_id(
            requests
                .values()
                .filter(|r| r.event_id == event_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_many(&self, ids: Vec<i64>) -> RequestResult<Vec<ParticipationRequest>> {
        let requests = self.requests.read().await;
        Ok(sorted_by_id(
            ids.iter()
                .filter_map(|id| requests.get(id).cloned())
                .collect(),
        ))
    }

    async fn set_status(
        &self,
        ids: Vec<i64>,
        status: RequestState,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        let mut requests = self.requests.write().await;

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(request) = requests.get_mut(&id) {
                request.status = status;
                updated.push(request.clone());
            }
        }

        Ok(sorted_by_id(updated))
    }

    async fn count_confirmed(&self, event_id: i64) -> RequestResult<i64> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .filter(|r| r.event_id == event_id && r.status == RequestState::Confirmed)
            .count() as i64)
    }

    async fn count_confirmed_batch(
        &self,
        event_ids: Vec<i64>,
    ) -> RequestResult<HashMap<i64, i64>> {
        let requests = self.requests.read().await;

        let mut counts = HashMap::new();
        for request in requests.values() {
            if request.status == RequestState::Confirmed && event_ids.contains(&request.event_id)
            {
                *counts.entry(request.event_id).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }
}
