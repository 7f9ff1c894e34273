use std::sync::Arc;
use validator::Validate;

use crate::error::{RequestError, RequestResult};
use crate::models::{
    ModerationDecision, ModerationResult, ModerationUpdate, ParticipationRequest, RequestState,
};
use crate::ports::{EventFacts, EventSource, UserSource};
use crate::repository::RequestRepository;

/// Service layer for participation request business logic
#[derive(Clone)]
pub struct RequestService<R, E, U>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    repository: Arc<R>,
    events: Arc<E>,
    users: Arc<U>,
}

impl<R, E, U> RequestService<R, E, U>
where
    R: RequestRepository,
    E: EventSource,
    U: UserSource,
{
    pub fn new(repository: R, events: E, users: U) -> Self {
        Self {
            repository: Arc::new(repository),
            events: Arc::new(events),
            users: Arc::new(users),
        }
    }

    async fn require_user(&self, user_id: i64) -> RequestResult<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(RequestError::UserNotFound(user_id))
        }
    }

    async fn require_event(&self, event_id: i64) -> RequestResult<EventFacts> {
        self.events
            .event_facts(event_id)
            .await?
            .ok_or(RequestError::EventNotFound(event_id))
    }

    /// All requests submitted by a user
    pub async fn requests_of_user(
        &self,
        user_id: i64,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        self.require_user(user_id).await?;
        self.repository.list_by_requester(user_id).await
    }

    /// Apply to attend an event.
    ///
    /// The event must be published, must not be the user's own and must have
    /// free capacity. When the event does not moderate requests (or has no
    /// participant limit) the request is confirmed immediately.
    pub async fn create_request(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> RequestResult<ParticipationRequest> {
        self.require_user(user_id).await?;
        let facts = self.require_event(event_id).await?;

        if facts.initiator_id == user_id {
            return Err(RequestError::OwnEvent(user_id));
        }
        if !facts.published {
            return Err(RequestError::NotPublished(event_id));
        }
        if facts.participant_limit > 0 {
            let confirmed = self.repository.count_confirmed(event_id).await?;
            if confirmed >= facts.participant_limit {
                return Err(RequestError::LimitReached(event_id));
            }
        }

        let status = if !facts.request_moderation || facts.participant_limit == 0 {
            RequestState::Confirmed
        } else {
            RequestState::Pending
        };

        self.repository.insert(event_id, user_id, status).await
    }

    /// Withdraw one's own request
    pub async fn cancel_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> RequestResult<ParticipationRequest> {
        let request = self
            .repository
            .get_by_id(request_id)
            .await?
            .filter(|r| r.requester_id == user_id)
            .ok_or(RequestError::NotFound(request_id))?;

        let mut updated = self
            .repository
            .set_status(vec![request.id], RequestState::Canceled)
            .await?;

        updated.pop().ok_or(RequestError::NotFound(request_id))
    }

    /// All requests targeting an event, for its owner
    pub async fn requests_for_event(
        &self,
        owner_id: i64,
        event_id: i64,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        let facts = self.require_event(event_id).await?;
        if facts.initiator_id != owner_id {
            return Err(RequestError::EventNotFound(event_id));
        }

        self.repository.list_by_event(event_id).await
    }

    /// Owner's batch decision over pending requests.
    ///
    /// Confirming past the participant limit rejects the overflow; an event
    /// that is already full rejects the whole batch with a conflict. Events
    /// that do not moderate requests have nothing pending, so the result is
    /// empty.
    pub async fn moderate_requests(
        &self,
        owner_id: i64,
        event_id: i64,
        update: ModerationUpdate,
    ) -> RequestResult<ModerationResult> {
        update
            .validate()
            .map_err(|e| RequestError::Validation(e.to_string()))?;

        let facts = self.require_event(event_id).await?;
        if facts.initiator_id != owner_id {
            return Err(RequestError::EventNotFound(event_id));
        }
        if !facts.request_moderation || facts.participant_limit == 0 {
            return Ok(ModerationResult::default());
        }

        let requests = self.repository.find_many(update.request_ids.clone()).await?;
        for request in &requests {
            if request.event_id != event_id || request.status != RequestState::Pending {
                return Err(RequestError::NotPending(request.id));
            }
        }

        match update.status {
            ModerationDecision::Rejected => {
                let rejected = self
                    .repository
                    .set_status(update.request_ids, RequestState::Rejected)
                    .await?;
                Ok(ModerationResult {
                    confirmed_requests: Vec::new(),
                    rejected_requests: rejected,
                })
            }
            ModerationDecision::Confirmed => {
                let confirmed_count = self.repository.count_confirmed(event_id).await?;
                if confirmed_count >= facts.participant_limit {
                    return Err(RequestError::LimitReached(event_id));
                }

                let capacity = (facts.participant_limit - confirmed_count) as usize;
                let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
                let (to_confirm, overflow) = ids.split_at(capacity.min(ids.len()));

                let confirmed = self
                    .repository
                    .set_status(to_confirm.to_vec(), RequestState::Confirmed)
                    .await?;
                let rejected = if overflow.is_empty() {
                    Vec::new()
                } else {
                    self.repository
                        .set_status(overflow.to_vec(), RequestState::Rejected)
                        .await?
                };

                Ok(ModerationResult {
                    confirmed_requests: confirmed,
                    rejected_requests: rejected,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockEventSource, MockUserSource};
    use crate::repository::InMemoryRequestRepository;

    fn facts(initiator: i64, published: bool, limit: i64, moderation: bool) -> EventFacts {
        EventFacts {
            id: 1,
            initiator_id: initiator,
            published,
            participant_limit: limit,
            request_moderation: moderation,
        }
    }

    fn service_with(
        event: Option<EventFacts>,
    ) -> RequestService<InMemoryRequestRepository, MockEventSource, MockUserSource> {
        let mut events = MockEventSource::new();
        events
            .expect_event_facts()
            .returning(move |_| Ok(event));

        let mut users = MockUserSource::new();
        users.expect_user_exists().returning(|_| Ok(true));

        RequestService::new(InMemoryRequestRepository::new(), events, users)
    }

    #[tokio::test]
    async fn test_request_to_own_event_conflicts() {
        let service = service_with(Some(facts(5, true, 10, true)));

        let result = service.create_request(5, 1).await;

        assert!(matches!(result, Err(RequestError::OwnEvent(5))));
    }

    #[tokio::test]
    async fn test_request_to_unpublished_event_conflicts() {
        let service = service_with(Some(facts(1, false, 10, true)));

        let result = service.create_request(2, 1).await;

        assert!(matches!(result, Err(RequestError::NotPublished(1))));
    }

    #[tokio::test]
    async fn test_request_without_moderation_is_confirmed() {
        let service = service_with(Some(facts(1, true, 10, false)));

        let request = service.create_request(2, 1).await.unwrap();

        assert_eq!(request.status, RequestState::Confirmed);
    }

    #[tokio::test]
    async fn test_request_with_unlimited_capacity_is_confirmed() {
        let service = service_with(Some(facts(1, true, 0, true)));

        let request = service.create_request(2, 1).await.unwrap();

        assert_eq!(request.status, RequestState::Confirmed);
    }

    #[tokio::test]
    async fn test_request_with_moderation_is_pending() {
        let service = service_with(Some(facts(1, true, 10, true)));

        let request = service.create_request(2, 1).await.unwrap();

        assert_eq!(request.status, RequestState::Pending);
    }

    #[tokio::test]
    async fn test_request_to_full_event_conflicts() {
        let service = service_with(Some(facts(1, true, 1, false)));

        service.create_request(2, 1).await.unwrap();
        let result = service.create_request(3, 1).await;

        assert!(matches!(result, Err(RequestError::LimitReached(1))));
    }

    #[tokio::test]
    async fn test_cancel_foreign_request_is_not_found() {
        let service = service_with(Some(facts(1, true, 10, true)));

        let request = service.create_request(2, 1).await.unwrap();
        let result = service.cancel_request(3, request.id).await;

        assert!(matches!(result, Err(RequestError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_own_request() {
        let service = service_with(Some(facts(1, true, 10, true)));

        let request = service.create_request(2, 1).await.unwrap();
        let canceled = service.cancel_request(2, request.id).await.unwrap();

        assert_eq!(canceled.status, RequestState::Canceled);
    }

    #[tokio::test]
    async fn test_moderation_overflow_rejects_remainder() {
        let service = service_with(Some(facts(1, true, 2, true)));

        let a = service.create_request(2, 1).await.unwrap();
        let b = service.create_request(3, 1).await.unwrap();
        let c = service.create_request(4, 1).await.unwrap();

        let result = service
            .moderate_requests(
                1,
                1,
                ModerationUpdate {
                    request_ids: vec![a.id, b.id, c.id],
                    status: ModerationDecision::Confirmed,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.confirmed_requests.len(), 2);
        assert_eq!(result.rejected_requests.len(), 1);
        assert_eq!(result.rejected_requests[0].id, c.id);
    }

    #[tokio::test]
    async fn test_moderation_by_non_owner_is_not_found() {
        let service = service_with(Some(facts(1, true, 2, true)));

        let result = service
            .moderate_requests(
                9,
                1,
                ModerationUpdate {
                    request_ids: vec![1],
                    status: ModerationDecision::Rejected,
                },
            )
            .await;

        assert!(matches!(result, Err(RequestError::EventNotFound(1))));
    }

    #[tokio::test]
    async fn test_moderation_of_non_pending_request_conflicts() {
        let service = service_with(Some(facts(1, true, 5, true)));

        let request = service.create_request(2, 1).await.unwrap();
        service.cancel_request(2, request.id).await.unwrap();

        let result = service
            .moderate_requests(
                1,
                1,
                ModerationUpdate {
                    request_ids: vec![request.id],
                    status: ModerationDecision::Confirmed,
                },
            )
            .await;

        assert!(matches!(result, Err(RequestError::NotPending(_))));
    }
}
