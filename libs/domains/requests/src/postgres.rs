use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use std::collections::HashMap;

use crate::{
    entity,
    error::{RequestError, RequestResult},
    models::{ParticipationRequest, RequestState},
    repository::RequestRepository,
};

/// Postgres-backed implementation of RequestRepository
#[derive(Clone)]
pub struct PgRequestRepository {
    db: DatabaseConnection,
}

impl PgRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(FromQueryResult)]
struct ConfirmedCount {
    event_id: i64,
    confirmed: i64,
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn insert(
        &self,
        event_id: i64,
        requester_id: i64,
        status: RequestState,
    ) -> RequestResult<ParticipationRequest> {
        let active_model = entity::ActiveModel {
            event_id: Set(event_id),
            requester_id: Set(requester_id),
            status: Set(status),
            created_on: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                RequestError::Duplicate(requester_id, event_id)
            } else {
                RequestError::Database(e)
            }
        })?;

        tracing::info!(
            request_id = model.id,
            event_id,
            requester_id,
            "Created request"
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ParticipationRequest>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_by_requester(
        &self,
        requester_id: i64,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        let models = entity::Entity::find()
            .filter(entity::Column::RequesterId.eq(requester_id))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_event(&self, event_id: i64) -> RequestResult<Vec<ParticipationRequest>> {
        let models = entity::Entity::find()
            .filter(entity::Column::EventId.eq(event_id))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_many(&self, ids: Vec<i64>) -> RequestResult<Vec<ParticipationRequest>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn set_status(
        &self,
        ids: Vec<i64>,
        status: RequestState,
    ) -> RequestResult<Vec<ParticipationRequest>> {
        entity::Entity::update_many()
            .col_expr(entity::Column::Status, Expr::value(status))
            .filter(entity::Column::Id.is_in(ids.clone()))
            .exec(&self.db)
            .await?;

        self.find_many(ids).await
    }

    async fn count_confirmed(&self, event_id: i64) -> RequestResult<i64> {
        let count = entity::Entity::find()
            .filter(entity::Column::EventId.eq(event_id))
            .filter(entity::Column::Status.eq(RequestState::Confirmed))
            .count(&self.db)
            .await?;

        Ok(count as i64)
    }

    async fn count_confirmed_batch(
        &self,
        event_ids: Vec<i64>,
    ) -> RequestResult<HashMap<i64, i64>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ConfirmedCount> = entity::Entity::find()
            .select_only()
            .column(entity::Column::EventId)
            .column_as(entity::Column::Id.count(), "confirmed")
            .filter(entity::Column::EventId.is_in(event_ids))
            .filter(entity::Column::Status.eq(RequestState::Confirmed))
            .group_by(entity::Column::EventId)
            .into_model()
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.event_id, r.confirmed)).collect())
    }
}
