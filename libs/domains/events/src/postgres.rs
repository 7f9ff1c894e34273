//! Postgres adapters: the SQL translation of [`EventFilter`] and the
//! deduplicating location store.

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr, ExprTrait, Query, SimpleExpr, SubQueryStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    entity::{events, locations},
    error::{EventError, EventResult},
    filter::EventFilter,
    models::{Event, Location, NewEvent},
    ports::LocationStore,
    repository::EventRepository,
};

/// Postgres-backed implementation of EventRepository
#[derive(Clone)]
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Correlated subquery counting confirmed requests of the outer event.
    fn confirmed_count_subquery() -> SimpleExpr {
        let requests = Alias::new("requests");
        let sub = Query::select()
            .expr(Expr::col((requests.clone(), Alias::new("id"))).count())
            .from(requests.clone())
            .and_where(
                Expr::col((requests.clone(), Alias::new("event_id")))
                    .equals((events::Entity, events::Column::Id)),
            )
            .and_where(Expr::col((requests, Alias::new("status"))).eq("CONFIRMED"))
            .to_owned();

        SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(sub)))
    }

    fn condition(filter: &EventFilter) -> Condition {
        let mut cond = Condition::all();

        if let Some(ref ids) = filter.initiator_ids {
            cond = cond.add(events::Column::InitiatorId.is_in(ids.clone()));
        }
        if let Some(ref states) = filter.states {
            cond = cond.add(events::Column::State.is_in(states.clone()));
        }
        if let Some(ref ids) = filter.category_ids {
            cond = cond.add(events::Column::CategoryId.is_in(ids.clone()));
        }
        if let Some(paid) = filter.paid {
            cond = cond.add(events::Column::Paid.eq(paid));
        }
        if let Some(start) = filter.range_start {
            cond = cond.add(events::Column::EventDate.gte(start));
        }
        if let Some(end) = filter.range_end {
            cond = cond.add(events::Column::EventDate.lte(end));
        }
        if let Some(ref text) = filter.text {
            let pattern = format!("%{}%", text);
            cond = cond.add(
                Condition::any()
                    .add(
                        Expr::col((events::Entity, events::Column::Annotation))
                            .ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((events::Entity, events::Column::Description)).ilike(pattern),
                    ),
            );
        }
        if filter.only_available {
            cond = cond.add(
                Condition::any()
                    .add(events::Column::ParticipantLimit.eq(0))
                    .add(
                        Expr::col((events::Entity, events::Column::ParticipantLimit))
                            .gt(Self::confirmed_count_subquery()),
                    ),
            );
        }

        cond
    }

    fn into_event(
        (event, location): (events::Model, Option<locations::Model>),
    ) -> EventResult<Event> {
        let location = location.ok_or_else(|| {
            EventError::Database(sea_orm::DbErr::RecordNotFound(format!(
                "location {} of event {}",
                event.location_id, event.id
            )))
        })?;
        Ok((event, location).into())
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(
        &self,
        initiator_id: i64,
        input: NewEvent,
        location_id: i64,
    ) -> EventResult<Event> {
        let location = input.location;
        let active_model = events::ActiveModel {
            title: Set(input.title),
            annotation: Set(input.annotation),
            description: Set(input.description),
            category_id: Set(input.category_id),
            initiator_id: Set(initiator_id),
            location_id: Set(location_id),
            event_date: Set(input.event_date),
            paid: Set(input.paid),
            participant_limit: Set(input.participant_limit),
            request_moderation: Set(true),
            state: Set(crate::models::EventState::Pending),
            created_on: Set(chrono::Utc::now()),
            published_on: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        tracing::info!(event_id = model.id, initiator_id, "Created event");

        let stored = locations::Model {
            id: location_id,
            lat: location.lat,
            lon: location.lon,
        };
        Ok((model, stored).into())
    }

    async fn get_by_id(&self, id: i64) -> EventResult<Option<Event>> {
        let row = events::Entity::find_by_id(id)
            .find_also_related(locations::Entity)
            .one(&self.db)
            .await?;

        row.map(Self::into_event).transpose()
    }

    async fn get_by_initiator_and_id(
        &self,
        initiator_id: i64,
        id: i64,
    ) -> EventResult<Option<Event>> {
        let row = events::Entity::find_by_id(id)
            .filter(events::Column::InitiatorId.eq(initiator_id))
            .find_also_related(locations::Entity)
            .one(&self.db)
            .await?;

        row.map(Self::into_event).transpose()
    }

    async fn find(
        &self,
        filter: &EventFilter,
        page: Option<(u64, u64)>,
    ) -> EventResult<Vec<Event>> {
        let mut query = events::Entity::find()
            .find_also_related(locations::Entity)
            .filter(Self::condition(filter))
            .order_by_asc(events::Column::Id);

        if let Some((from, size)) = page {
            query = query.offset(from).limit(size);
        }

        let rows = query.all(&self.db).await?;
        rows.into_iter().map(Self::into_event).collect()
    }

    async fn list_by_initiator(
        &self,
        initiator_id: i64,
        from: u64,
        size: u64,
    ) -> EventResult<Vec<Event>> {
        let rows = events::Entity::find()
            .find_also_related(locations::Entity)
            .filter(events::Column::InitiatorId.eq(initiator_id))
            .order_by_asc(events::Column::Id)
            .offset(from)
            .limit(size)
            .all(&self.db)
            .await?;

        rows.into_iter().map(Self::into_event).collect()
    }

    async fn save(&self, event: Event) -> EventResult<Event> {
        let location = event.location;
        let active_model = events::ActiveModel {
            id: Set(event.id),
            title: Set(event.title),
            annotation: Set(event.annotation),
            description: Set(event.description),
            category_id: Set(event.category_id),
            initiator_id: Set(event.initiator_id),
            location_id: Set(event.location_id),
            event_date: Set(event.event_date),
            paid: Set(event.paid),
            participant_limit: Set(event.participant_limit),
            request_moderation: Set(event.request_moderation),
            state: Set(event.state),
            created_on: Set(event.created_on),
            published_on: Set(event.published_on),
        };

        let model = active_model.update(&self.db).await?;
        tracing::info!(event_id = model.id, "Saved event");

        let stored = locations::Model {
            id: model.location_id,
            lat: location.lat,
            lon: location.lon,
        };
        Ok((model, stored).into())
    }
}

/// Postgres-backed implementation of LocationStore
#[derive(Clone)]
pub struct PgLocationStore {
    db: DatabaseConnection,
}

impl PgLocationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn resolve(&self, location: Location) -> EventResult<i64> {
        let existing = locations::Entity::find()
            .filter(locations::Column::Lat.eq(location.lat))
            .filter(locations::Column::Lon.eq(location.lon))
            .one(&self.db)
            .await?;

        if let Some(model) = existing {
            return Ok(model.id);
        }

        let model = locations::ActiveModel {
            lat: Set(location.lat),
            lon: Set(location.lon),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(location_id = model.id, "Created location");
        Ok(model.id)
    }
}
