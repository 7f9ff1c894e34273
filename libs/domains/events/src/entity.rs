//! Sea-ORM entities for the events and locations tables.

pub mod locations {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Deduplicated event venue, matched by exact coordinates.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "locations")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub lat: f64,
        pub lon: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod events {
    use crate::models::EventState;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "events")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub title: String,
        #[sea_orm(column_type = "Text")]
        pub annotation: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub category_id: i64,
        pub initiator_id: i64,
        pub location_id: i64,
        pub event_date: DateTimeUtc,
        pub paid: bool,
        pub participant_limit: i32,
        pub request_moderation: bool,
        pub state: EventState,
        pub created_on: DateTimeUtc,
        pub published_on: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::locations::Entity",
            from = "Column::LocationId",
            to = "super::locations::Column::Id"
        )]
        Location,
    }

    impl Related<super::locations::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Location.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<(Model, super::locations::Model)> for crate::models::Event {
        fn from((event, location): (Model, super::locations::Model)) -> Self {
            Self {
                id: event.id,
                title: event.title,
                annotation: event.annotation,
                description: event.description,
                category_id: event.category_id,
                initiator_id: event.initiator_id,
                location_id: event.location_id,
                location: crate::models::Location {
                    lat: location.lat,
                    lon: location.lon,
                },
                event_date: event.event_date,
                paid: event.paid,
                participant_limit: event.participant_limit,
                request_moderation: event.request_moderation,
                state: event.state,
                created_on: event.created_on,
                published_on: event.published_on,
            }
        }
    }
}
