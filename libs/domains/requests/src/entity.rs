use crate::models::RequestState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the requests table. The (event_id, requester_id) pair
/// is unique at the database level.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestState,
    pub created_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::ParticipationRequest {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            requester_id: model.requester_id,
            status: model.status,
            created_on: model.created_on,
        }
    }
}
