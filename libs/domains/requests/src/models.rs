use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Lifecycle state of a participation request
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_state")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    /// Waiting for the event owner's decision
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Accepted; counts against the participant limit
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    /// Declined by the event owner
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    /// Withdrawn by the requester
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

/// A user's application to attend an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipationRequest {
    /// Unique identifier
    pub id: i64,
    /// Event being applied to
    pub event_id: i64,
    /// User who applied
    pub requester_id: i64,
    /// Current state
    pub status: RequestState,
    /// When the request was submitted
    pub created_on: DateTime<Utc>,
}

/// Query parameters for creating a request
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
pub struct NewRequest {
    /// Event to apply to
    pub event_id: i64,
}

/// Owner's decision applied to a batch of pending requests
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationDecision {
    Confirmed,
    Rejected,
}

/// Batch moderation payload for an event's pending requests
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ModerationUpdate {
    #[validate(length(min = 1))]
    pub request_ids: Vec<i64>,
    pub status: ModerationDecision,
}

/// Outcome of a batch moderation
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ModerationResult {
    pub confirmed_requests: Vec<ParticipationRequest>,
    pub rejected_requests: Vec<ParticipationRequest>,
}
