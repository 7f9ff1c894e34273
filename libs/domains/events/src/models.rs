use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Moderation state of an event
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_state")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    /// Submitted, waiting for moderation
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Visible to the public
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    /// Rejected by an admin or withdrawn by the owner
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

/// Moderation action available to admins
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// Lifecycle action available to the event owner
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

/// Sort order for public search results
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    EventDate,
    Views,
}

/// Geographic coordinates of an event venue
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema,
)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

/// Persisted event. Confirmed request counts and view counts are derived on
/// every read and live on [`EventFull`], never here.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub location_id: i64,
    pub location: Location,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    /// 0 means unlimited
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
}

impl Event {
    /// Content equality ignoring the store-assigned identity.
    ///
    /// Store identity is by `id` only; this compares everything else.
    pub fn same_content(&self, other: &Event) -> bool {
        self.title == other.title
            && self.annotation == other.annotation
            && self.description == other.description
            && self.category_id == other.category_id
            && self.initiator_id == other.initiator_id
            && self.location == other.location
            && self.event_date == other.event_date
            && self.paid == other.paid
            && self.participant_limit == other.participant_limit
            && self.request_moderation == other.request_moderation
            && self.state == other.state
            && self.created_on == other.created_on
            && self.published_on == other.published_on
    }

    /// Apply non-location field edits from a patch.
    ///
    /// Location changes are handled by the service because they require
    /// resolving a stored location ID first.
    pub fn apply_patch(&mut self, patch: &EventPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref annotation) = patch.annotation {
            self.annotation = annotation.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(event_date) = patch.event_date {
            self.event_date = event_date;
        }
        if let Some(paid) = patch.paid {
            self.paid = paid;
        }
        if let Some(participant_limit) = patch.participant_limit {
            self.participant_limit = participant_limit;
        }
        if let Some(request_moderation) = patch.request_moderation {
            self.request_moderation = request_moderation;
        }
    }
}

/// Event enriched with derived counts, as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventFull {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub location: Location,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
    /// Number of confirmed participation requests
    pub confirmed_requests: i64,
    /// Unique views recorded by the collector since creation
    pub views: i64,
}

impl EventFull {
    pub fn from_parts(event: Event, confirmed_requests: i64, views: i64) -> Self {
        Self {
            id: event.id,
            title: event.title,
            annotation: event.annotation,
            description: event.description,
            category_id: event.category_id,
            initiator_id: event.initiator_id,
            location: event.location,
            event_date: event.event_date,
            paid: event.paid,
            participant_limit: event.participant_limit,
            request_moderation: event.request_moderation,
            state: event.state,
            created_on: event.created_on,
            published_on: event.published_on,
            confirmed_requests,
            views,
        }
    }
}

/// DTO for creating an event.
///
/// Request moderation is always on for new events; owners can switch it off
/// afterwards through an update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewEvent {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 20, max = 2000))]
    pub annotation: String,
    #[validate(length(min = 20, max = 7000))]
    pub description: String,
    pub category_id: i64,
    pub event_date: DateTime<Utc>,
    #[validate(nested)]
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub participant_limit: i32,
}

/// Field edits shared by the admin and owner update paths
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EventPatch {
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(min = 20, max = 2000))]
    pub annotation: Option<String>,
    #[validate(length(min = 20, max = 7000))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
}

/// Admin update: field edits plus an optional moderation action
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminEventUpdate {
    #[serde(flatten)]
    #[validate(nested)]
    pub patch: EventPatch,
    pub state_action: Option<AdminStateAction>,
}

/// Owner update: field edits plus an optional lifecycle action
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserEventUpdate {
    #[serde(flatten)]
    #[validate(nested)]
    pub patch: EventPatch,
    pub state_action: Option<UserStateAction>,
}

/// Admin search criteria
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AdminSearch {
    /// Comma-separated initiator user IDs
    pub users: Option<String>,
    /// Comma-separated states (PENDING, PUBLISHED, CANCELED)
    pub states: Option<String>,
    /// Comma-separated category IDs
    pub categories: Option<String>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub from: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

impl Default for AdminSearch {
    fn default() -> Self {
        Self {
            users: None,
            states: None,
            categories: None,
            range_start: None,
            range_end: None,
            from: 0,
            size: default_size(),
        }
    }
}

impl AdminSearch {
    pub fn user_ids(&self) -> Option<Vec<i64>> {
        parse_id_list(self.users.as_deref())
    }

    pub fn category_ids(&self) -> Option<Vec<i64>> {
        parse_id_list(self.categories.as_deref())
    }

    pub fn state_list(&self) -> Option<Vec<EventState>> {
        self.states.as_ref().map(|raw| {
            raw.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
    }
}

/// Public search criteria
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct PublicSearch {
    /// Case-insensitive substring matched against annotation or description
    pub text: Option<String>,
    /// Comma-separated category IDs
    pub categories: Option<String>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    /// Keep only events that still have free capacity
    #[serde(default)]
    pub only_available: bool,
    pub sort: Option<EventSort>,
    #[serde(default)]
    pub from: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

impl Default for PublicSearch {
    fn default() -> Self {
        Self {
            text: None,
            categories: None,
            paid: None,
            range_start: None,
            range_end: None,
            only_available: false,
            sort: None,
            from: 0,
            size: default_size(),
        }
    }
}

impl PublicSearch {
    pub fn category_ids(&self) -> Option<Vec<i64>> {
        parse_id_list(self.categories.as_deref())
    }
}

/// Pagination window for the owner's event listing
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
pub struct EventPage {
    #[serde(default)]
    pub from: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 {
    10
}

fn parse_id_list(raw: Option<&str>) -> Option<Vec<i64>> {
    raw.map(|raw| {
        raw.split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_list_parses_names() {
        let search = AdminSearch {
            states: Some("PENDING,PUBLISHED".to_string()),
            ..Default::default()
        };
        assert_eq!(
            search.state_list(),
            Some(vec![EventState::Pending, EventState::Published])
        );
    }

    #[test]
    fn test_id_lists_drop_malformed_entries() {
        let search = AdminSearch {
            users: Some("1,x,3".to_string()),
            ..Default::default()
        };
        assert_eq!(search.user_ids(), Some(vec![1, 3]));
    }

    #[test]
    fn test_same_content_ignores_id() {
        let event = sample_event(1);
        let mut copy = event.clone();
        copy.id = 99;

        assert!(event.same_content(&copy));
        assert_ne!(event, copy);
    }

    #[test]
    fn test_same_content_detects_field_change() {
        let event = sample_event(1);
        let mut changed = event.clone();
        changed.paid = !changed.paid;

        assert!(!event.same_content(&changed));
    }

    fn sample_event(id: i64) -> Event {
        Event {
            id,
            title: "Open air".to_string(),
            annotation: "An open air concert downtown".to_string(),
            description: "Full description of the open air concert".to_string(),
            category_id: 1,
            initiator_id: 1,
            location_id: 1,
            location: Location { lat: 55.7, lon: 37.6 },
            event_date: chrono::Utc::now() + chrono::Duration::days(7),
            paid: false,
            participant_limit: 0,
            request_moderation: true,
            state: EventState::Pending,
            created_on: chrono::Utc::now(),
            published_on: None,
        }
    }
}
