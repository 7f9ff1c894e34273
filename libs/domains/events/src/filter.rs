//! Filter specification for event queries.
//!
//! An [`EventFilter`] is an immutable value built fresh for every call by the
//! pure constructors below. All criteria are conjunctive; an absent criterion
//! imposes no constraint. Storage adapters translate the same specification
//! into their own terms: SQL in [`crate::postgres`], a post-filter in
//! [`crate::repository`].

use chrono::{DateTime, Utc};

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub initiator_ids: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub category_ids: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    /// Case-insensitive substring matched against annotation or description
    pub text: Option<String>,
    /// Keep only events that still have free capacity
    pub only_available: bool,
}

impl EventFilter {
    /// Admin filter: open-sided date bounds, no defaulting.
    pub fn admin(
        initiator_ids: Option<Vec<i64>>,
        states: Option<Vec<EventState>>,
        category_ids: Option<Vec<i64>>,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            initiator_ids,
            states,
            category_ids,
            range_start,
            range_end,
            ..Self::default()
        }
    }

    /// Public filter: always constrained to published events.
    ///
    /// When neither date bound is supplied the lower bound defaults to `now`,
    /// so past events do not surface. A single supplied bound is applied
    /// as-given. An inverted range is rejected.
    pub fn public_search(
        text: Option<String>,
        category_ids: Option<Vec<i64>>,
        paid: Option<bool>,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
        only_available: bool,
        now: DateTime<Utc>,
    ) -> EventResult<Self> {
        if let (Some(start), Some(end)) = (range_start, range_end)
            && end < start
        {
            return Err(EventError::Validation(format!(
                "range_end {} precedes range_start {}",
                end, start
            )));
        }

        let range_start = match (range_start, range_end) {
            (None, None) => Some(now),
            (start, _) => start,
        };

        Ok(Self {
            initiator_ids: None,
            states: Some(vec![EventState::Published]),
            category_ids,
            paid,
            range_start,
            range_end,
            text: text.filter(|t| !t.trim().is_empty()),
            only_available,
        })
    }

    /// Evaluate the filter against one event, given its confirmed request
    /// count. This is the reference semantics the SQL translation must match.
    pub fn matches(&self, event: &Event, confirmed: i64) -> bool {
        if let Some(ref ids) = self.initiator_ids
            && !ids.contains(&event.initiator_id)
        {
            return false;
        }
        if let Some(ref states) = self.states
            && !states.contains(&event.state)
        {
            return false;
        }
        if let Some(ref ids) = self.category_ids
            && !ids.contains(&event.category_id)
        {
            return false;
        }
        if let Some(paid) = self.paid
            && event.paid != paid
        {
            return false;
        }
        if let Some(start) = self.range_start
            && event.event_date < start
        {
            return false;
        }
        if let Some(end) = self.range_end
            && event.event_date > end
        {
            return false;
        }
        if let Some(ref text) = self.text {
            let needle = text.to_lowercase();
            let hit = event.annotation.to_lowercase().contains(&needle)
                || event.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if self.only_available
            && event.participant_limit > 0
            && confirmed >= i64::from(event.participant_limit)
        {
            return false;
        }
        true
    }
}
