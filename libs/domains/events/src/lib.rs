//! Events Domain
//!
//! Events move through a moderation lifecycle (pending, published, canceled)
//! and are read through a query pipeline that filters at the store, enriches
//! every result with derived counts, then sorts and windows in memory.
//!
//! Collaborators from other domains and external services are reached through
//! the traits in [`ports`]; the application wires the concrete adapters.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_events::{
//!     handlers,
//!     repository::{InMemoryEventRepository, InMemoryLocationStore},
//!     service::EventService,
//! };
//! use std::sync::Arc;
//!
//! let service = EventService::new(
//!     InMemoryEventRepository::new(),
//!     Arc::new(InMemoryLocationStore::new()),
//!     categories,
//!     users,
//!     counter,
//!     views,
//! );
//!
//! let admin = handlers::admin_router(service.clone());
//! let owner = handlers::user_router(service.clone());
//! let public = handlers::public_router(service, hits);
//! ```

pub mod enrich;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod ports;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod state;

pub use enrich::Enricher;
pub use error::{EventError, EventResult};
pub use filter::EventFilter;
pub use models::{
    AdminEventUpdate, AdminSearch, AdminStateAction, Event, EventFull, EventPage, EventSort,
    EventState, Location, NewEvent, PublicSearch, UserEventUpdate, UserStateAction,
};
pub use postgres::{PgEventRepository, PgLocationStore};
pub use repository::{EventRepository, InMemoryEventRepository, InMemoryLocationStore};
pub use service::EventService;
