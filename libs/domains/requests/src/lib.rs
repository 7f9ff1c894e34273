//! Participation Requests Domain
//!
//! A participation request is a user's application to attend a published
//! event. Requests move through a small state machine (pending, confirmed,
//! rejected, canceled) driven by the requester and the event owner.
//!
//! The domain does not depend on the events domain directly; event facts
//! needed for request rules come in through the [`ports`] traits, wired up
//! by the application.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ports;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{RequestError, RequestResult};
pub use models::{
    ModerationDecision, ModerationResult, ModerationUpdate, NewRequest, ParticipationRequest,
    RequestState,
};
pub use ports::{EventFacts, EventSource, UserSource};
pub use postgres::PgRequestRepository;
pub use repository::{InMemoryRequestRepository, RequestRepository};
pub use service::RequestService;
