//! Users Domain
//!
//! User accounts and the subscription graph between them. A subscription lets
//! one user follow another; the events domain uses the graph to build the
//! "events of people I follow" feed.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{NewUser, User, UserListQuery};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
