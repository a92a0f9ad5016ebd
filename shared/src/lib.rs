//! Shared library for the event store gateway.
//!
//! Configuration, database access, the response envelope and the event store
//! used by the Lambda functions in this workspace.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod secrets;
pub mod store;

pub use config::{Config, CredentialSource, DatabaseTarget};
pub use db::create_pool;
pub use error::{Error, Result};
pub use models::{CreateEventRequest, Event, JsonResponse, ResponseType, UpdateEventRequest};
pub use secrets::{get_secret, resolve_credentials, DatabaseCredentials};
pub use store::EventStore;
