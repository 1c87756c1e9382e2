//! Client for the conference backend: rooms, timeslots and talks.
//!
//! Each entity type gets an [`EntityStore`] holding the last list and focused entity the
//! backend returned. Views in [`views`] mount against a store, react to one interaction
//! and render plain text. [`Conference`] owns the stores and dispatches client routes.

pub mod api;
pub mod app;
pub mod config;
pub mod entities;
pub mod error;
pub mod format;
pub mod routes;
pub mod state;
pub mod store;
pub mod views;

pub use api::{ApiConnection, EntityApi, HttpResource, Page};
pub use app::{Conference, Interaction, Visit, VisitError};
pub use config::{load_settings, Settings};
pub use entities::ConferenceEntity;
pub use error::ClientError;
pub use routes::{entity_menu, Location, MenuItem, Route, RouteError};
pub use state::{EntityAction, EntityState, Outcome};
pub use store::EntityStore;

#[cfg(test)]
#[path = "tests/backend.rs"]
mod test_backend;
