//! Delete confirmation reached through `/<entity>/:id/delete`.

use std::marker::PhantomData;

use shared::error::ErrorCode;
use tracing::warn;

use crate::{
    entities::ConferenceEntity,
    error::ClientError,
    routes::{Location, Route},
    state::EntityState,
    store::EntityStore,
};

pub struct DeleteDialog<E> {
    id: i64,
    search: String,
    missing: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ConferenceEntity> DeleteDialog<E> {
    pub fn new(id: i64, location: &Location) -> Self {
        Self {
            id,
            search: location.search.clone(),
            missing: false,
            _entity: PhantomData,
        }
    }

    /// Loads the entity so the question can name it.
    pub async fn mount(&mut self, store: &mut EntityStore<E>) {
        if let Err(err) = store.fetch_one(self.id).await {
            warn!(entity = %E::KIND, id = self.id, error = %err, "delete dialog fetch failed");
            self.missing = err.code() == ErrorCode::NotFound;
        }
    }

    pub fn question(&self, state: &EntityState<E>) -> String {
        let id = state
            .entity
            .id_value()
            .map(|id| id.to_string())
            .unwrap_or_default();
        format!("Are you sure you want to delete {} {id}?", E::KIND)
    }

    /// Deletes the loaded entity. The dialog closes as soon as the delete itself succeeded.
    pub async fn confirm(&self, store: &mut EntityStore<E>) -> Result<Location, ClientError> {
        let id = store
            .state()
            .entity
            .id_value()
            .ok_or(ClientError::MissingId(E::KIND))?;
        store.delete(id).await?;
        Ok(self.close())
    }

    pub fn close(&self) -> Location {
        Location::new(Route::list(E::KIND).path(), self.search.clone())
    }

    pub fn render(&self, state: &EntityState<E>) -> String {
        let mut out = String::from("Confirm delete operation\n");
        if self.missing {
            out.push_str(&format!("{} {} not found\n", E::KIND, self.id));
        } else {
            out.push_str(&self.question(state));
            out.push('\n');
        }
        if let Some(message) = &state.error_message {
            out.push_str(&format!("Error: {message}\n"));
        }
        out
    }
}
