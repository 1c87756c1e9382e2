//! Entity stores: run one backend call per action and feed its phases to the container.

use std::sync::Arc;

use shared::{domain::Entity, protocol::ListQuery};
use tracing::{info, warn};

use crate::{
    api::EntityApi,
    error::ClientError,
    state::{EntityAction, EntityState, Outcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveKind {
    Create,
    Update,
    PartialUpdate,
}

pub struct EntityStore<E: Entity> {
    api: Arc<dyn EntityApi<E>>,
    state: EntityState<E>,
}

impl<E: Entity> EntityStore<E> {
    pub fn new(api: Arc<dyn EntityApi<E>>) -> Self {
        Self {
            api,
            state: EntityState::default(),
        }
    }

    pub fn state(&self) -> &EntityState<E> {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reduce(EntityAction::Reset);
    }

    pub async fn fetch_list(&mut self, query: &ListQuery) -> Result<(), ClientError> {
        self.state.reduce(EntityAction::FetchList(Outcome::Pending));
        self.complete_list(query).await
    }

    pub async fn fetch_one(&mut self, id: i64) -> Result<(), ClientError> {
        self.state.reduce(EntityAction::FetchOne(Outcome::Pending));
        match self.api.get(id).await {
            Ok(entity) => {
                self.state
                    .reduce(EntityAction::FetchOne(Outcome::Success(entity)));
                Ok(())
            }
            Err(err) => {
                warn!(entity = %E::KIND, id, error = %err, "failed to fetch entity");
                self.state
                    .reduce(EntityAction::FetchOne(Outcome::Failure(err.to_string())));
                Err(err)
            }
        }
    }

    pub async fn create(&mut self, entity: E) -> Result<E, ClientError> {
        self.save(SaveKind::Create, entity).await
    }

    pub async fn update(&mut self, entity: E) -> Result<E, ClientError> {
        self.save(SaveKind::Update, entity).await
    }

    pub async fn partial_update(&mut self, entity: E) -> Result<E, ClientError> {
        self.save(SaveKind::PartialUpdate, entity).await
    }

    /// A failing follow-up list fetch is recorded in the container, not returned.
    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        self.state.reduce(EntityAction::Delete(Outcome::Pending));
        match self.api.delete(id).await {
            Ok(()) => {
                self.state
                    .reduce(EntityAction::FetchList(Outcome::Pending));
                self.state.reduce(EntityAction::Delete(Outcome::Success(())));
                info!(entity = %E::KIND, id, "entity deleted");
                self.refetch_after_mutation().await;
                Ok(())
            }
            Err(err) => {
                warn!(entity = %E::KIND, id, error = %err, "failed to delete entity");
                self.state
                    .reduce(EntityAction::Delete(Outcome::Failure(err.to_string())));
                Err(err)
            }
        }
    }

    async fn save(&mut self, kind: SaveKind, entity: E) -> Result<E, ClientError> {
        self.state.reduce(EntityAction::Save(Outcome::Pending));
        let result = match kind {
            SaveKind::Create => self.api.create(&entity).await,
            SaveKind::Update => self.api.update(&entity).await,
            SaveKind::PartialUpdate => self.api.partial_update(&entity).await,
        };

        match result {
            Ok(saved) => {
                // the refetch is dispatched before the save settles
                self.state
                    .reduce(EntityAction::FetchList(Outcome::Pending));
                self.state
                    .reduce(EntityAction::Save(Outcome::Success(saved.clone())));
                info!(entity = %E::KIND, id = ?saved.id_value(), ?kind, "entity saved");
                self.refetch_after_mutation().await;
                Ok(saved)
            }
            Err(err) => {
                warn!(entity = %E::KIND, ?kind, error = %err, "failed to save entity");
                self.state
                    .reduce(EntityAction::Save(Outcome::Failure(err.to_string())));
                Err(err)
            }
        }
    }

    async fn refetch_after_mutation(&mut self) {
        // already recorded in the container
        let _ = self.complete_list(&ListQuery::unpaged()).await;
    }

    async fn complete_list(&mut self, query: &ListQuery) -> Result<(), ClientError> {
        match self.api.list(query).await {
            Ok(page) => {
                self.state
                    .reduce(EntityAction::FetchList(Outcome::Success(page)));
                Ok(())
            }
            Err(err) => {
                warn!(entity = %E::KIND, error = %err, "failed to fetch entity list");
                self.state
                    .reduce(EntityAction::FetchList(Outcome::Failure(err.to_string())));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
