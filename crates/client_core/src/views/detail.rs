use std::marker::PhantomData;

use shared::error::ErrorCode;
use tracing::warn;

use crate::{
    entities::ConferenceEntity,
    routes::{Page, Route},
    state::EntityState,
    store::EntityStore,
};

pub struct DetailView<E> {
    id: i64,
    missing: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ConferenceEntity> DetailView<E> {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            missing: false,
            _entity: PhantomData,
        }
    }

    pub async fn mount(&mut self, store: &mut EntityStore<E>) {
        if let Err(err) = store.fetch_one(self.id).await {
            warn!(entity = %E::KIND, id = self.id, error = %err, "detail fetch failed");
            self.missing = err.code() == ErrorCode::NotFound;
        }
    }

    pub fn render(&self, state: &EntityState<E>) -> String {
        let back = Route::list(E::KIND).path();
        if self.missing {
            return format!("{} {} not found\nBack: {back}\n", E::KIND, self.id);
        }

        let mut out = format!("{}\n", E::KIND);
        for (label, value) in state.entity.detail_fields() {
            out.push_str(&format!("  {label}: {value}\n"));
        }
        out.push_str(&format!("Back: {back}\n"));
        let edit = Route {
            kind: E::KIND,
            page: Page::Edit(state.entity.id_value().unwrap_or(self.id)),
        };
        out.push_str(&format!("Edit: {}\n", edit.path()));
        if let Some(message) = &state.error_message {
            out.push_str(&format!("Error: {message}\n"));
        }
        out
    }
}
