//! Per-entity state container and the reducer that drives it.

use crate::api::Page;

/// Lifecycle phase of one asynchronous action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Pending,
    Success(T),
    Failure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityAction<E> {
    FetchList(Outcome<Page<E>>),
    FetchOne(Outcome<E>),
    /// create, update and partial update
    Save(Outcome<E>),
    Delete(Outcome<()>),
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<E> {
    pub entities: Vec<E>,
    pub entity: E,
    pub total_items: u64,
    pub loading: bool,
    pub updating: bool,
    pub update_success: bool,
    pub error_message: Option<String>,
}

impl<E: Default> Default for EntityState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            entity: E::default(),
            total_items: 0,
            loading: false,
            updating: false,
            update_success: false,
            error_message: None,
        }
    }
}

impl<E: Default> EntityState<E> {
    pub fn reduce(&mut self, action: EntityAction<E>) {
        match action {
            EntityAction::FetchList(Outcome::Pending) | EntityAction::FetchOne(Outcome::Pending) => {
                self.error_message = None;
                self.update_success = false;
                self.loading = true;
            }
            EntityAction::Save(Outcome::Pending) | EntityAction::Delete(Outcome::Pending) => {
                self.error_message = None;
                self.update_success = false;
                self.updating = true;
            }
            EntityAction::FetchList(Outcome::Success(page)) => {
                self.loading = false;
                self.entities = page.items;
                self.total_items = page.total_items;
            }
            EntityAction::FetchOne(Outcome::Success(entity)) => {
                self.loading = false;
                self.entity = entity;
            }
            EntityAction::Save(Outcome::Success(entity)) => {
                self.updating = false;
                self.loading = false;
                self.update_success = true;
                self.entity = entity;
            }
            EntityAction::Delete(Outcome::Success(())) => {
                self.updating = false;
                self.update_success = true;
                self.entity = E::default();
            }
            EntityAction::FetchList(Outcome::Failure(message))
            | EntityAction::FetchOne(Outcome::Failure(message))
            | EntityAction::Save(Outcome::Failure(message))
            | EntityAction::Delete(Outcome::Failure(message)) => {
                self.loading = false;
                self.updating = false;
                self.update_success = false;
                self.error_message = Some(message);
            }
            EntityAction::Reset => *self = Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{Room, RoomId};

    use super::*;

    fn room(id: i64, name: &str) -> Room {
        Room {
            id: Some(RoomId(id)),
            name: Some(name.into()),
            capacity: None,
        }
    }

    #[test]
    fn list_pending_clears_flags_and_starts_loading() {
        let mut state = EntityState::<Room> {
            update_success: true,
            error_message: Some("boom".into()),
            ..EntityState::default()
        };

        state.reduce(EntityAction::FetchList(Outcome::Pending));

        assert!(state.loading);
        assert!(!state.update_success);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn list_success_replaces_entities_and_total() {
        let mut state = EntityState::<Room> {
            entities: vec![room(9, "old")],
            ..EntityState::default()
        };
        state.reduce(EntityAction::FetchList(Outcome::Pending));
        state.reduce(EntityAction::FetchList(Outcome::Success(Page {
            items: vec![room(1, "Saal 1"), room(2, "Saal 2")],
            total_items: 41,
        })));

        assert!(!state.loading);
        assert_eq!(state.entities, vec![room(1, "Saal 1"), room(2, "Saal 2")]);
        assert_eq!(state.total_items, 41);
    }

    #[test]
    fn save_success_marks_update_success_and_focuses_response() {
        let mut state = EntityState::<Room>::default();
        state.reduce(EntityAction::Save(Outcome::Pending));
        assert!(state.updating);

        state.reduce(EntityAction::Save(Outcome::Success(room(3, "Foyer"))));

        assert!(!state.updating);
        assert!(!state.loading);
        assert!(state.update_success);
        assert_eq!(state.entity, room(3, "Foyer"));
    }

    #[test]
    fn delete_success_clears_focused_entity() {
        let mut state = EntityState::<Room> {
            entity: room(3, "Foyer"),
            ..EntityState::default()
        };
        state.reduce(EntityAction::Delete(Outcome::Pending));
        state.reduce(EntityAction::Delete(Outcome::Success(())));

        assert!(state.update_success);
        assert!(!state.updating);
        assert_eq!(state.entity, Room::default());
    }

    #[test]
    fn failure_keeps_prior_data_and_records_message() {
        let mut state = EntityState::<Room> {
            entities: vec![room(1, "Saal 1")],
            entity: room(1, "Saal 1"),
            total_items: 1,
            ..EntityState::default()
        };
        state.reduce(EntityAction::Save(Outcome::Pending));
        state.reduce(EntityAction::Save(Outcome::Failure(
            "request failed with status code 500".into(),
        )));

        assert!(!state.updating);
        assert!(!state.loading);
        assert!(!state.update_success);
        assert_eq!(
            state.error_message.as_deref(),
            Some("request failed with status code 500")
        );
        assert_eq!(state.entities, vec![room(1, "Saal 1")]);
        assert_eq!(state.entity, room(1, "Saal 1"));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = EntityState::<Room> {
            entities: vec![room(1, "Saal 1")],
            entity: room(1, "Saal 1"),
            total_items: 1,
            loading: true,
            updating: true,
            update_success: true,
            error_message: Some("x".into()),
        };
        state.reduce(EntityAction::Reset);
        assert_eq!(state, EntityState::default());
    }
}
