//! Create/edit form controller.

use std::{collections::BTreeMap, fmt, marker::PhantomData, str::FromStr};

use chrono::{DateTime, Utc};
use shared::domain::{Entity, EntityKind, Room, Timeslot};
use thiserror::Error;
use tracing::warn;

use crate::{
    app::Conference,
    entities::ConferenceEntity,
    error::ClientError,
    format::parse_local_input,
    routes::{Location, Route},
    state::EntityState,
};

/// Raw form input keyed by field name, as typed by the user.
pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    pub fn is_new(self) -> bool {
        matches!(self, FormMode::Create)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field}: this field is required")]
    Required { field: &'static str },
    #[error("{field}: {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },
    #[error("{field}: {value:?} is not a valid date and time")]
    InvalidDateTime { field: &'static str, value: String },
    #[error("id: {value:?} does not match the record being edited ({expected})")]
    IdChanged { expected: i64, value: String },
    #[error("{field}: no {kind} with id {value:?}")]
    UnknownReference {
        field: &'static str,
        kind: EntityKind,
        value: String,
    },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Required { field }
            | FieldError::NotANumber { field, .. }
            | FieldError::InvalidDateTime { field, .. }
            | FieldError::UnknownReference { field, .. } => *field,
            FieldError::IdChanged { .. } => "id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form is invalid: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Sibling lists a relationship field is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct References<'a> {
    pub rooms: &'a [Room],
    pub timeslots: &'a [Timeslot],
}

/// Reads typed values out of [`FormValues`], collecting every problem on the way.
pub struct FieldReader<'a> {
    values: &'a FormValues,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(values: &'a FormValues) -> Self {
        Self {
            values,
            errors: Vec::new(),
        }
    }

    fn present(&self, name: &str) -> Option<&'a str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// The id the saved entity carries. New entities never take one from the form; an edit
    /// keeps the routed id and rejects a form `id` naming another record.
    pub fn id(&mut self, mode: FormMode) -> Option<i64> {
        let FormMode::Edit(expected) = mode else {
            return None;
        };
        if let Some(raw) = self.present("id") {
            if raw.trim().parse::<i64>().ok() != Some(expected) {
                self.errors.push(FieldError::IdChanged {
                    expected,
                    value: raw.to_string(),
                });
            }
        }
        Some(expected)
    }

    pub fn required_text(&mut self, field: &'static str) -> Option<String> {
        match self.present(field) {
            Some(value) => Some(value.to_string()),
            None => {
                self.errors.push(FieldError::Required { field });
                None
            }
        }
    }

    /// Outer `None`: the form does not carry the field. Inner `None`: it was left empty.
    pub fn optional_number<T: FromStr>(&mut self, field: &'static str) -> Option<Option<T>> {
        let raw = self.values.get(field)?;
        if raw.trim().is_empty() {
            return Some(None);
        }
        match raw.trim().parse() {
            Ok(value) => Some(Some(value)),
            Err(_) => {
                self.errors.push(FieldError::NotANumber {
                    field,
                    value: raw.clone(),
                });
                None
            }
        }
    }

    pub fn required_datetime(&mut self, field: &'static str) -> Option<DateTime<Utc>> {
        let raw = self.required_text(field)?;
        let parsed = parse_local_input(&raw);
        if parsed.is_none() {
            self.errors
                .push(FieldError::InvalidDateTime { field, value: raw });
        }
        parsed
    }

    /// Matches the selected id string exactly against the ids of `candidates`.
    pub fn required_reference<T: Entity>(
        &mut self,
        field: &'static str,
        candidates: &[T],
    ) -> Option<T> {
        let selected = self.required_text(field)?;
        let found = candidates
            .iter()
            .find(|candidate| candidate.id_value().map(|id| id.to_string()) == Some(selected.clone()))
            .cloned();
        if found.is_none() {
            self.errors.push(FieldError::UnknownReference {
                field,
                kind: T::KIND,
                value: selected,
            });
        }
        found
    }

    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(FieldErrors(self.errors))
        }
    }
}

pub struct UpdateView<E> {
    mode: FormMode,
    search: String,
    values: FormValues,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ConferenceEntity> UpdateView<E> {
    pub fn new(mode: FormMode, location: &Location) -> Self {
        Self {
            mode,
            search: location.search.clone(),
            values: FormValues::new(),
            _entity: PhantomData,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Resets the container (create) or loads the entity (edit), then fills the form defaults.
    pub async fn mount(&mut self, conference: &mut Conference) {
        match self.mode {
            FormMode::Create => E::store_mut(conference).reset(),
            FormMode::Edit(id) => {
                if let Err(err) = E::store_mut(conference).fetch_one(id).await {
                    warn!(entity = %E::KIND, id, error = %err, "form opened without entity");
                }
            }
        }
        if E::NEEDS_REFERENCES {
            conference.load_references().await;
        }
        self.values = E::form_defaults(&E::store(conference).state().entity, self.mode, Utc::now());
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Validates, then creates or updates. On success returns where the form closes to.
    pub async fn submit(&mut self, conference: &mut Conference) -> Result<Location, SubmitError> {
        let entity = {
            let references = conference.references();
            let base = &E::store(conference).state().entity;
            E::from_form(base, self.mode, &self.values, &references)
                .map_err(SubmitError::Invalid)?
        };

        let store = E::store_mut(conference);
        if self.mode.is_new() {
            store.create(entity).await?;
        } else {
            store.update(entity).await?;
        }
        Ok(self.close())
    }

    pub fn close(&self) -> Location {
        Location::new(Route::list(E::KIND).path(), self.search.clone())
    }

    pub fn render(&self, state: &EntityState<E>) -> String {
        let mut out = format!("Create or edit a {}\n", E::KIND);
        if state.loading {
            out.push_str("Loading...\n");
            return out;
        }
        for name in E::form_fields() {
            if *name == "id" && self.mode.is_new() {
                continue;
            }
            let value = self.field(name).unwrap_or_default();
            out.push_str(&format!("  {name}: {value}\n"));
        }
        if state.updating {
            out.push_str("Saving...\n");
        }
        if let Some(message) = &state.error_message {
            out.push_str(&format!("Error: {message}\n"));
        }
        out
    }
}

#[cfg(test)]
#[path = "../tests/form_tests.rs"]
mod tests;
