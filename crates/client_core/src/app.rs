//! The conference client: three entity stores plus route dispatch.

use std::sync::Arc;

use reqwest::Client;
use shared::{
    domain::{EntityKind, Room, Talk, Timeslot},
    protocol::ListQuery,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    api::{ApiConnection, EntityApi, HttpResource},
    config::{normalize_server_url, Settings},
    entities::ConferenceEntity,
    error::ClientError,
    routes::{Location, Page, Route, RouteError},
    store::EntityStore,
    views::{
        form::{FieldErrors, References},
        DeleteDialog, DetailView, FormMode, FormValues, ListView, PaginationState, SubmitError,
        UpdateView,
    },
};

/// One user action applied after a view has mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    None,
    Sort(String),
    Page(u32),
    Refresh,
    Submit(FormValues),
    ConfirmDelete,
    Cancel,
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::None => "view",
            Interaction::Sort(_) => "sort",
            Interaction::Page(_) => "page",
            Interaction::Refresh => "refresh",
            Interaction::Submit(_) => "submit",
            Interaction::ConfirmDelete => "confirm",
            Interaction::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Where the view ended up; list views rewrite the query string.
    pub location: Location,
    pub rendered: String,
    /// Set when the view closed itself.
    pub redirect: Option<Location>,
}

#[derive(Debug, Error)]
pub enum VisitError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("form is invalid: {0}")]
    Invalid(FieldErrors),
    #[error("{interaction} is not available on {path}")]
    Unsupported {
        path: String,
        interaction: &'static str,
    },
}

pub struct Conference {
    settings: Settings,
    /// Pagination of the list on screen; kept while consecutive visits stay on that list.
    open_list: Option<(EntityKind, PaginationState)>,
    pub rooms: EntityStore<Room>,
    pub timeslots: EntityStore<Timeslot>,
    pub talks: EntityStore<Talk>,
}

impl Conference {
    pub fn new(settings: Settings) -> Result<Self, ClientError> {
        let server_url = normalize_server_url(&settings.server_url)?;
        let connection =
            ApiConnection::new(Client::new(), server_url, settings.auth_token.clone());
        Ok(Self::with_apis(
            settings,
            Arc::new(HttpResource::<Room>::new(connection.clone())),
            Arc::new(HttpResource::<Timeslot>::new(connection.clone())),
            Arc::new(HttpResource::<Talk>::new(connection)),
        ))
    }

    pub fn with_apis(
        settings: Settings,
        rooms: Arc<dyn EntityApi<Room>>,
        timeslots: Arc<dyn EntityApi<Timeslot>>,
        talks: Arc<dyn EntityApi<Talk>>,
    ) -> Self {
        Self {
            settings,
            open_list: None,
            rooms: EntityStore::new(rooms),
            timeslots: EntityStore::new(timeslots),
            talks: EntityStore::new(talks),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetches the Room and Timeslot lists a Talk form selects from.
    pub async fn load_references(&mut self) {
        let query = ListQuery::unpaged();
        let (rooms, timeslots) = futures::join!(
            self.rooms.fetch_list(&query),
            self.timeslots.fetch_list(&query)
        );
        if let Err(err) = rooms {
            warn!(error = %err, "room options unavailable");
        }
        if let Err(err) = timeslots {
            warn!(error = %err, "timeslot options unavailable");
        }
    }

    pub fn references(&self) -> References<'_> {
        References {
            rooms: &self.rooms.state().entities,
            timeslots: &self.timeslots.state().entities,
        }
    }

    /// Mounts the view behind `location`, applies `interaction` and renders the result.
    pub async fn visit(
        &mut self,
        location: &Location,
        interaction: Interaction,
    ) -> Result<Visit, VisitError> {
        let route = Route::parse(&location.path)?;
        debug!(%location, interaction = interaction.name(), "visiting");
        if route.page != Page::List {
            self.open_list = None;
        }
        match route.kind {
            EntityKind::Room => self.visit_entity::<Room>(route, location, interaction).await,
            EntityKind::Timeslot => {
                self.visit_entity::<Timeslot>(route, location, interaction)
                    .await
            }
            EntityKind::Talk => self.visit_entity::<Talk>(route, location, interaction).await,
        }
    }

    async fn visit_entity<E: ConferenceEntity>(
        &mut self,
        route: Route,
        location: &Location,
        interaction: Interaction,
    ) -> Result<Visit, VisitError> {
        let unsupported = |interaction: &Interaction| VisitError::Unsupported {
            path: location.path.clone(),
            interaction: interaction.name(),
        };

        match route.page {
            Page::List => {
                let items_per_page = self.settings.items_per_page;
                let open = match self.open_list.take() {
                    Some((kind, pagination)) if kind == E::KIND => Some(pagination),
                    _ => None,
                };
                let store = E::store_mut(self);
                let mut view = match open {
                    Some(pagination) => {
                        let mut view = ListView::<E>::resume(pagination, location);
                        view.navigate(location, store).await;
                        view
                    }
                    None => {
                        let mut view = ListView::<E>::new(location, items_per_page);
                        view.mount(store).await;
                        view
                    }
                };
                match interaction {
                    Interaction::None => {}
                    Interaction::Sort(field) => view.sort_by(&field, store).await,
                    Interaction::Page(page) => view.select_page(page, store).await,
                    Interaction::Refresh => view.refresh(store).await,
                    other => return Err(unsupported(&other)),
                }
                let visit = Visit {
                    location: view.location().clone(),
                    rendered: view.render(store.state()),
                    redirect: None,
                };
                self.open_list = Some((E::KIND, view.pagination().clone()));
                Ok(visit)
            }
            Page::Create | Page::Edit(_) => {
                let mode = match route.page {
                    Page::Edit(id) => FormMode::Edit(id),
                    _ => FormMode::Create,
                };
                let mut view = UpdateView::<E>::new(mode, location);
                view.mount(self).await;
                let redirect = match interaction {
                    Interaction::None => None,
                    Interaction::Submit(values) => {
                        for (name, value) in values {
                            view.set_field(name, value);
                        }
                        match view.submit(self).await {
                            Ok(next) => Some(next),
                            Err(SubmitError::Invalid(errors)) => {
                                return Err(VisitError::Invalid(errors))
                            }
                            Err(SubmitError::Client(err)) => {
                                warn!(entity = %E::KIND, error = %err, "save failed");
                                None
                            }
                        }
                    }
                    Interaction::Cancel => Some(view.close()),
                    other => return Err(unsupported(&other)),
                };
                Ok(Visit {
                    location: location.clone(),
                    rendered: view.render(E::store(self).state()),
                    redirect,
                })
            }
            Page::Detail(id) => {
                if interaction != Interaction::None {
                    return Err(unsupported(&interaction));
                }
                let mut view = DetailView::<E>::new(id);
                let store = E::store_mut(self);
                view.mount(store).await;
                Ok(Visit {
                    location: location.clone(),
                    rendered: view.render(store.state()),
                    redirect: None,
                })
            }
            Page::Delete(id) => {
                let mut dialog = DeleteDialog::<E>::new(id, location);
                let store = E::store_mut(self);
                dialog.mount(store).await;
                let redirect = match interaction {
                    Interaction::None => None,
                    Interaction::ConfirmDelete => match dialog.confirm(store).await {
                        Ok(next) => Some(next),
                        Err(err) => {
                            warn!(entity = %E::KIND, id, error = %err, "delete failed");
                            None
                        }
                    },
                    Interaction::Cancel => Some(dialog.close()),
                    other => return Err(unsupported(&other)),
                };
                Ok(Visit {
                    location: location.clone(),
                    rendered: dialog.render(store.state()),
                    redirect,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
