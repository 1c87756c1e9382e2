//! Paginated, sortable entity listing kept in sync with the route's query string.

use std::marker::PhantomData;

use shared::protocol::{ListQuery, Order, Sort, DEFAULT_SORT_FIELD};
use tracing::warn;
use url::form_urlencoded;

use crate::{
    entities::ConferenceEntity,
    routes::{Location, Page, Route},
    state::EntityState,
    store::EntityStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based
    pub active_page: u32,
    pub items_per_page: u32,
    pub sort: String,
    pub order: Order,
}

impl PaginationState {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            active_page: 1,
            items_per_page,
            sort: DEFAULT_SORT_FIELD.to_string(),
            order: Order::Asc,
        }
    }

    /// Seeds from `?page=..&sort=field,order`; each parameter is optional.
    pub fn from_search(search: &str, items_per_page: u32) -> Self {
        let mut state = Self::new(items_per_page);
        let (page, sort) = read_search(search);
        if let Some(page) = page {
            state.active_page = page;
        }
        if let Some(sort) = sort {
            state.sort = sort.field;
            state.order = sort.order;
        }
        state
    }

    /// Re-reads the url after a navigation. Only applies when both parameters are present.
    pub fn apply_search(&mut self, search: &str) -> bool {
        let (Some(page), Some(sort)) = read_search(search) else {
            return false;
        };
        let before = self.clone();
        self.active_page = page;
        self.sort = sort.field;
        self.order = sort.order;
        *self != before
    }

    /// Same column flips the order, a new column starts ascending.
    pub fn sort_by(&mut self, field: &str) {
        if self.sort == field {
            self.order = self.order.toggled();
        } else {
            self.sort = field.to_string();
            self.order = Order::Asc;
        }
    }

    pub fn to_search(&self) -> String {
        format!("?page={}&sort={},{}", self.active_page, self.sort, self.order)
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery::paged(
            self.active_page.saturating_sub(1),
            self.items_per_page,
            Sort::new(self.sort.clone(), self.order),
        )
    }
}

fn read_search(search: &str) -> (Option<u32>, Option<Sort>) {
    let mut page = None;
    let mut sort = None;
    for (key, value) in form_urlencoded::parse(search.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            "page" => page = value.parse::<u32>().ok().filter(|page| *page > 0),
            "sort" => sort = value.parse::<Sort>().ok(),
            _ => {}
        }
    }
    (page, sort)
}

pub struct ListView<E> {
    pagination: PaginationState,
    location: Location,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ConferenceEntity> ListView<E> {
    pub fn new(location: &Location, items_per_page: u32) -> Self {
        Self {
            pagination: PaginationState::from_search(&location.search, items_per_page),
            location: location.clone(),
            _entity: PhantomData,
        }
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Current url, rewritten after every pagination change.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub async fn mount(&mut self, store: &mut EntityStore<E>) {
        self.sync(store).await;
    }

    pub async fn sort_by(&mut self, field: &str, store: &mut EntityStore<E>) {
        self.pagination.sort_by(field);
        self.sync(store).await;
    }

    pub async fn select_page(&mut self, page: u32, store: &mut EntityStore<E>) {
        if page == 0 || page == self.pagination.active_page {
            return;
        }
        self.pagination.active_page = page;
        self.sync(store).await;
    }

    pub async fn refresh(&mut self, store: &mut EntityStore<E>) {
        self.sync(store).await;
    }

    /// Picks up pagination from an earlier visit to the same list route.
    pub fn resume(pagination: PaginationState, location: &Location) -> Self {
        Self {
            pagination,
            location: location.clone(),
            _entity: PhantomData,
        }
    }

    /// Navigation to the same list route with a new query string. Refetches only when the
    /// url carries both `page` and `sort` and they differ from the current state.
    pub async fn navigate(&mut self, location: &Location, store: &mut EntityStore<E>) {
        self.location = location.clone();
        if self.pagination.apply_search(&location.search) {
            self.sync(store).await;
        }
    }

    async fn sync(&mut self, store: &mut EntityStore<E>) {
        if let Err(err) = store.fetch_list(&self.pagination.list_query()).await {
            warn!(entity = %E::KIND, error = %err, "list fetch failed");
        }
        self.location.search = self.pagination.to_search();
    }

    pub fn render(&self, state: &EntityState<E>) -> String {
        let mut out = format!("{}s\n", E::KIND);

        if state.entities.is_empty() {
            if !state.loading {
                out.push_str(&format!("No {}s found\n", E::KIND));
            }
        } else {
            if !E::CARD_LAYOUT {
                out.push_str(&self.header_line());
                out.push('\n');
            }
            for entity in &state.entities {
                out.push_str(&entity.render_list_entry());
                out.push('\n');
                if let Some(id) = entity.id_value() {
                    out.push_str(&self.entry_links(id));
                    out.push('\n');
                }
            }
            if state.total_items > 0 {
                out.push_str(&item_count(
                    self.pagination.active_page,
                    self.pagination.items_per_page,
                    state.total_items,
                ));
                out.push('\n');
            }
        }

        if let Some(message) = &state.error_message {
            out.push_str(&format!("Error: {message}\n"));
        }
        out
    }

    /// Edit and delete return to the current page and sort.
    fn entry_links(&self, id: i64) -> String {
        let route = |page| Route { kind: E::KIND, page }.path();
        let search = self.pagination.to_search();
        format!(
            "    {} | edit {}{search} | delete {}{search}",
            route(Page::Detail(id)),
            route(Page::Edit(id)),
            route(Page::Delete(id)),
        )
    }

    fn header_line(&self) -> String {
        E::list_headers()
            .iter()
            .map(|header| {
                if header.eq_ignore_ascii_case(&self.pagination.sort) {
                    let marker = match self.pagination.order {
                        Order::Asc => "^",
                        Order::Desc => "v",
                    };
                    format!("{header} {marker}")
                } else {
                    header.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// `Showing 21 - 40 of 45 items.`
pub fn item_count(page: u32, items_per_page: u32, total: u64) -> String {
    let page = u64::from(page.max(1));
    let per_page = u64::from(items_per_page.max(1));
    let first = ((page - 1) * per_page + 1).min(total);
    let last = (page * per_page).min(total);
    format!("Showing {first} - {last} of {total} items.")
}

#[cfg(test)]
#[path = "../tests/list_tests.rs"]
mod tests;
