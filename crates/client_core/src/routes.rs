//! Client route table: `/<entity>`, `/<entity>/new`, `/<entity>/:id`, `/<entity>/:id/edit`,
//! `/<entity>/:id/delete`.

use std::{fmt, str::FromStr};

use shared::domain::EntityKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches {0:?}")]
    NotFound(String),
    #[error("invalid id {0:?}")]
    InvalidId(String),
}

/// A path plus its query string. `search` is empty or starts with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub search: String,
}

impl Location {
    pub fn new(path: impl Into<String>, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = if search.is_empty() || search.starts_with('?') {
            search
        } else {
            format!("?{search}")
        };
        Self {
            path: path.into(),
            search,
        }
    }
}

impl FromStr for Location {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (path, search) = match s.find('?') {
            Some(idx) => (&s[..idx], &s[idx..]),
            None => (s, ""),
        };
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Ok(Location::new(path, search))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.path, self.search)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    List,
    Create,
    Detail(i64),
    Edit(i64),
    Delete(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub kind: EntityKind,
    pub page: Page,
}

impl Route {
    pub fn list(kind: EntityKind) -> Self {
        Self {
            kind,
            page: Page::List,
        }
    }

    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let not_found = || RouteError::NotFound(path.to_string());
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let (first, rest) = segments.split_first().ok_or_else(not_found)?;
        let kind: EntityKind = first.parse().map_err(|_| not_found())?;

        let page = match rest {
            [] => Page::List,
            ["new"] => Page::Create,
            [id] => Page::Detail(parse_id(id)?),
            [id, "edit"] => Page::Edit(parse_id(id)?),
            [id, "delete"] => Page::Delete(parse_id(id)?),
            _ => return Err(not_found()),
        };
        Ok(Self { kind, page })
    }

    pub fn path(&self) -> String {
        let slug = self.kind.slug();
        match self.page {
            Page::List => format!("/{slug}"),
            Page::Create => format!("/{slug}/new"),
            Page::Detail(id) => format!("/{slug}/{id}"),
            Page::Edit(id) => format!("/{slug}/{id}/edit"),
            Page::Delete(id) => format!("/{slug}/{id}/delete"),
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, RouteError> {
    raw.parse()
        .map_err(|_| RouteError::InvalidId(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: String,
}

pub fn entity_menu() -> Vec<MenuItem> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| MenuItem {
            label: kind.label(),
            path: Route::list(kind).path(),
        })
        .collect()
}
