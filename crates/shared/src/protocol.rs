use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ITEMS_PER_PAGE: u32 = 20;
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
pub const DEFAULT_SORT_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortParseError {
    #[error("sort field must not be empty")]
    EmptyField,
    #[error("unknown sort order {0:?}")]
    UnknownOrder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn toggled(self) -> Self {
        match self {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Order::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Order::Desc)
        } else {
            Err(SortParseError::UnknownOrder(s.to_string()))
        }
    }
}

/// `field,order` as used by both the list routes and the REST api.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: Order,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: Order) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.order)
    }
}

impl FromStr for Sort {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.split_once(',') {
            Some((field, order)) => (field, order.parse()?),
            None => (s, Order::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(SortParseError::EmptyField);
        }
        Ok(Sort::new(field, order))
    }
}

/// Parameters of `GET /api/<resource>`. `page` is 0-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl ListQuery {
    /// No paging parameters; the backend applies its own default page.
    pub fn unpaged() -> Self {
        Self::default()
    }

    pub fn paged(page: u32, size: u32, sort: Sort) -> Self {
        Self {
            page,
            size,
            sort: Some(sort),
        }
    }

    /// Paging parameters are only sent together with a sort; `cacheBuster` always is.
    pub fn to_pairs(&self, cache_buster: i64) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(sort) = &self.sort {
            pairs.push(("page", self.page.to_string()));
            pairs.push(("size", self.size.to_string()));
            pairs.push(("sort", sort.to_string()));
        }
        pairs.push(("cacheBuster", cache_buster.to_string()));
        pairs
    }
}
