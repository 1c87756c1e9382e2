//! HTTP access to the `/api/<resource>` collections.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response};
use shared::{
    domain::Entity,
    error::ProblemDetails,
    protocol::{ListQuery, TOTAL_COUNT_HEADER},
};
use tracing::debug;

use crate::error::ClientError;

const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// One page of a collection plus the backend's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total_items: u64,
}

#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ClientError>;
    async fn get(&self, id: i64) -> Result<E, ClientError>;
    async fn create(&self, entity: &E) -> Result<E, ClientError>;
    async fn update(&self, entity: &E) -> Result<E, ClientError>;
    async fn partial_update(&self, entity: &E) -> Result<E, ClientError>;
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}

/// Connection details shared by every resource client.
#[derive(Debug, Clone)]
pub struct ApiConnection {
    http: Client,
    server_url: String,
    auth_token: Option<String>,
}

impl ApiConnection {
    pub fn new(http: Client, server_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            http,
            server_url: server_url.into(),
            auth_token,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

pub struct HttpResource<E> {
    connection: ApiConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpResource<E> {
    pub fn new(connection: ApiConnection) -> Self {
        Self {
            connection,
            _entity: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/api/{}",
            self.connection.server_url,
            E::KIND.resource()
        )
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{id}", self.collection_url())
    }

    fn require_id(entity: &E) -> Result<i64, ClientError> {
        entity.id_value().ok_or(ClientError::MissingId(E::KIND))
    }
}

/// Turns a non-2xx response into [`ClientError::Status`], keeping the problem body if it decodes.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let problem = response.json::<ProblemDetails>().await.ok();
    Err(ClientError::status(status.as_u16(), problem))
}

/// `None` when the backend sent no count header.
fn total_count(response: &Response) -> Result<Option<u64>, ClientError> {
    let Some(raw) = response.headers().get(TOTAL_COUNT_HEADER) else {
        return Ok(None);
    };
    let raw = String::from_utf8_lossy(raw.as_bytes());
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ClientError::InvalidTotalCount(raw.to_string()))
}

#[async_trait]
impl<E: Entity> EntityApi<E> for HttpResource<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ClientError> {
        let url = self.collection_url();
        debug!(entity = %E::KIND, %url, sort = ?query.sort, "listing entities");
        let response = self
            .connection
            .request(Method::GET, url)
            .query(&query.to_pairs(Utc::now().timestamp_millis()))
            .send()
            .await?;
        let response = check_status(response).await?;
        let header_total = total_count(&response)?;
        let items: Vec<E> = response.json().await?;
        let total_items = header_total.unwrap_or(items.len() as u64);
        Ok(Page { items, total_items })
    }

    async fn get(&self, id: i64) -> Result<E, ClientError> {
        debug!(entity = %E::KIND, id, "fetching entity");
        let response = self
            .connection
            .request(Method::GET, self.item_url(id))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, entity: &E) -> Result<E, ClientError> {
        debug!(entity = %E::KIND, "creating entity");
        let response = self
            .connection
            .request(Method::POST, self.collection_url())
            .json(&entity.cleaned())
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(&self, entity: &E) -> Result<E, ClientError> {
        let id = Self::require_id(entity)?;
        debug!(entity = %E::KIND, id, "updating entity");
        let response = self
            .connection
            .request(Method::PUT, self.item_url(id))
            .json(&entity.cleaned())
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn partial_update(&self, entity: &E) -> Result<E, ClientError> {
        let id = Self::require_id(entity)?;
        debug!(entity = %E::KIND, id, "patching entity");
        let body = serde_json::to_vec(&entity.cleaned())?;
        let response = self
            .connection
            .request(Method::PATCH, self.item_url(id))
            .header(CONTENT_TYPE, MERGE_PATCH_JSON)
            .body(body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        debug!(entity = %E::KIND, id, "deleting entity");
        let response = self
            .connection
            .request(Method::DELETE, self.item_url(id))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
