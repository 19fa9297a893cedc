//! HTTP client for the remote catalog store.
//!
//! Wraps the store's JSON endpoints using [`reqwest`]. No client-side
//! timeout is configured: the interface stays responsive because every
//! operation is async, and failures surface only as transport rejections.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use promptdex_core::entry::{
    AssembledPrompt, Entry, EntryDraft, EntryPage, EntryPatch, TagSummary,
};
use promptdex_core::error::CoreError;
use promptdex_core::search::ListQuery;
use promptdex_core::store::CatalogStore;
use promptdex_core::types::Timestamp;

/// HTTP client for a single catalog store.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

/// Update request body: the patch fields plus the guard pair the client
/// last observed. The store rejects the write with a conflict when the
/// pair no longer matches.
#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    #[serde(flatten)]
    patch: &'a EntryPatch,
    expected_version: i64,
    expected_updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
struct AssembleBody<'a> {
    entry_id: &'a str,
    variables_override: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PurgeResponse {
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    items: Vec<TagSummary>,
}

impl HttpCatalog {
    /// Create a client for a catalog store.
    ///
    /// * `base_url` - base URL of the store API, e.g.
    ///   `http://host:8188/promptdex` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful for
    /// connection pooling when several stores are configured).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Query-string pairs for a list request. Empty criteria are omitted;
    /// boolean quick filters are sent only when set, as `1`.
    fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("status", query.status.as_str().to_string()),
            ("sort", query.sort.as_str().to_string()),
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if !query.q.is_empty() {
            params.push(("q", query.q.clone()));
        }
        if !query.tags.is_empty() {
            params.push(("tags", query.tags.join(",")));
        }
        if !query.model.is_empty() {
            params.push(("model", query.model.clone()));
        }
        if query.favorite_only {
            params.push(("favorite_only", "1".to_string()));
        }
        if query.has_thumbnail {
            params.push(("has_thumbnail", "1".to_string()));
        }
        params
    }

    /// Map a completed response onto the error taxonomy.
    ///
    /// * 404 becomes `NotFound` for the entity named by `entry_id`.
    /// * 409 becomes `Conflict` carrying the response body.
    /// * Any other non-2xx status becomes `Transport` with status + body.
    async fn check(
        response: reqwest::Response,
        entry_id: Option<&str>,
    ) -> Result<reqwest::Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match status.as_u16() {
            404 => match entry_id {
                Some(id) => Err(CoreError::entry_not_found(id)),
                None => Err(CoreError::Transport(format!("404: {body}"))),
            },
            409 => Err(CoreError::Conflict(body)),
            code => Err(CoreError::Transport(format!("{code}: {body}"))),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        entry_id: Option<&str>,
    ) -> Result<T, CoreError> {
        let response = Self::check(response, entry_id).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::Transport(format!("Malformed store response: {e}")))
    }

    fn transport(err: reqwest::Error) -> CoreError {
        CoreError::Transport(err.to_string())
    }
}

#[async_trait]
impl CatalogStore for HttpCatalog {
    async fn list_entries(&self, query: &ListQuery) -> Result<EntryPage, CoreError> {
        let response = self
            .client
            .get(self.url("/entries"))
            .query(&Self::list_params(query))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, None).await
    }

    async fn get_entry(&self, id: &str) -> Result<Entry, CoreError> {
        let response = self
            .client
            .get(self.url(&format!("/entries/{id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, Some(id)).await
    }

    async fn create_entry(&self, draft: &EntryDraft) -> Result<Entry, CoreError> {
        let response = self
            .client
            .post(self.url("/entries"))
            .json(draft)
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, None).await
    }

    async fn update_entry(
        &self,
        id: &str,
        patch: &EntryPatch,
        expected_version: i64,
        expected_updated_at: Timestamp,
    ) -> Result<Entry, CoreError> {
        let body = UpdateBody {
            patch,
            expected_version,
            expected_updated_at,
        };
        let response = self
            .client
            .put(self.url(&format!("/entries/{id}")))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, Some(id)).await
    }

    async fn delete_entry(&self, id: &str) -> Result<Entry, CoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/entries/{id}")))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, Some(id)).await
    }

    async fn purge_deleted(&self) -> Result<u64, CoreError> {
        let response = self
            .client
            .post(self.url("/entries/purge_deleted"))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::transport)?;
        let purged: PurgeResponse = Self::parse(response, None).await?;
        tracing::info!(deleted = purged.deleted, "Purged soft-deleted entries");
        Ok(purged.deleted)
    }

    async fn assemble(
        &self,
        id: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<AssembledPrompt, CoreError> {
        let body = AssembleBody {
            entry_id: id,
            variables_override: overrides,
        };
        let response = self
            .client
            .post(self.url("/assemble"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        Self::parse(response, Some(id)).await
    }

    async fn list_tags(&self, limit: i64) -> Result<Vec<TagSummary>, CoreError> {
        let response = self
            .client
            .get(self.url("/tags"))
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(Self::transport)?;
        let tags: TagsResponse = Self::parse(response, None).await?;
        Ok(tags.items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
