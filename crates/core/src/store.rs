//! The catalog store contract.
//!
//! Everything the browser needs from the remote JSON store, expressed as an
//! object-safe async trait so the resolver, entry store, and view
//! coordinator stay independent of the transport. The HTTP client and the
//! in-memory reference store both implement it.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::entry::{
    AssembledPrompt, Entry, EntryDraft, EntryPage, EntryPatch, TagSummary,
};
use crate::error::CoreError;
use crate::search::ListQuery;
use crate::types::Timestamp;

/// Remote catalog operations.
///
/// Failure semantics: `get_entry` and `update_entry` fail with
/// [`CoreError::NotFound`] when the id no longer resolves; `update_entry`
/// fails with [`CoreError::Conflict`] when the presented
/// `(expected_version, expected_updated_at)` pair does not match the
/// store's current state. Network or server failures surface as
/// [`CoreError::Transport`]. The store, never the client, is the authority
/// on conflict detection.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Query one page of entries plus the filtered total.
    async fn list_entries(&self, query: &ListQuery) -> Result<EntryPage, CoreError>;

    /// Fetch one full record by id.
    async fn get_entry(&self, id: &str) -> Result<Entry, CoreError>;

    /// Create a record; the store assigns id, version 1, and timestamps.
    async fn create_entry(&self, draft: &EntryDraft) -> Result<Entry, CoreError>;

    /// Apply a partial update guarded by the last observed version pair.
    async fn update_entry(
        &self,
        id: &str,
        patch: &EntryPatch,
        expected_version: i64,
        expected_updated_at: Timestamp,
    ) -> Result<Entry, CoreError>;

    /// Soft-delete a record (status transition; recoverable).
    async fn delete_entry(&self, id: &str) -> Result<Entry, CoreError>;

    /// Hard-delete every already-soft-deleted record. Returns the count.
    async fn purge_deleted(&self) -> Result<u64, CoreError>;

    /// Server-side prompt assembly with variable substitution applied.
    /// Overrides shadow the entry's own variables.
    async fn assemble(
        &self,
        id: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<AssembledPrompt, CoreError>;

    /// List known tags, alphabetically, up to `limit`.
    async fn list_tags(&self, limit: i64) -> Result<Vec<TagSummary>, CoreError>;
}
