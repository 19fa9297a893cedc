//! Optimistic-concurrency entry store.
//!
//! Serializes the read-mutate-refresh cycle for the record the detail view
//! is showing, so individual affordances (favorite star, score stars, full
//! editor) never carry their own conflict logic. Every mutation presents
//! the `(version, updated_at)` pair the client last observed; the store
//! decides whether it still matches. On success the record is re-fetched
//! and the assembled prompt re-derived (the patch echo is never trusted),
//! and the list generation is bumped so the view coordinator reissues its
//! current query.

use std::collections::BTreeMap;
use std::sync::Arc;

use promptdex_core::entry::{AssembledPrompt, Entry, EntryPatch};
use promptdex_core::error::CoreError;
use promptdex_core::prompt::{extract_placeholders, validate_score};
use promptdex_core::store::CatalogStore;

/// The loaded record plus its server-derived companion data.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub entry: Entry,
    pub assembled: AssembledPrompt,
}

impl EntryView {
    /// Variables the positive/negative bodies actually consume, for the
    /// detail pane's variable hints.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = extract_placeholders(&self.entry.raw.positive);
        names.extend(extract_placeholders(&self.entry.raw.negative));
        names.sort();
        names.dedup();
        names
    }
}

/// Read-mutate-refresh cycle for a single entry.
pub struct EntryStore {
    store: Arc<dyn CatalogStore>,
    current: Option<EntryView>,
    busy: bool,
    list_generation: u64,
}

impl EntryStore {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            current: None,
            busy: false,
            list_generation: 0,
        }
    }

    /// The currently loaded record, if any.
    pub fn current(&self) -> Option<&EntryView> {
        self.current.as_ref()
    }

    /// True while a mutation is outstanding. Affordances disable
    /// themselves on this flag; a second activation while busy is ignored
    /// by the disabled control, and a programmatic caller gets a
    /// `Validation` error rather than a second in-flight write.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Monotonic counter bumped on every successful mutation. The view
    /// coordinator reissues its current query when it observes a change.
    pub fn list_generation(&self) -> u64 {
        self.list_generation
    }

    /// Drop the loaded record (detail pane cleared).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Load a record and its assembled prompt into the detail view.
    ///
    /// On failure the previously loaded view is left untouched.
    pub async fn load(&mut self, id: &str) -> Result<&EntryView, CoreError> {
        let entry = self.store.get_entry(id).await?;
        let assembled = self.store.assemble(id, &BTreeMap::new()).await?;
        Ok(self.current.insert(EntryView { entry, assembled }))
    }

    /// Re-assemble the loaded record with variable overrides, without
    /// mutating anything.
    pub async fn preview_with_overrides(
        &mut self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<&EntryView, CoreError> {
        let view = self
            .current
            .as_mut()
            .ok_or_else(|| CoreError::Validation("No entry loaded".to_string()))?;
        view.assembled = self.store.assemble(&view.entry.id, overrides).await?;
        Ok(view)
    }

    /// Apply a partial update to the loaded record.
    ///
    /// Sends the patch with the expected version pair, then re-fetches the
    /// canonical record and re-derives the assembled prompt. Any failure
    /// (`Conflict`, `NotFound`, `Transport`) aborts the cycle and leaves
    /// the previously rendered view untouched; nothing is retried.
    pub async fn mutate(&mut self, patch: EntryPatch) -> Result<&EntryView, CoreError> {
        if self.busy {
            return Err(CoreError::Validation(
                "A mutation for this entry is already in flight".to_string(),
            ));
        }
        let (id, expected_version, expected_updated_at) = match &self.current {
            Some(view) => (
                view.entry.id.clone(),
                view.entry.version,
                view.entry.updated_at,
            ),
            None => {
                return Err(CoreError::Validation("No entry loaded".to_string()));
            }
        };

        self.busy = true;
        let result = self
            .mutate_inner(&id, &patch, expected_version, expected_updated_at)
            .await;
        self.busy = false;

        match result {
            Ok(view) => Ok(self.current.insert(view)),
            Err(err) => Err(err),
        }
    }

    async fn mutate_inner(
        &mut self,
        id: &str,
        patch: &EntryPatch,
        expected_version: i64,
        expected_updated_at: promptdex_core::types::Timestamp,
    ) -> Result<EntryView, CoreError> {
        self.store
            .update_entry(id, patch, expected_version, expected_updated_at)
            .await?;
        // The write landed; whatever happens to the refresh below, the
        // list-level cache is stale now.
        self.list_generation += 1;
        tracing::debug!(entry_id = %id, "Mutation accepted, refreshing canonical record");

        let entry = self.store.get_entry(id).await?;
        let assembled = self.store.assemble(id, &BTreeMap::new()).await?;
        Ok(EntryView { entry, assembled })
    }

    /// Toggle the favorite flag of the loaded record.
    pub async fn toggle_favorite(&mut self) -> Result<&EntryView, CoreError> {
        let next = match &self.current {
            Some(view) => !view.entry.favorite,
            None => {
                return Err(CoreError::Validation("No entry loaded".to_string()));
            }
        };
        self.mutate(EntryPatch::favorite(next)).await
    }

    /// Set the score of the loaded record. Out-of-range input is rejected
    /// before any request is sent.
    pub async fn set_score(&mut self, score: i64) -> Result<&EntryView, CoreError> {
        validate_score(score)?;
        self.mutate(EntryPatch::score(score)).await
    }
}
