//! View state coordinator for the catalog list.
//!
//! Owns the orthogonal axes of the browser (status, free-text/tag/model
//! filters, quick boolean filters, sort key, pagination offset, and
//! list/card view mode) and translates any single-axis change into one
//! consistent server query plus a deterministic highlight decision. All
//! state is explicit and owned here; there are no module-level caches.

use std::sync::Arc;

use promptdex_core::entry::{
    Entry, EntryDraft, EntryPage, EntryPatch, EntryStatus, TagSummary,
};
use promptdex_core::error::CoreError;
use promptdex_core::pagination::{can_next, can_prev, last_page_offset, page_position};
use promptdex_core::search::{ListQuery, SortKey, DEFAULT_PAGE_LIMIT};
use promptdex_core::store::CatalogStore;
use promptdex_core::text::{normalize_text, parse_comma_list};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// List or card presentation. A pure presentation choice: switching never
/// touches filters, sort, or pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Card,
}

/// The combined axes of the catalog browser.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub status: EntryStatus,
    /// Raw toolbar inputs; normalized when the query is built.
    pub q: String,
    pub tags: String,
    pub model: String,
    pub sort: SortKey,
    /// Always a multiple of `limit`, clamped into `[0, total)`.
    pub offset: i64,
    /// Fixed page size.
    pub limit: i64,
    pub favorite_only: bool,
    pub has_thumbnail: bool,
    pub view_mode: ViewMode,
    /// Highlighted row id, empty when nothing is selected. At most one
    /// row is selected at a time.
    pub selected_id: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: EntryStatus::Active,
            q: String::new(),
            tags: String::new(),
            model: String::new(),
            sort: SortKey::UpdatedDesc,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            favorite_only: false,
            has_thumbnail: false,
            view_mode: ViewMode::List,
            selected_id: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Drives the list view against the catalog store.
pub struct ViewController {
    store: Arc<dyn CatalogStore>,
    state: ViewState,
    page: EntryPage,
    seen_list_generation: u64,
}

impl ViewController {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_page_limit(store, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_page_limit(store: Arc<dyn CatalogStore>, limit: i64) -> Self {
        Self {
            store,
            state: ViewState {
                limit,
                ..ViewState::default()
            },
            page: EntryPage::default(),
            seen_list_generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The last loaded page.
    pub fn page(&self) -> &EntryPage {
        &self.page
    }

    /// Whether a previous/next page exists; navigation affordances
    /// disable on these rather than clamping.
    pub fn can_prev(&self) -> bool {
        can_prev(self.state.offset)
    }

    pub fn can_next(&self) -> bool {
        can_next(self.state.offset, self.state.limit, self.page.total)
    }

    /// `(current page, page count)` for the status bar.
    pub fn page_position(&self) -> (i64, i64) {
        page_position(self.state.offset, self.state.limit, self.page.total)
    }

    /// The server query the current axes translate to.
    fn list_query(&self) -> ListQuery {
        ListQuery {
            status: self.state.status,
            q: normalize_text(&self.state.q),
            tags: parse_comma_list(&self.state.tags),
            model: normalize_text(&self.state.model),
            sort: self.state.sort,
            offset: self.state.offset,
            limit: self.state.limit,
            favorite_only: self.state.favorite_only,
            has_thumbnail: self.state.has_thumbnail,
        }
    }

    // -- loading ------------------------------------------------------------

    /// Reissue the current query and recompute the highlight.
    ///
    /// When deletions shrink the total below the current offset the page
    /// comes back empty with `total > 0`; the coordinator then recomputes
    /// the last valid page boundary and reissues exactly once.
    pub async fn reload(&mut self) -> Result<(), CoreError> {
        let mut page = self.store.list_entries(&self.list_query()).await?;
        if page.items.is_empty() && page.total > 0 {
            let corrected = last_page_offset(page.total, self.state.limit);
            tracing::debug!(
                offset = self.state.offset,
                corrected,
                total = page.total,
                "Page ran empty after shrink, reissuing once"
            );
            self.state.offset = corrected;
            page = self.store.list_entries(&self.list_query()).await?;
        }
        self.page = page;
        self.apply_selection_rule();
        Ok(())
    }

    /// Reload only if a mutation has invalidated the list since the last
    /// sync. Returns whether a reload happened.
    pub async fn ensure_fresh(&mut self, list_generation: u64) -> Result<bool, CoreError> {
        if list_generation == self.seen_list_generation {
            return Ok(false);
        }
        self.seen_list_generation = list_generation;
        self.reload().await?;
        Ok(true)
    }

    fn apply_selection_rule(&mut self) {
        match self.state.view_mode {
            ViewMode::List => {
                let still_present = !self.state.selected_id.is_empty()
                    && self
                        .page
                        .items
                        .iter()
                        .any(|row| row.id == self.state.selected_id);
                if !still_present {
                    self.state.selected_id = self
                        .page
                        .items
                        .first()
                        .map(|row| row.id.clone())
                        .unwrap_or_default();
                }
            }
            // Cards open a modal per click; nothing stays highlighted
            // across a reload.
            ViewMode::Card => self.state.selected_id.clear(),
        }
    }

    /// Highlight a row of the current page. Returns false (and changes
    /// nothing) when the id is not on the page.
    pub fn select(&mut self, id: &str) -> bool {
        if self.page.items.iter().any(|row| row.id == id) {
            self.state.selected_id = id.to_string();
            true
        } else {
            false
        }
    }

    // -- axis changes (each resets pagination and reloads) -------------------

    pub async fn set_status(&mut self, status: EntryStatus) -> Result<(), CoreError> {
        self.state.status = status;
        self.reset_and_reload().await
    }

    pub async fn set_sort(&mut self, sort: SortKey) -> Result<(), CoreError> {
        self.state.sort = sort;
        self.reset_and_reload().await
    }

    /// Apply the toolbar's three filter inputs in one reload.
    pub async fn search(
        &mut self,
        q: &str,
        tags: &str,
        model: &str,
    ) -> Result<(), CoreError> {
        self.state.q = q.to_string();
        self.state.tags = tags.to_string();
        self.state.model = model.to_string();
        self.reset_and_reload().await
    }

    /// Sidebar tag click: replaces the tag filter with one tag (or clears
    /// it with an empty string).
    pub async fn filter_by_tag(&mut self, tag: &str) -> Result<(), CoreError> {
        self.state.tags = tag.to_string();
        self.reset_and_reload().await
    }

    pub async fn set_favorite_only(&mut self, on: bool) -> Result<(), CoreError> {
        self.state.favorite_only = on;
        self.reset_and_reload().await
    }

    pub async fn set_has_thumbnail(&mut self, on: bool) -> Result<(), CoreError> {
        self.state.has_thumbnail = on;
        self.reset_and_reload().await
    }

    async fn reset_and_reload(&mut self) -> Result<(), CoreError> {
        self.state.offset = 0;
        self.reload().await
    }

    /// Switch between list and card presentation. Never touches filters,
    /// sort, or pagination, and issues no query.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.view_mode = mode;
    }

    // -- pagination ----------------------------------------------------------

    /// Advance one page. Returns false without issuing a query when the
    /// navigation is disabled.
    pub async fn next_page(&mut self) -> Result<bool, CoreError> {
        if !self.can_next() {
            return Ok(false);
        }
        self.state.offset += self.state.limit;
        self.reload().await?;
        Ok(true)
    }

    /// Go back one page. Returns false without issuing a query when the
    /// navigation is disabled.
    pub async fn prev_page(&mut self) -> Result<bool, CoreError> {
        if !self.can_prev() {
            return Ok(false);
        }
        self.state.offset = (self.state.offset - self.state.limit).max(0);
        self.reload().await?;
        Ok(true)
    }

    // -- row and toolbar operations ------------------------------------------

    /// Create a record and reload; in list view the new record is
    /// highlighted when it landed on the current page.
    pub async fn create(&mut self, draft: &EntryDraft) -> Result<Entry, CoreError> {
        let created = self.store.create_entry(draft).await?;
        self.reload().await?;
        if self.state.view_mode == ViewMode::List {
            self.select(&created.id);
        }
        Ok(created)
    }

    /// Soft-delete a record and reload the current query.
    pub async fn delete(&mut self, id: &str) -> Result<Entry, CoreError> {
        let deleted = self.store.delete_entry(id).await?;
        self.reload().await?;
        Ok(deleted)
    }

    /// Restore a soft-deleted record listed on the current page, using the
    /// version pair the row carries, then reload.
    pub async fn restore(&mut self, id: &str) -> Result<Entry, CoreError> {
        let row = self
            .page
            .items
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| {
                CoreError::Validation("Record is not on the current page".to_string())
            })?;
        let restored = self
            .store
            .update_entry(
                id,
                &EntryPatch::status(EntryStatus::Active),
                row.version,
                row.updated_at,
            )
            .await?;
        self.reload().await?;
        Ok(restored)
    }

    /// Hard-delete everything in the recycle bin. Only allowed while the
    /// deleted view is active, mirroring the toolbar guard.
    pub async fn purge_deleted(&mut self) -> Result<u64, CoreError> {
        if self.state.status != EntryStatus::Deleted {
            return Err(CoreError::Validation(
                "Switch to the deleted view before purging".to_string(),
            ));
        }
        let purged = self.store.purge_deleted().await?;
        self.reload().await?;
        Ok(purged)
    }

    /// Tags for the sidebar.
    pub async fn load_tags(&self, limit: i64) -> Result<Vec<TagSummary>, CoreError> {
        self.store.list_tags(limit).await
    }
}
