//! Fallback search resolver.
//!
//! Turns a [`QueryBinding`] into at most one concrete entry. Locked
//! bindings fetch their id directly; auto bindings walk the relaxation
//! plan from [`promptdex_core::search`] strictly sequentially, stopping at
//! the first non-empty result set, then fall back to the most recently
//! updated record. "No data" is never an error here; only transport and
//! fetch failures propagate.
//!
//! Both the preview modal and auto-mode execution call [`resolve`]; there
//! is exactly one implementation so the two can never diverge.

use promptdex_core::binding::{BindingMode, QueryBinding};
use promptdex_core::entry::{Entry, EntrySummary};
use promptdex_core::error::CoreError;
use promptdex_core::search::{
    fallback_plan, narrow_by_title, ListQuery, RESOLVE_ATTEMPT_LIMIT,
};
use promptdex_core::store::CatalogStore;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How the resolved entry was found. Callers branch on this to warn about
/// degraded lock states and weak fallback matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTag {
    /// Locked binding, id fetched directly.
    Locked,
    /// Locked binding with an empty id; the search criteria matched.
    LockedMissingId,
    /// Locked binding with an empty id; only the latest-record fallback hit.
    LockedMissingIdFallbackLatest,
    /// Auto binding matched one of the relaxation steps.
    Matched,
    /// Auto binding matched nothing; latest record returned instead.
    FallbackLatest,
}

impl ResolutionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::LockedMissingId => "locked_missing_id",
            Self::LockedMissingIdFallbackLatest => "locked_missing_id_fallback_latest",
            Self::Matched => "matched",
            Self::FallbackLatest => "fallback_latest",
        }
    }
}

/// Result of resolving a binding against the catalog.
#[derive(Debug)]
pub enum Resolution {
    /// Exactly one entry was chosen.
    Resolved { entry: Entry, tag: ResolutionTag },
    /// Every step came back empty: the catalog has no active records.
    NoMatch,
}

impl Resolution {
    /// The resolved entry, when there is one.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Resolved { entry, .. } => Some(entry),
            Self::NoMatch => None,
        }
    }

    /// The outcome tag, when an entry was resolved.
    pub fn tag(&self) -> Option<ResolutionTag> {
        match self {
            Self::Resolved { tag, .. } => Some(*tag),
            Self::NoMatch => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a binding to at most one entry.
///
/// Pure with respect to the catalog: only read requests are issued. A
/// locked id that no longer resolves surfaces as the fetch failure it is,
/// never as a silent downgrade to search.
pub async fn resolve(
    store: &dyn CatalogStore,
    binding: &QueryBinding,
) -> Result<Resolution, CoreError> {
    if binding.is_locked_with_id() {
        let entry = store.get_entry(binding.entry_id.trim()).await?;
        return Ok(Resolution::Resolved {
            entry,
            tag: ResolutionTag::Locked,
        });
    }

    let degraded_lock = binding.mode == BindingMode::Locked;
    if degraded_lock {
        tracing::warn!("Locked binding carries no entry id; resolving by criteria instead");
    }

    let title = binding.title_filter();

    for (step, attempt) in fallback_plan(binding).iter().enumerate() {
        let page = store.list_entries(&attempt.list_query()).await?;
        let rows = narrow_by_title(&title, page.items);
        if let Some(row) = rows.first() {
            tracing::debug!(step = step + 1, entry_id = %row.id, "Fallback step matched");
            let entry = fetch_row(store, row).await?;
            let tag = if degraded_lock {
                ResolutionTag::LockedMissingId
            } else {
                ResolutionTag::Matched
            };
            return Ok(Resolution::Resolved { entry, tag });
        }
        tracing::debug!(step = step + 1, q = %attempt.q, "Fallback step empty");
    }

    // Terminal step: no criteria at all, most recently updated record.
    let latest = store
        .list_entries(&ListQuery {
            limit: RESOLVE_ATTEMPT_LIMIT,
            ..ListQuery::default()
        })
        .await?;
    let rows = narrow_by_title(&title, latest.items);
    match rows.first() {
        Some(row) => {
            let entry = fetch_row(store, row).await?;
            let tag = if degraded_lock {
                ResolutionTag::LockedMissingIdFallbackLatest
            } else {
                ResolutionTag::FallbackLatest
            };
            Ok(Resolution::Resolved { entry, tag })
        }
        None => Ok(Resolution::NoMatch),
    }
}

/// Fetch the full record behind a list row. The row was listed a moment
/// ago, so a miss here is a genuine fetch failure worth surfacing.
async fn fetch_row(store: &dyn CatalogStore, row: &EntrySummary) -> Result<Entry, CoreError> {
    store.get_entry(&row.id).await
}
