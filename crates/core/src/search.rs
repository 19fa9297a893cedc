//! Search criteria, sort keys, and the fallback relaxation plan.
//!
//! The plan builder is the pure half of the resolver: given a binding it
//! produces the ordered list of progressively relaxed search attempts,
//! defined once so the preview modal and auto-mode execution can never
//! diverge. The browser crate executes the plan strictly sequentially.

use serde::{Deserialize, Serialize};

use crate::binding::QueryBinding;
use crate::entry::{EntryStatus, EntrySummary};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Result page requested by every resolver fallback attempt.
pub const RESOLVE_ATTEMPT_LIMIT: i64 = 10;

/// Fixed page size of the catalog list view.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size the store accepts.
pub const MAX_PAGE_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

/// Server-side list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently updated first.
    #[default]
    UpdatedDesc,
    /// Highest score first, ties broken by recency.
    ScoreDesc,
    /// Favorites first, then score, then recency.
    FavoriteDesc,
}

impl SortKey {
    /// Wire value used in list query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdatedDesc => "updated_desc",
            Self::ScoreDesc => "score_desc",
            Self::FavoriteDesc => "favorite_desc",
        }
    }
}

// ---------------------------------------------------------------------------
// List query
// ---------------------------------------------------------------------------

/// Full parameter set for one `list_entries` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub status: EntryStatus,
    /// Free-text query matched against title, body, and tags.
    pub q: String,
    /// Tag filters; every listed tag must match.
    pub tags: Vec<String>,
    /// Model-scope substring filter.
    pub model: String,
    pub sort: SortKey,
    pub offset: i64,
    pub limit: i64,
    pub favorite_only: bool,
    pub has_thumbnail: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: EntryStatus::Active,
            q: String::new(),
            tags: Vec::new(),
            model: String::new(),
            sort: SortKey::UpdatedDesc,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            favorite_only: false,
            has_thumbnail: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback plan
// ---------------------------------------------------------------------------

/// One relaxation step of the fallback cascade: a free-text query plus the
/// tag/model criteria still in force at that step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAttempt {
    pub q: String,
    pub tags: Vec<String>,
    pub model: String,
}

impl SearchAttempt {
    /// The `list_entries` parameters for this attempt: active records only,
    /// most-recent first, one small fixed page.
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            q: self.q.clone(),
            tags: self.tags.clone(),
            model: self.model.clone(),
            limit: RESOLVE_ATTEMPT_LIMIT,
            ..ListQuery::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.q.is_empty() && self.tags.is_empty() && self.model.is_empty()
    }
}

/// Combined free-text query: `title` first, then `query`, single-spaced.
pub fn combined_query(title: &str, query: &str) -> String {
    if title.is_empty() {
        query.to_string()
    } else if query.is_empty() {
        title.to_string()
    } else {
        format!("{title} {query}")
    }
}

/// Build the ordered relaxation plan for an auto-mode resolution.
///
/// Steps, stopping at the first non-empty result set:
/// 1. combined query + tags + model
/// 2. combined query + tags (model dropped), when step 1 carried tags or model
/// 3. combined query + model (tags dropped), when step 1 carried tags
/// 4. combined query alone, when step 1 carried tags or model
/// 5. `query` alone, when a non-empty title made the combined form differ
/// 6. `title` alone
///
/// The terminal empty search (most-recently-updated record) is not part of
/// the plan; the resolver issues it separately so it can tag the outcome.
/// Attempts that would repeat an earlier attempt verbatim are skipped, and
/// attempts with no criteria at all are dropped (they would duplicate the
/// terminal step).
pub fn fallback_plan(binding: &QueryBinding) -> Vec<SearchAttempt> {
    let title = binding.title_filter();
    let query = binding.query_filter();
    let tags = binding.tag_list();
    let model = binding.model_filter();

    let combined = combined_query(&title, &query);
    let had_tags = !tags.is_empty();
    let had_model = !model.is_empty();

    let mut candidates = vec![SearchAttempt {
        q: combined.clone(),
        tags: tags.clone(),
        model: model.clone(),
    }];
    if had_tags || had_model {
        candidates.push(SearchAttempt {
            q: combined.clone(),
            tags: tags.clone(),
            model: String::new(),
        });
    }
    if had_tags {
        candidates.push(SearchAttempt {
            q: combined.clone(),
            tags: Vec::new(),
            model: model.clone(),
        });
    }
    if had_tags || had_model {
        candidates.push(SearchAttempt {
            q: combined.clone(),
            tags: Vec::new(),
            model: String::new(),
        });
    }
    if !title.is_empty() && !query.is_empty() && query != combined {
        candidates.push(SearchAttempt {
            q: query.clone(),
            tags: Vec::new(),
            model: String::new(),
        });
    }
    if !title.is_empty() {
        candidates.push(SearchAttempt {
            q: title.clone(),
            tags: Vec::new(),
            model: String::new(),
        });
    }

    let mut plan: Vec<SearchAttempt> = Vec::new();
    for attempt in candidates {
        if attempt.is_empty() || plan.contains(&attempt) {
            continue;
        }
        plan.push(attempt);
    }
    plan
}

/// Narrow a candidate set to rows whose title contains `title`
/// case-insensitively. Never empties a non-empty set: when no row survives
/// the filter the unnarrowed rows are kept.
pub fn narrow_by_title(title: &str, rows: Vec<EntrySummary>) -> Vec<EntrySummary> {
    let title = title.trim();
    if title.is_empty() || rows.is_empty() {
        return rows;
    }
    let needle = title.to_lowercase();
    let narrowed: Vec<EntrySummary> = rows
        .iter()
        .filter(|row| row.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    if narrowed.is_empty() {
        rows
    } else {
        narrowed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
