//! Catalog record types: the full [`Entry`], its list-row projection
//! [`EntrySummary`], and the create/update payloads exchanged with the
//! remote store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{EntryId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an entry. "Deleted" is a soft state reached and left
/// through the normal update path; rows only disappear on an explicit purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Deleted,
}

impl EntryStatus {
    /// Wire value used in list query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

// ---------------------------------------------------------------------------
// Body and parameters
// ---------------------------------------------------------------------------

/// Free-text prompt bodies. `{name}` placeholders are substituted
/// server-side only; clients treat both fields as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrompt {
    #[serde(default)]
    pub positive: String,
    #[serde(default)]
    pub negative: String,
}

/// Structured generation parameters attached to an entry. All fields are
/// optional; absent fields are omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One full catalog record.
///
/// `version` and `updated_at` are assigned by the store and always change
/// together on a successful mutation; the client presents the pair back on
/// every update so the store can detect conflicting writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub status: EntryStatus,
    pub version: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_scope: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub raw: RawPrompt,
    #[serde(default)]
    pub params: GenerationParams,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub has_thumbnail: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// List-row projection of an entry, as returned by `list_entries`.
///
/// Carries the version pair so row-level affordances (restore from the
/// recycle bin) can present it back without a full fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub title: String,
    pub version: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_scope: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub has_thumbnail: bool,
    #[serde(default)]
    pub positive_preview: String,
    pub updated_at: Timestamp,
}

/// One page of list results plus the filtered total, which drives the
/// pagination boundary math.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPage {
    #[serde(default)]
    pub items: Vec<EntrySummary>,
    #[serde(default)]
    pub total: i64,
}

/// A catalog tag as listed by the store's tag index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSummary {
    pub name: String,
    pub created_at: Timestamp,
}

/// Server-assembled prompt text with variable substitution applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    #[serde(default)]
    pub positive: String,
    #[serde(default)]
    pub negative: String,
}

// ---------------------------------------------------------------------------
// Create / update payloads
// ---------------------------------------------------------------------------

/// Payload for creating a new entry. Identity, version, timestamps, and
/// status are assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryDraft {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_scope: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub raw: RawPrompt,
    #[serde(default)]
    pub params: GenerationParams,
}

/// Partial update payload. Only the fields being changed are present; the
/// store applies the patch field-by-field. Conflict detection happens
/// against the expected `(version, updated_at)` pair carried alongside the
/// patch, never inside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_scope: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawPrompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<GenerationParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl EntryPatch {
    /// Patch that toggles the favorite flag.
    pub fn favorite(value: bool) -> Self {
        Self {
            favorite: Some(value),
            ..Self::default()
        }
    }

    /// Patch that sets the score.
    pub fn score(value: i64) -> Self {
        Self {
            score: Some(value),
            ..Self::default()
        }
    }

    /// Patch that moves the entry to another lifecycle status.
    pub fn status(value: EntryStatus) -> Self {
        Self {
            status: Some(value),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
