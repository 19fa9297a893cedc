//! Query bindings: the search state an external graph node declares.
//!
//! A binding either pins one entry id (`locked`) or carries soft criteria
//! (`auto`) that the resolver relaxes step by step. The binding itself is
//! plain data; reading and writing the host node's widgets happens behind
//! the browser crate's widget adapter.

use serde::{Deserialize, Serialize};

use crate::text::{normalize_text, parse_comma_list};
use crate::types::EntryId;

/// How a binding selects its entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMode {
    #[default]
    Auto,
    Locked,
}

impl BindingMode {
    /// Parse a widget value. Anything that is not exactly `"locked"`
    /// (ignoring case and surrounding whitespace) is treated as auto, so a
    /// freshly placed node with an empty mode widget resolves dynamically.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("locked") {
            Self::Locked
        } else {
            Self::Auto
        }
    }

    /// Wire/widget value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Locked => "locked",
        }
    }
}

/// Snapshot of a graph node's query widgets.
///
/// Invariant: `Locked` with an empty `entry_id` is a recognized degraded
/// state: the resolver falls back to the auto algorithm and tags the
/// outcome so callers can warn distinctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBinding {
    pub mode: BindingMode,
    #[serde(default)]
    pub entry_id: EntryId,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    1
}

impl Default for QueryBinding {
    fn default() -> Self {
        Self {
            mode: BindingMode::Auto,
            entry_id: String::new(),
            query: String::new(),
            title: String::new(),
            tags: String::new(),
            model: String::new(),
            top_k: default_top_k(),
        }
    }
}

impl QueryBinding {
    /// Trimmed title criterion, empty when unset.
    pub fn title_filter(&self) -> String {
        normalize_text(&self.title)
    }

    /// Trimmed free-text criterion, empty when unset.
    pub fn query_filter(&self) -> String {
        normalize_text(&self.query)
    }

    /// The comma-separated tags widget as a normalized list.
    pub fn tag_list(&self) -> Vec<String> {
        parse_comma_list(&self.tags)
    }

    /// Trimmed model criterion, empty when unset.
    pub fn model_filter(&self) -> String {
        normalize_text(&self.model)
    }

    /// True when the binding is locked to a concrete id.
    pub fn is_locked_with_id(&self) -> bool {
        self.mode == BindingMode::Locked && !self.entry_id.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
