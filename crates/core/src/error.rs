use crate::types::EntryId;

/// Error taxonomy shared by every layer of the browser.
///
/// `NotFound`, `Conflict` and `Transport` abort the operation that raised
/// them and leave previously rendered state untouched; none of them is
/// retried automatically. `Validation` is raised before any request is
/// sent. A resolver exhausting its fallback cascade is **not** an error
/// (see [`crate::search`]), so there is no variant for it.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntryId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// Shorthand for a missing catalog entry.
    pub fn entry_not_found(id: impl Into<EntryId>) -> Self {
        Self::NotFound {
            entity: "entry",
            id: id.into(),
        }
    }
}
