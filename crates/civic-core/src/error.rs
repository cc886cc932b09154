//! Error types for the game core.
//!
//! Every failing operation leaves the session untouched: errors are
//! detected before the first mutation.

/// Errors raised by the game core.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A decision or choice key is not in the catalog.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up (`decision` or `choice`).
        kind: &'static str,
        /// The key that was not found.
        id: String,
    },

    /// The session is terminal and accepts no further decisions.
    #[error("game has ended; no further decisions are accepted")]
    AlreadyEnded,

    /// A request was missing a required field.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Decision content could not be loaded or is malformed.
    #[error("invalid decision content: {0}")]
    Content(String),

    /// An achievement catalog could not be loaded or is malformed.
    #[error("invalid achievement catalog: {0}")]
    Catalog(String),
}
