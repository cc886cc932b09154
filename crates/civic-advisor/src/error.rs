//! Error types for the advisor.
//!
//! These never leave the crate boundary through [`crate::Advisor::advise`],
//! which always resolves to a message. They surface only from the lower
//! level building blocks so callers and tests can see what went wrong.

/// Errors raised while composing or fetching advice.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// The remote advice service was unreachable or timed out.
    #[error("advice request failed: {0}")]
    Request(String),

    /// The remote advice service answered with a non-success status.
    #[error("advice service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when unreadable.
        body: String,
    },

    /// The remote response was not the expected JSON shape.
    #[error("advice payload error: {0}")]
    Payload(String),

    /// A message template failed to load or render.
    #[error("template error: {0}")]
    Template(String),
}
