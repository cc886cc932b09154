//! HTTP API server for the Civic city-management game.
//!
//! This crate exposes a single game session over a small JSON API:
//!
//! - **Game endpoints** (`/api/game/...`) for reading state, drawing and
//!   applying decisions, resetting, and reading achievements
//! - **Advisor endpoint** (`/api/advisor`) for rule-based commentary with
//!   optional remote enrichment
//! - **Service endpoints** (`/`, `/health`) for discovery and liveness
//!
//! # Architecture
//!
//! The [`GameSession`] lives behind a [`tokio::sync::Mutex`] in
//! [`AppState`], so every mutating request is applied in full before the
//! next one starts. The advisor handler copies what it needs out of the
//! session and releases the lock before any network call.
//!
//! [`GameSession`]: civic_core::GameSession

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use router::{build_router, cors_layer};
pub use server::{start_server, ServerError};
pub use state::AppState;
