//! Shared application state for the API server.
//!
//! [`AppState`] owns the game session and the advisor. Handlers receive it
//! through Axum's `State` extractor wrapped in an [`Arc`](std::sync::Arc).

use civic_advisor::Advisor;
use civic_core::GameSession;
use tokio::sync::Mutex;

/// Shared state for the Axum application.
///
/// The session mutex is the only path to game state, which serializes
/// decisions and resets across concurrent requests.
pub struct AppState {
    /// The game being played.
    pub session: Mutex<GameSession>,
    /// Commentary source for `/api/advisor`.
    pub advisor: Advisor,
}

impl AppState {
    /// Wrap a session and an advisor.
    pub fn new(session: GameSession, advisor: Advisor) -> Self {
        Self {
            session: Mutex::new(session),
            advisor,
        }
    }
}
