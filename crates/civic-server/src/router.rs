//! Axum router construction for the API.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::server::ServerError;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- service index
/// - `GET /health` -- liveness check
/// - `GET /api/game/state` -- current game state
/// - `GET /api/game/decision` -- draw a decision
/// - `POST /api/game/decision` -- apply a choice
/// - `POST /api/game/reset` -- start over
/// - `GET /api/game/achievements` -- unlocked achievements and progress
/// - `GET /api/game/achievements/summary` -- readable progress
/// - `GET /api/advisor` -- advisor commentary
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/game/state", get(handlers::get_state))
        .route(
            "/api/game/decision",
            get(handlers::next_decision).post(handlers::make_decision),
        )
        .route("/api/game/reset", post(handlers::reset))
        .route("/api/game/achievements", get(handlers::achievements))
        .route(
            "/api/game/achievements/summary",
            get(handlers::achievement_summary),
        )
        .route("/api/advisor", get(handlers::advisor))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured frontend origin.
///
/// With no origin every origin is allowed, without credentials. With an
/// origin only that origin is allowed, with credentials.
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, ServerError> {
    let Some(origin) = allowed_origin else {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    };

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| ServerError::Config(format!("invalid allowed_origin {origin:?}: {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
