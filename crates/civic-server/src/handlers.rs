//! REST API endpoint handlers.
//!
//! Game handlers lock the session for the duration of the call. The
//! advisor handler snapshots what it needs and releases the lock before
//! awaiting the advisor.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service index |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/game/state` | Current game state |
//! | `GET` | `/api/game/decision` | Draw the next decision |
//! | `POST` | `/api/game/decision` | Apply a choice |
//! | `POST` | `/api/game/reset` | Start over |
//! | `GET` | `/api/game/achievements` | Unlocked achievements and progress |
//! | `GET` | `/api/game/achievements/summary` | Readable progress per achievement |
//! | `GET` | `/api/advisor` | Advisor commentary |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use civic_types::{
    AchievementReport, AchievementSummary, AdvisorContext, AdvisorMessage, ChoiceId, Decision,
    DecisionId, DecisionOutcome, GameState,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Successful response wrapper: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Always `true`.
    pub success: bool,
    /// The payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Body of `POST /api/game/decision`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Decision being answered.
    pub decision_id: Option<String>,
    /// Chosen option.
    pub choice_id: Option<String>,
}

/// Response of `POST /api/game/decision`.
///
/// The outcome fields sit beside `success` rather than under `data`.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    /// Always `true`.
    pub success: bool,
    /// What the decision did.
    #[serde(flatten)]
    pub outcome: DecisionOutcome,
}

/// Query parameters for `GET /api/advisor`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvisorQuery {
    /// What the advice should address. Defaults to the city as a whole.
    pub context: Option<AdvisorContext>,
    /// Decision to comment on.
    pub decision_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

/// Service name, version, and endpoint list.
#[allow(clippy::unused_async)]
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Civic city advisor API!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "gameState": "GET /api/game/state",
            "nextDecision": "GET /api/game/decision",
            "makeDecision": "POST /api/game/decision",
            "resetGame": "POST /api/game/reset",
            "achievements": "GET /api/game/achievements",
            "achievementSummary": "GET /api/game/achievements/summary",
            "getAdvisor": "GET /api/advisor",
        }
    }))
}

/// Liveness check.
#[allow(clippy::unused_async)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "remoteAdvisor": state.advisor.has_remote(),
    }))
}

// ---------------------------------------------------------------------------
// Game endpoints
// ---------------------------------------------------------------------------

/// Current game state.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<Envelope<GameState>> {
    let session = state.session.lock().await;
    Json(Envelope::ok(session.state().clone()))
}

/// Draw a random unused decision.
pub async fn next_decision(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Decision>>, ApiError> {
    let mut session = state.session.lock().await;
    let decision = session.next_decision().cloned().ok_or(ApiError::NoDecision)?;
    Ok(Json(Envelope::ok(decision)))
}

/// Apply a choice to the session.
///
/// Both ids are checked before the session is locked.
pub async fn make_decision(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let Json(request) = payload?;
    let (Some(decision_id), Some(choice_id)) = (
        request.decision_id.filter(|id| !id.trim().is_empty()),
        request.choice_id.filter(|id| !id.trim().is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Missing required parameters: decisionId and choiceId".to_owned(),
        ));
    };

    let mut session = state.session.lock().await;
    let outcome =
        session.apply_decision(&DecisionId::from(decision_id), &ChoiceId::from(choice_id))?;

    Ok(Json(DecisionResponse {
        success: true,
        outcome,
    }))
}

/// Discard the current game and start a fresh one.
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<Envelope<GameState>> {
    let mut session = state.session.lock().await;
    let fresh = session.reset().clone();
    info!(session_id = %session.id(), "game reset via API");
    Json(Envelope::ok(fresh))
}

/// Unlocked achievements and progress percentages.
pub async fn achievements(
    State(state): State<Arc<AppState>>,
) -> Json<Envelope<AchievementReport>> {
    let session = state.session.lock().await;
    Json(Envelope::ok(session.achievements()))
}

/// Readable progress for every achievement.
pub async fn achievement_summary(
    State(state): State<Arc<AppState>>,
) -> Json<Envelope<Vec<AchievementSummary>>> {
    let session = state.session.lock().await;
    Json(Envelope::ok(session.tracker().progress_summary()))
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

/// Advisor commentary on the current state, or on a specific decision.
///
/// An unknown `decisionId` is ignored and the advice covers the city as
/// a whole.
pub async fn advisor(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AdvisorQuery>, QueryRejection>,
) -> Result<Json<Envelope<AdvisorMessage>>, ApiError> {
    let Query(query) = query?;
    let context = query.context.unwrap_or_default();

    let (snapshot, decision) = {
        let session = state.session.lock().await;
        let decision = query.decision_id.as_deref().and_then(|id| {
            let found = session.decision(&DecisionId::from(id)).cloned();
            if found.is_none() {
                debug!(decision_id = id, "advisor asked about unknown decision");
            }
            found
        });
        (session.state().clone(), decision)
    };

    let message = state
        .advisor
        .advise(&snapshot, context, decision.as_ref())
        .await;
    Ok(Json(Envelope::ok(message)))
}
