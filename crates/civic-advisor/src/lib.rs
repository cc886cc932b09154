//! City advisor for the Civic city-management game.
//!
//! The advisor reads a snapshot of the game and produces a short piece of
//! commentary. Tone and focus come from local rules rendered through
//! `minijinja` templates; when a remote advice service is configured its
//! answer is appended. Nothing here can fail the caller: every error is
//! logged and replaced by a local fallback.
//!
//! # Modules
//!
//! - [`error`] -- [`AdvisorError`].
//! - [`remote`] -- HTTP client for the remote advice service.
//! - [`rules`] -- Personality, priority, and best-choice rules.
//! - [`templates`] -- Message template loading and rendering.

pub mod error;
pub mod remote;
pub mod rules;
pub mod templates;

use std::path::Path;

use civic_core::config::AdvisorConfig;
use civic_types::{AdvisorContext, AdvisorMessage, Decision, GameState};
use tracing::{debug, warn};

pub use error::AdvisorError;

use crate::remote::RemoteAdvisor;
use crate::templates::{HintContext, MessageContext, TemplateEngine};

/// Produces [`AdvisorMessage`]s for a game state.
pub struct Advisor {
    templates: TemplateEngine,
    remote: Option<RemoteAdvisor>,
}

impl Advisor {
    /// Advisor with the built-in templates and the configured remote service.
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        Ok(Self {
            templates: TemplateEngine::builtin()?,
            remote: RemoteAdvisor::from_config(config)?,
        })
    }

    /// Advisor with templates loaded from `dir`.
    pub fn with_templates_dir(config: &AdvisorConfig, dir: &Path) -> Result<Self, AdvisorError> {
        Ok(Self {
            templates: TemplateEngine::from_dir(dir)?,
            remote: RemoteAdvisor::from_config(config)?,
        })
    }

    /// Rule-based advisor that never makes network calls.
    pub fn local() -> Result<Self, AdvisorError> {
        Ok(Self {
            templates: TemplateEngine::builtin()?,
            remote: None,
        })
    }

    /// Whether a remote advice service is configured.
    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Advice for `state`.
    ///
    /// `decision` is only consulted for [`AdvisorContext::DecisionSpecific`].
    /// Always returns a message; template and remote failures are logged
    /// and fall back to local text.
    pub async fn advise(
        &self,
        state: &GameState,
        context: AdvisorContext,
        decision: Option<&Decision>,
    ) -> AdvisorMessage {
        let mut advice = self.compose(state, context, decision);

        if let Some(remote) = &self.remote {
            match remote.fetch(state).await {
                Ok(Some(extra)) => {
                    advice.message.push_str("\n\n");
                    advice.message.push_str(&extra);
                }
                Ok(None) => debug!("remote advisor had nothing to add"),
                Err(e) => warn!(error = %e, "remote advice unavailable, using rule-based message"),
            }
        }

        advice
    }

    /// The local, rule-based part of the advice.
    pub fn compose(
        &self,
        state: &GameState,
        context: AdvisorContext,
        decision: Option<&Decision>,
    ) -> AdvisorMessage {
        let personality = rules::personality(state.stats);
        let priority = rules::priority(state.stats);

        let base = self
            .templates
            .message(
                personality,
                &MessageContext {
                    priority: priority.name(),
                    level: state.stats.get(priority),
                    turn: state.turn,
                },
            )
            .unwrap_or_else(|e| {
                warn!(error = %e, personality = personality.name(), "advisor template failed");
                rules::fallback_line(personality).to_owned()
            });

        let hint = match (context, decision) {
            (AdvisorContext::DecisionSpecific, Some(decision)) => {
                rules::best_choice(decision, priority).and_then(|choice| {
                    self.templates
                        .hint(&HintContext {
                            question: &decision.title,
                            choice: &choice.text,
                            priority: priority.name(),
                            delta: format!("{:+}", choice.impact.get(priority)),
                        })
                        .inspect_err(|e| warn!(error = %e, "advisor hint template failed"))
                        .ok()
                })
            }
            _ => None,
        };

        let mut message = base;
        if let Some(hint) = hint {
            message.push(' ');
            message.push_str(&hint);
        }

        AdvisorMessage {
            message,
            personality,
            priority: Some(priority),
            context,
        }
    }
}
