//! Game rules for the Civic city-management game.
//!
//! This crate owns everything that changes game state: the decision deck,
//! the turn pipeline, achievement evaluation, ending classification, and
//! scene planning. It performs no I/O beyond loading content at startup
//! and never blocks.
//!
//! # Modules
//!
//! - [`achievement`] -- Achievement definitions, [`Criterion`], and the
//!   catalog.
//! - [`config`] -- Configuration loading from `civic-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`DecisionSource`] trait and the decision catalog.
//! - [`ending`] -- Collapse, revolt, and turn-limit scoring.
//! - [`error`] -- [`GameError`].
//! - [`scene`] -- Keyword-driven scene planning and zone placement.
//! - [`session`] -- [`GameSession`], the turn pipeline.
//! - [`tracker`] -- Per-session achievement progress.
//!
//! [`Criterion`]: achievement::Criterion
//! [`DecisionSource`]: decision::DecisionSource
//! [`GameError`]: error::GameError
//! [`GameSession`]: session::GameSession

pub mod achievement;
pub mod config;
pub mod decision;
pub mod ending;
pub mod error;
pub mod scene;
pub mod session;
pub mod tracker;

pub use error::GameError;
pub use session::GameSession;
