//! Shared type definitions for the Civic city-management game.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate or network boundary. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Session UUIDs and stable catalog keys
//! - [`enums`] -- Stats, lifecycle, categories, scene and advisor enums
//! - [`structs`] -- Stats, decisions, scene elements, game state, outcomes,
//!   achievement reports

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AchievementCategory, AdvisorContext, AdvisorPersonality, DecisionCategory, Difficulty,
    EndingKind, GameStatus, SceneAction, SceneElementType, Stat,
};
pub use ids::{AchievementId, ChoiceId, DecisionId, SessionId};
pub use structs::{
    AchievementReport, AchievementSummary, AdvisorMessage, Choice, Decision, DecisionOutcome,
    GameState, Reward, STAT_DEFAULT, STAT_MAX, STAT_MIN, SceneChange, SceneElement, StatImpact,
    StatSet, UnlockedAchievement, Vec3,
};
