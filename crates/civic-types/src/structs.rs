//! Core entity structs: stats, decisions, scene elements, game state,
//! achievements, and advisor messages.
//!
//! Field names serialize in camelCase to match the browser client.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AchievementCategory, AdvisorContext, AdvisorPersonality, DecisionCategory, Difficulty,
    EndingKind, GameStatus, SceneAction, SceneElementType, Stat,
};
use crate::ids::{AchievementId, ChoiceId, DecisionId};

/// Lowest value any stat may hold.
pub const STAT_MIN: u8 = 0;

/// Highest value any stat may hold.
pub const STAT_MAX: u8 = 100;

/// Default starting value for every stat.
pub const STAT_DEFAULT: u8 = 50;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// The three city stats.
///
/// Every value lies in `[STAT_MIN, STAT_MAX]`. Construct through
/// [`StatSet::clamped`] or [`StatSet::applied`], both of which clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatSet {
    /// Ecological health, 0-100.
    pub environment: u8,
    /// Prosperity, 0-100.
    pub economy: u8,
    /// Citizen satisfaction, 0-100.
    pub happiness: u8,
}

impl StatSet {
    /// Build a stat set, clamping every component into range.
    pub fn clamped(environment: i32, economy: i32, happiness: i32) -> Self {
        Self {
            environment: clamp_stat(environment),
            economy: clamp_stat(economy),
            happiness: clamp_stat(happiness),
        }
    }

    /// Value of a single stat.
    pub const fn get(self, stat: Stat) -> u8 {
        match stat {
            Stat::Environment => self.environment,
            Stat::Economy => self.economy,
            Stat::Happiness => self.happiness,
        }
    }

    /// Apply an impact vector, clamping each result into range.
    pub fn applied(self, impact: &StatImpact) -> Self {
        Self::clamped(
            i32::from(self.environment).saturating_add(impact.environment),
            i32::from(self.economy).saturating_add(impact.economy),
            i32::from(self.happiness).saturating_add(impact.happiness),
        )
    }

    /// Values in [`Stat::ALL`] order.
    pub const fn values(self) -> [u8; 3] {
        [self.environment, self.economy, self.happiness]
    }

    /// The lowest of the three stats.
    pub fn min(self) -> u8 {
        self.environment.min(self.economy).min(self.happiness)
    }

    /// Arithmetic mean of the three stats.
    pub fn average(self) -> f64 {
        let sum = f64::from(self.environment) + f64::from(self.economy) + f64::from(self.happiness);
        sum / 3.0
    }

    /// Whether every stat satisfies `predicate`.
    pub fn all(self, predicate: impl Fn(u8) -> bool) -> bool {
        self.values().into_iter().all(predicate)
    }

    /// Whether at least one stat satisfies `predicate`.
    pub fn any(self, predicate: impl Fn(u8) -> bool) -> bool {
        self.values().into_iter().any(predicate)
    }
}

impl Default for StatSet {
    fn default() -> Self {
        Self {
            environment: STAT_DEFAULT,
            economy: STAT_DEFAULT,
            happiness: STAT_DEFAULT,
        }
    }
}

fn clamp_stat(value: i32) -> u8 {
    let bounded = value.clamp(i32::from(STAT_MIN), i32::from(STAT_MAX));
    u8::try_from(bounded).unwrap_or(STAT_MAX)
}

/// Signed per-stat change carried by a choice. Missing components are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct StatImpact {
    /// Change to environment.
    pub environment: i32,
    /// Change to economy.
    pub economy: i32,
    /// Change to happiness.
    pub happiness: i32,
}

impl StatImpact {
    /// Change applied to a single stat.
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Environment => self.environment,
            Stat::Economy => self.economy,
            Stat::Happiness => self.happiness,
        }
    }

    /// Whether the impact changes nothing.
    pub const fn is_neutral(&self) -> bool {
        self.environment == 0 && self.economy == 0 && self.happiness == 0
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// One option of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Choice {
    /// Key unique within the owning decision.
    pub id: ChoiceId,
    /// Text shown to the player.
    pub text: String,
    /// Nominal stat change.
    pub impact: StatImpact,
    /// Sentence shown after the choice is taken.
    pub feedback: String,
}

/// A single-use prompt with two or more choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Decision {
    /// Stable key for the session lifetime.
    pub id: DecisionId,
    /// Question shown as the card title.
    pub title: String,
    /// Longer description (currently the question again).
    pub description: String,
    /// Keyword-derived category.
    pub category: DecisionCategory,
    /// The available choices.
    pub choices: Vec<Choice>,
}

impl Decision {
    /// Look up a choice by key.
    pub fn choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| &c.id == id)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A point or scale factor in scene space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component (up).
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Build a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Uniform scale vector.
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }
}

/// A renderable object placed in the city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SceneElement {
    /// Unique within the session.
    pub id: String,
    /// Kind of element.
    #[serde(rename = "type")]
    pub element_type: SceneElementType,
    /// Model asset path served to the client.
    pub model_path: String,
    /// World position.
    pub position: Vec3,
    /// Optional per-axis scale.
    pub scale: Option<Vec3>,
    /// Optional rotation in radians.
    pub rotation: Option<Vec3>,
}

/// An edit to the scene list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SceneChange {
    /// What to do.
    pub action: SceneAction,
    /// The element added, removed, or replaced (matched by id).
    pub element: SceneElement,
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// The mutable state of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Current stats.
    pub stats: StatSet,
    /// Current turn, starting at 1.
    pub turn: u32,
    /// Turn at which the game is scored.
    pub max_turns: u32,
    /// Lifecycle status.
    pub game_status: GameStatus,
    /// Set once the game ends.
    pub ending_type: Option<EndingKind>,
    /// Set once the game ends.
    pub ending_title: Option<String>,
    /// Set once the game ends.
    pub ending_description: Option<String>,
    /// Rendered city, in insertion order.
    pub scene_elements: Vec<SceneElement>,
}

impl GameState {
    /// A fresh, active game at turn 1.
    pub const fn new(stats: StatSet, max_turns: u32, scene_elements: Vec<SceneElement>) -> Self {
        Self {
            stats,
            turn: 1,
            max_turns,
            game_status: GameStatus::Active,
            ending_type: None,
            ending_title: None,
            ending_description: None,
            scene_elements,
        }
    }

    /// Whether decisions are still accepted.
    pub fn is_active(&self) -> bool {
        self.game_status == GameStatus::Active
    }
}

/// Everything the client needs after a decision is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DecisionOutcome {
    /// Feedback sentence of the chosen option.
    pub feedback: String,
    /// Nominal impact of the choice, before clamping.
    pub stat_changes: StatImpact,
    /// Stats after the choice.
    pub new_stats: StatSet,
    /// Scene edits produced this turn.
    pub scene_changes: Vec<SceneChange>,
    /// Status after ending classification.
    pub game_status: GameStatus,
    /// Whether another decision can be drawn.
    pub next_decision_available: bool,
    /// Achievements unlocked by this turn.
    pub achievements_unlocked: Vec<UnlockedAchievement>,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Decorative payload granted with an achievement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Reward {
    /// Effect model name under `/models/effects/`.
    #[serde(default, alias = "visual_effect")]
    pub visual_effect: Option<String>,
    /// Building model name under `/models/buildings/`.
    #[serde(default, alias = "city_element")]
    pub city_element: Option<String>,
}

/// An achievement granted in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UnlockedAchievement {
    /// Definition key.
    pub id: AchievementId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Display grouping.
    pub category: AchievementCategory,
    /// Difficulty badge.
    pub difficulty: Difficulty,
    /// Wall-clock unlock time. Informational only.
    pub unlocked_at: DateTime<Utc>,
    /// Decorative reward, if any.
    pub reward: Option<Reward>,
}

/// Achievements unlocked so far and progress toward each definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AchievementReport {
    /// Unlocked achievements in unlock order.
    pub unlocked: Vec<UnlockedAchievement>,
    /// Percentage (0-100) per definition key. Unlocked entries read 100.
    pub progress: BTreeMap<AchievementId, u8>,
}

/// Human-readable progress line for one achievement definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AchievementSummary {
    /// Definition key.
    pub id: AchievementId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Whether it has been granted this session.
    pub unlocked: bool,
    /// Short status text such as `2/5 consecutive turns`.
    pub progress_text: String,
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

/// A message from the city advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AdvisorMessage {
    /// The text to display.
    pub message: String,
    /// Tone of the message.
    pub personality: AdvisorPersonality,
    /// Stat the advisor wants the player to focus on.
    pub priority: Option<Stat>,
    /// What the message responds to.
    pub context: AdvisorContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_every_component() {
        let stats = StatSet::clamped(-20, 250, 42);
        assert_eq!(stats.environment, 0);
        assert_eq!(stats.economy, 100);
        assert_eq!(stats.happiness, 42);
    }

    #[test]
    fn applied_clamps_at_both_ends() {
        let stats = StatSet::clamped(95, 5, 50);
        let impact = StatImpact {
            environment: 20,
            economy: -20,
            happiness: 0,
        };
        let next = stats.applied(&impact);
        assert_eq!(next.values(), [100, 0, 50]);
    }

    #[test]
    fn applied_survives_extreme_impacts() {
        let impact = StatImpact {
            environment: i32::MAX,
            economy: i32::MIN,
            happiness: 1,
        };
        let next = StatSet::default().applied(&impact);
        assert_eq!(next.values(), [100, 0, 51]);
    }

    #[test]
    fn min_and_average() {
        let stats = StatSet::clamped(30, 60, 90);
        assert_eq!(stats.min(), 30);
        assert!((stats.average() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn impact_deserializes_with_missing_components() {
        let impact: StatImpact = serde_json::from_str(r#"{"economy": -5}"#)
            .unwrap_or_default();
        assert_eq!(impact.economy, -5);
        assert_eq!(impact.environment, 0);
        assert!(!impact.is_neutral());
    }

    #[test]
    fn game_state_serializes_camel_case() {
        let state = GameState::new(StatSet::default(), 15, Vec::new());
        let json = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(json["gameStatus"], "active");
        assert_eq!(json["maxTurns"], 15);
        assert_eq!(json["turn"], 1);
    }

    #[test]
    fn scene_element_type_field_is_renamed() {
        let element = SceneElement {
            id: String::from("city_hall"),
            element_type: SceneElementType::Building,
            model_path: String::from("/models/buildings/city-hall.glb"),
            position: Vec3::default(),
            scale: None,
            rotation: None,
        };
        let json = serde_json::to_value(&element).unwrap_or_default();
        assert_eq!(json["type"], "building");
        assert_eq!(json["modelPath"], "/models/buildings/city-hall.glb");
    }
}
