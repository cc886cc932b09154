//! Enumeration types shared by the game core, the advisor, and the API.
//!
//! Every enum serializes in the lowercase form the browser client already
//! speaks (`"environment"`, `"ended"`, `"victory"`, ...).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One of the three bounded city-health numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Stat {
    /// Ecological health of the city.
    Environment,
    /// Prosperity and budget health.
    Economy,
    /// Citizen satisfaction.
    Happiness,
}

impl Stat {
    /// All stats in declaration order.
    pub const ALL: [Self; 3] = [Self::Environment, Self::Economy, Self::Happiness];

    /// Lowercase name used in messages and wire formats.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Economy => "economy",
            Self::Happiness => "happiness",
        }
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of a game. `Active -> Ended` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GameStatus {
    /// Decisions are accepted.
    Active,
    /// Terminal. No further decisions are accepted.
    Ended,
}

/// Classification of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EndingKind {
    /// The player led the city to a good outcome.
    Victory,
    /// The city collapsed, revolted, or under-performed.
    Failure,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Thematic category of a decision, derived from its question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DecisionCategory {
    /// Transport, utilities, public works.
    Infrastructure,
    /// Industry and budget.
    Economic,
    /// Parks, recycling, green policy.
    Environmental,
    /// Everything else: community, health, education.
    Social,
}

impl DecisionCategory {
    /// Lowercase name used in logs and progress text.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Economic => "economic",
            Self::Environmental => "environmental",
            Self::Social => "social",
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Kind of a rendered scene element. Also selects the placement zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SceneElementType {
    /// Generic building.
    Building,
    /// Trees, parks, gardens.
    Vegetation,
    /// Roads, stations, utilities.
    Infrastructure,
    /// Factories and plants.
    Industrial,
    /// Housing.
    Residential,
    /// Shops and offices.
    Commercial,
    /// Civic buildings near the centre.
    Civic,
    /// Particle or glow effect.
    Effect,
}

/// Operation a [`SceneChange`](crate::SceneChange) performs on the scene list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SceneAction {
    /// Append the element.
    Add,
    /// Remove the element with the same id.
    Remove,
    /// Replace the element with the same id.
    Modify,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Display grouping of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementCategory {
    /// Green play.
    Environmental,
    /// Economic play.
    Economic,
    /// Citizen-focused play.
    Social,
    /// Overall stewardship.
    Leadership,
}

/// Difficulty badge of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// Reachable in a casual game.
    Easy,
    /// Needs a plan.
    Medium,
    /// Needs a good plan.
    Hard,
    /// Rarely seen.
    Legendary,
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

/// Tone of the advisor, chosen from the average stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AdvisorPersonality {
    /// Average of 70 or more.
    Optimistic,
    /// Average of 50 or more.
    Encouraging,
    /// Average of 30 or more.
    Concerned,
    /// Anything lower.
    Sarcastic,
}

impl AdvisorPersonality {
    /// Template name for this tone.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::Encouraging => "encouraging",
            Self::Concerned => "concerned",
            Self::Sarcastic => "sarcastic",
        }
    }
}

/// What the player asked the advisor about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AdvisorContext {
    /// General commentary on the city.
    #[default]
    CurrentState,
    /// Commentary on the decision currently on the table.
    DecisionSpecific,
}
