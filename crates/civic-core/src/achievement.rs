//! Achievement definitions, unlock criteria, and the achievement catalog.
//!
//! A definition pairs display metadata with a declarative [`Criterion`].
//! The catalog is immutable once loaded; per-session progress lives in the
//! [`AchievementTracker`](crate::tracker::AchievementTracker).

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use civic_types::{
    AchievementCategory, AchievementId, DecisionCategory, Difficulty, Reward, Stat,
    UnlockedAchievement,
};
use serde::Deserialize;

use crate::error::GameError;

/// The achievement catalog compiled into the binary.
const EMBEDDED_ACHIEVEMENTS: &str = include_str!("../data/achievements.yaml");

/// The rule that decides when an achievement unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criterion {
    /// The stat is at or above `threshold` right now.
    StatThreshold {
        /// Stat to check.
        stat: Stat,
        /// Inclusive lower bound.
        threshold: u8,
    },

    /// The stat has been at or above `threshold` for `duration`
    /// consecutive evaluations. Any miss resets the run.
    ConsecutiveStatThreshold {
        /// Stat to check.
        stat: Stat,
        /// Inclusive lower bound.
        threshold: u8,
        /// Required run length. Zero is treated as one.
        duration: u32,
    },

    /// Every stat is at or above `threshold` at the same time.
    AllStatsThreshold {
        /// Inclusive lower bound.
        threshold: u8,
    },

    /// The lowest stat drops to `from_threshold` or below, then climbs to
    /// `to_threshold` or above within `duration` turns.
    Recovery {
        /// Crisis trigger (inclusive upper bound).
        from_threshold: u8,
        /// Recovery target (inclusive lower bound).
        to_threshold: u8,
        /// Turns allowed between crisis and recovery.
        duration: u32,
    },

    /// `count` decisions whose category is in `categories` have been taken.
    DecisionCount {
        /// Categories that count.
        categories: BTreeSet<DecisionCategory>,
        /// Required total. Zero is treated as one.
        count: u32,
    },

    /// Some stat reaches `threshold` no later than `by_turn`.
    EarlyAchievement {
        /// Inclusive lower bound.
        threshold: u8,
        /// Last turn that qualifies.
        by_turn: u32,
    },

    /// The game ended with every stat in `[min_threshold, max_threshold]`.
    FinalBalance {
        /// Inclusive lower bound.
        min_threshold: u8,
        /// Inclusive upper bound.
        max_threshold: u8,
    },

    /// The game ended with the stat at or above `threshold`.
    FinalStat {
        /// Stat to check.
        stat: Stat,
        /// Inclusive lower bound.
        threshold: u8,
    },

    /// A criterion type this build does not know. Never satisfied.
    #[serde(other)]
    Unsupported,
}

impl Criterion {
    /// Whether the criterion only applies to a finished game.
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::FinalBalance { .. } | Self::FinalStat { .. })
    }
}

/// One achievement as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AchievementDefinition {
    /// Unique key.
    pub id: AchievementId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Display grouping.
    pub category: AchievementCategory,
    /// Difficulty badge.
    pub difficulty: Difficulty,
    /// Unlock rule.
    pub criterion: Criterion,
    /// Decorative reward.
    #[serde(default)]
    pub reward: Option<Reward>,
}

impl AchievementDefinition {
    /// The wire form of this definition, stamped with the unlock time.
    pub fn unlock(&self, at: DateTime<Utc>) -> UnlockedAchievement {
        UnlockedAchievement {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            difficulty: self.difficulty,
            unlocked_at: at,
            reward: self.reward.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    achievements: Vec<AchievementDefinition>,
}

/// The immutable, ordered set of achievement definitions.
///
/// Declaration order is evaluation order.
#[derive(Debug, Clone, Default)]
pub struct AchievementCatalog {
    definitions: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    /// The built-in catalog of nine achievements.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Catalog`] if the embedded catalog is malformed.
    pub fn builtin() -> Result<Self, GameError> {
        Self::from_yaml(EMBEDDED_ACHIEVEMENTS)
    }

    /// Parse a catalog from YAML of the form `achievements: [...]`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Catalog`] if the YAML is malformed or two
    /// definitions share an id.
    pub fn from_yaml(yaml: &str) -> Result<Self, GameError> {
        let file: CatalogFile = serde_yml::from_str(yaml)
            .map_err(|e| GameError::Catalog(format!("malformed achievement YAML: {e}")))?;
        Self::new(file.achievements)
    }

    /// Read a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Catalog`] if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, GameError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GameError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Build a catalog from definitions, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Catalog`] if two definitions share an id.
    pub fn new(definitions: Vec<AchievementDefinition>) -> Result<Self, GameError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.id.as_str()) {
                return Err(GameError::Catalog(format!(
                    "duplicate achievement id: {}",
                    def.id
                )));
            }
            if matches!(def.criterion, Criterion::Unsupported) {
                tracing::warn!(
                    achievement = %def.id,
                    "unsupported criterion type; it will never unlock"
                );
            }
        }
        Ok(Self { definitions })
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &AchievementId) -> Option<&AchievementDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_nine_definitions() {
        let catalog = AchievementCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 9);

        let eco = catalog.get(&AchievementId::from("eco_warrior")).unwrap();
        assert_eq!(
            eco.criterion,
            Criterion::ConsecutiveStatThreshold {
                stat: Stat::Environment,
                threshold: 80,
                duration: 5,
            }
        );
        assert_eq!(
            eco.reward.as_ref().and_then(|r| r.city_element.as_deref()),
            Some("pristine_park")
        );
    }

    #[test]
    fn green_innovator_counts_environmental_decisions() {
        let catalog = AchievementCatalog::builtin().unwrap();
        let def = catalog.get(&AchievementId::from("green_innovator")).unwrap();
        assert!(matches!(
            &def.criterion,
            Criterion::DecisionCount { categories, count: 3 }
                if categories.contains(&DecisionCategory::Environmental)
        ));
    }

    #[test]
    fn final_criteria_are_flagged() {
        let catalog = AchievementCatalog::builtin().unwrap();
        let finals: Vec<&str> = catalog
            .definitions()
            .iter()
            .filter(|d| d.criterion.is_final())
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(finals, vec!["perfect_balance", "sustainability_master"]);
    }

    #[test]
    fn unknown_criterion_type_loads_as_unsupported() {
        let yaml = r"
achievements:
  - id: mystery
    title: Mystery
    description: Who knows
    category: leadership
    difficulty: easy
    criterion:
      type: moon_landing
";
        let catalog = AchievementCatalog::from_yaml(yaml).unwrap();
        let def = catalog.get(&AchievementId::from("mystery")).unwrap();
        assert_eq!(def.criterion, Criterion::Unsupported);
        assert!(def.reward.is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r"
achievements:
  - id: twin
    title: A
    description: A
    category: social
    difficulty: easy
    criterion: { type: stat_threshold, stat: happiness, threshold: 60 }
  - id: twin
    title: B
    description: B
    category: social
    difficulty: easy
    criterion: { type: all_stats_threshold, threshold: 60 }
";
        let result = AchievementCatalog::from_yaml(yaml);
        assert!(matches!(result, Err(GameError::Catalog(_))));
    }

    #[test]
    fn unlock_copies_metadata() {
        let catalog = AchievementCatalog::builtin().unwrap();
        let def = catalog.get(&AchievementId::from("balanced_leader")).unwrap();
        let now = Utc::now();
        let unlocked = def.unlock(now);
        assert_eq!(unlocked.id, def.id);
        assert_eq!(unlocked.title, "Balanced Leader");
        assert_eq!(unlocked.unlocked_at, now);
        assert_eq!(unlocked.difficulty, Difficulty::Hard);
    }
}
