//! The game session: one city, one deck, one achievement tracker.
//!
//! [`GameSession`] owns all mutable game state and is the only way to
//! change it. The caller (the HTTP layer, a test, a CLI) holds the session
//! and serializes access to it; the session itself never blocks, never
//! spawns, and never touches global state. Randomness comes from a seeded
//! [`StdRng`] so a session can be replayed exactly.
//!
//! # Turn pipeline
//!
//! [`GameSession::apply_decision`] validates everything before the first
//! mutation, then: marks the decision used, applies the clamped impact,
//! advances the turn, updates achievements, plans the scene, classifies the
//! ending, and (if the game just ended) evaluates final-state achievements.

use std::collections::BTreeSet;
use std::path::Path;

use civic_types::{
    AchievementReport, ChoiceId, Decision, DecisionId, DecisionOutcome, GameState, GameStatus,
    SessionId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::achievement::AchievementCatalog;
use crate::config::{EndingConfig, GameConfig, RulesConfig};
use crate::decision::{DecisionCatalog, FileDecisionSource};
use crate::ending::classify;
use crate::error::GameError;
use crate::scene::{ScenePlanner, apply_changes};
use crate::tracker::{AchievementTracker, DecisionTaken};

/// A single game in progress.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    rules: RulesConfig,
    endings: EndingConfig,
    state: GameState,
    catalog: DecisionCatalog,
    used: BTreeSet<DecisionId>,
    tracker: AchievementTracker,
    planner: ScenePlanner,
    rng: StdRng,
}

impl GameSession {
    /// Start a session over explicit catalogs.
    pub fn new(
        config: &GameConfig,
        catalog: DecisionCatalog,
        achievements: AchievementCatalog,
        seed: u64,
    ) -> Self {
        let rules = config.game.clone();
        let state = fresh_state(&rules);
        let session = Self {
            id: SessionId::new(),
            endings: config.endings.clone(),
            state,
            catalog,
            used: BTreeSet::new(),
            tracker: AchievementTracker::new(achievements),
            planner: ScenePlanner::new(),
            rng: StdRng::seed_from_u64(seed),
            rules,
        };
        tracing::info!(
            session_id = %session.id,
            seed,
            decisions = session.catalog.len(),
            achievements = session.tracker.catalog().len(),
            max_turns = session.state.max_turns,
            "game session started"
        );
        session
    }

    /// Start a session with catalogs loaded as the configuration directs:
    /// the files it names, or the built-in content.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] or [`GameError::Catalog`] if a
    /// catalog cannot be loaded.
    pub fn from_config(config: &GameConfig, seed: u64) -> Result<Self, GameError> {
        let catalog = match &config.game.decisions_path {
            Some(path) => DecisionCatalog::from_source(&FileDecisionSource::new(path))?,
            None => DecisionCatalog::builtin()?,
        };
        let achievements = match &config.achievements_path {
            Some(path) => AchievementCatalog::from_file(Path::new(path))?,
            None => AchievementCatalog::builtin()?,
        };
        Ok(Self::new(config, catalog, achievements, seed))
    }

    /// Identifier of the current game. Changes on reset.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Read-only snapshot of the game state.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Look up any decision in the catalog, used or not.
    pub fn decision(&self, id: &DecisionId) -> Option<&Decision> {
        self.catalog.get(id)
    }

    /// The achievement tracker.
    pub const fn tracker(&self) -> &AchievementTracker {
        &self.tracker
    }

    /// Ids of decisions consumed since the last reset or reshuffle.
    pub const fn used_decisions(&self) -> &BTreeSet<DecisionId> {
        &self.used
    }

    /// Draw a random unused decision.
    ///
    /// Returns `None` once the game has ended, or when the deck is
    /// exhausted and recycling is disabled. With recycling enabled an
    /// exhausted deck is reshuffled.
    pub fn next_decision(&mut self) -> Option<&Decision> {
        if !self.state.is_active() {
            return None;
        }

        let exhausted = self.catalog.iter().all(|d| self.used.contains(&d.id));
        if exhausted {
            if !self.rules.recycle_decisions {
                tracing::debug!(session_id = %self.id, "decision deck exhausted");
                return None;
            }
            tracing::info!(session_id = %self.id, "decision deck exhausted; reshuffling");
            self.used.clear();
        }

        let available: Vec<&Decision> = self
            .catalog
            .iter()
            .filter(|d| !self.used.contains(&d.id))
            .collect();
        if available.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..available.len());
        available.get(idx).copied()
    }

    /// Apply a choice and run the turn pipeline.
    ///
    /// # Errors
    ///
    /// - [`GameError::Validation`] if either id is blank.
    /// - [`GameError::NotFound`] if the decision or the choice is unknown.
    /// - [`GameError::AlreadyEnded`] if the game is over.
    ///
    /// The session is unchanged when an error is returned.
    pub fn apply_decision(
        &mut self,
        decision_id: &DecisionId,
        choice_id: &ChoiceId,
    ) -> Result<DecisionOutcome, GameError> {
        if decision_id.as_str().trim().is_empty() {
            return Err(GameError::Validation(String::from("decisionId is required")));
        }
        if choice_id.as_str().trim().is_empty() {
            return Err(GameError::Validation(String::from("choiceId is required")));
        }

        let decision = self.catalog.get(decision_id).ok_or_else(|| GameError::NotFound {
            kind: "decision",
            id: decision_id.to_string(),
        })?;
        let choice = decision.choice(choice_id).ok_or_else(|| GameError::NotFound {
            kind: "choice",
            id: choice_id.to_string(),
        })?;
        if !self.state.is_active() {
            return Err(GameError::AlreadyEnded);
        }

        let category = decision.category;
        let choice = choice.clone();

        self.used.insert(decision_id.clone());
        self.state.stats = self.state.stats.applied(&choice.impact);
        self.state.turn = self.state.turn.saturating_add(1);

        tracing::debug!(
            session_id = %self.id,
            decision = %decision_id,
            choice = %choice_id,
            turn = self.state.turn,
            environment = self.state.stats.environment,
            economy = self.state.stats.economy,
            happiness = self.state.stats.happiness,
            "decision applied"
        );

        let taken = DecisionTaken {
            category,
            choice: choice.id.clone(),
        };
        let mut unlocked = self.tracker.update_progress(&self.state, Some(&taken));

        let mut scene_changes =
            self.planner
                .plan_turn(&choice.text, &self.state, &unlocked, &mut self.rng);
        apply_changes(&mut self.state.scene_elements, &scene_changes);

        if let Some(ending) = classify(&self.state, self.tracker.unlocked_count(), &self.endings) {
            self.state.game_status = GameStatus::Ended;
            self.state.ending_type = Some(ending.kind);
            self.state.ending_title = Some(ending.title);
            self.state.ending_description = Some(ending.description);
            tracing::info!(
                session_id = %self.id,
                turn = self.state.turn,
                ending = ?ending.kind,
                title = self.state.ending_title.as_deref().unwrap_or_default(),
                "game ended"
            );

            let finals = self.tracker.finalize(&self.state);
            if !finals.is_empty() {
                let rewards =
                    self.planner
                        .plan_rewards(&self.state.scene_elements, &finals, &mut self.rng);
                apply_changes(&mut self.state.scene_elements, &rewards);
                scene_changes.extend(rewards);
                unlocked.extend(finals);
            }
        }

        let next_decision_available = self.state.is_active()
            && self.state.turn <= self.state.max_turns
            && (self.rules.recycle_decisions || self.used.len() < self.catalog.len());

        Ok(DecisionOutcome {
            feedback: choice.feedback,
            stat_changes: choice.impact,
            new_stats: self.state.stats,
            scene_changes,
            game_status: self.state.game_status,
            next_decision_available,
            achievements_unlocked: unlocked,
        })
    }

    /// Unlocked achievements and progress percentages.
    pub fn achievements(&self) -> AchievementReport {
        AchievementReport {
            unlocked: self.tracker.unlocked().to_vec(),
            progress: self.tracker.progress_percentages(),
        }
    }

    /// Discard the game and start a fresh one with the same catalogs.
    pub fn reset(&mut self) -> &GameState {
        let previous = self.id;
        self.state = fresh_state(&self.rules);
        self.used.clear();
        self.tracker.reset();
        self.planner.reset();
        self.id = SessionId::new();
        tracing::info!(previous = %previous, session_id = %self.id, "game session reset");
        &self.state
    }
}

fn fresh_state(rules: &RulesConfig) -> GameState {
    GameState::new(
        rules.starting_stats(),
        rules.max_turns,
        ScenePlanner::initial_elements(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civic_types::{EndingKind, StatSet};

    use super::*;

    const DECK: &str = r#"{
        "decisions": [
            {
                "question": "Plant a park?",
                "choices": [
                    { "text": "Build the park", "impact": { "environment": 40 } },
                    { "text": "Skip it", "impact": {} }
                ]
            },
            {
                "question": "Open a factory?",
                "choices": [
                    { "text": "Open it", "impact": { "environment": -45, "economy": -45 } },
                    { "text": "Decline", "impact": { "economy": 5 } }
                ]
            },
            {
                "question": "Hold a town meeting?",
                "choices": [
                    { "text": "Yes", "impact": { "happiness": 5 } },
                    { "text": "No", "impact": {} }
                ]
            }
        ]
    }"#;

    fn session_with(config: &GameConfig, seed: u64) -> GameSession {
        GameSession::new(
            config,
            DecisionCatalog::from_json(DECK).unwrap(),
            AchievementCatalog::builtin().unwrap(),
            seed,
        )
    }

    fn session() -> GameSession {
        session_with(&GameConfig::default(), 42)
    }

    fn ids(decision: &str, choice: &str) -> (DecisionId, ChoiceId) {
        (DecisionId::from(decision), ChoiceId::from(choice))
    }

    #[test]
    fn fresh_session_defaults() {
        let s = session();
        let state = s.state();
        assert_eq!(state.turn, 1);
        assert_eq!(state.max_turns, 15);
        assert_eq!(state.stats, StatSet::default());
        assert_eq!(state.game_status, GameStatus::Active);
        assert_eq!(state.scene_elements.len(), 1);
        assert!(state.ending_type.is_none());
    }

    #[test]
    fn validation_and_lookup_errors_leave_state_untouched() {
        let mut s = session();
        let before = s.state().clone();

        let (d, c) = ids("", "choice_1_1");
        assert!(matches!(s.apply_decision(&d, &c), Err(GameError::Validation(_))));
        let (d, c) = ids("decision_1", " ");
        assert!(matches!(s.apply_decision(&d, &c), Err(GameError::Validation(_))));
        let (d, c) = ids("decision_99", "choice_99_1");
        assert!(matches!(
            s.apply_decision(&d, &c),
            Err(GameError::NotFound { kind: "decision", .. })
        ));
        let (d, c) = ids("decision_1", "choice_2_1");
        assert!(matches!(
            s.apply_decision(&d, &c),
            Err(GameError::NotFound { kind: "choice", .. })
        ));

        assert_eq!(s.state(), &before);
        assert!(s.used_decisions().is_empty());
    }

    #[test]
    fn stat_changes_report_nominal_impact() {
        let mut config = GameConfig::default();
        config.game.starting_stats = StatSet::clamped(80, 50, 50);
        let mut s = session_with(&config, 1);

        let (d, c) = ids("decision_1", "choice_1_1");
        let outcome = s.apply_decision(&d, &c).unwrap();
        assert_eq!(outcome.stat_changes.environment, 40);
        assert_eq!(outcome.new_stats.environment, 100);
        assert_eq!(s.state().turn, 2);
        assert_eq!(
            outcome.feedback,
            "This choice resulted in improved environmental health."
        );
    }

    #[test]
    fn used_decisions_are_not_drawn_again() {
        let mut config = GameConfig::default();
        config.game.recycle_decisions = false;
        let mut s = session_with(&config, 9);

        let mut seen = BTreeSet::new();
        for _ in 0..3 {
            let decision = s.next_decision().cloned().unwrap();
            assert!(seen.insert(decision.id.clone()));
            let choice = decision.choices.last().unwrap().id.clone();
            let outcome = s.apply_decision(&decision.id, &choice).unwrap();
            assert_eq!(outcome.next_decision_available, seen.len() < 3);
        }
        assert!(s.next_decision().is_none());
    }

    #[test]
    fn exhausted_deck_recycles_when_enabled() {
        let mut s = session();
        for n in 1..=3 {
            let (d, c) = ids(&format!("decision_{n}"), &format!("choice_{n}_2"));
            let outcome = s.apply_decision(&d, &c).unwrap();
            assert!(outcome.next_decision_available);
        }
        assert!(s.next_decision().is_some());
        assert!(s.used_decisions().is_empty());
    }

    #[test]
    fn collapse_ends_the_game_and_blocks_further_turns() {
        let mut s = session();
        let (d, c) = ids("decision_2", "choice_2_1");
        let outcome = s.apply_decision(&d, &c).unwrap();

        assert_eq!(outcome.game_status, GameStatus::Ended);
        assert!(!outcome.next_decision_available);
        assert_eq!(s.state().ending_type, Some(EndingKind::Failure));
        assert_eq!(
            s.state().ending_title.as_deref(),
            Some("Economic and Environmental Collapse")
        );

        let frozen = s.state().clone();
        let unlocked = s.tracker().unlocked_count();
        let (d, c) = ids("decision_3", "choice_3_1");
        assert!(matches!(s.apply_decision(&d, &c), Err(GameError::AlreadyEnded)));
        assert_eq!(s.state(), &frozen);
        assert_eq!(s.tracker().unlocked_count(), unlocked);
        assert!(s.next_decision().is_none());
    }

    #[test]
    fn final_achievements_unlock_when_the_game_ends() {
        let mut config = GameConfig::default();
        config.game.max_turns = 2;
        config.game.starting_stats = StatSet::clamped(85, 85, 85);
        let mut s = session_with(&config, 5);

        let (d, c) = ids("decision_3", "choice_3_2");
        let outcome = s.apply_decision(&d, &c).unwrap();
        assert_eq!(outcome.game_status, GameStatus::Ended);

        let unlocked: Vec<&str> = outcome
            .achievements_unlocked
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(
            unlocked,
            vec!["balanced_leader", "early_achiever", "perfect_balance"]
        );
        // Scored before the final pass: two achievements at classification.
        assert_eq!(
            s.state().ending_title.as_deref(),
            Some("Sustainable City Achievement")
        );
        assert!(
            outcome
                .scene_changes
                .iter()
                .any(|c| c.element.model_path == "/models/buildings/golden_city_hall.glb")
        );
    }

    #[test]
    fn reset_restores_a_fresh_game() {
        let mut config = GameConfig::default();
        config.game.starting_stats = StatSet::clamped(75, 75, 75);
        let mut s = session_with(&config, 3);
        let first_id = s.id();

        let (d, c) = ids("decision_1", "choice_1_1");
        let outcome = s.apply_decision(&d, &c).unwrap();
        assert!(!outcome.achievements_unlocked.is_empty());

        let expected = fresh_state(&config.game);
        assert_eq!(s.reset(), &expected);
        assert!(s.achievements().unlocked.is_empty());
        assert!(s.achievements().progress.values().all(|p| *p == 0));
        assert!(s.used_decisions().is_empty());
        assert_ne!(s.id(), first_id);
    }

    #[test]
    fn same_seed_draws_same_decisions() {
        let draw = |seed| {
            let mut s = session_with(&GameConfig::default(), seed);
            (0..3)
                .filter_map(|_| {
                    let decision = s.next_decision().cloned()?;
                    let choice = decision.choices.first()?.id.clone();
                    s.apply_decision(&decision.id, &choice).ok()?;
                    Some(decision.id)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(77), draw(77));
    }

    #[test]
    fn decision_lookup_ignores_usage() {
        let mut s = session();
        let (d, c) = ids("decision_1", "choice_1_2");
        s.apply_decision(&d, &c).unwrap();
        assert!(s.decision(&d).is_some());
        assert!(s.decision(&DecisionId::from("decision_7")).is_none());
    }

    #[test]
    fn from_config_uses_builtin_content() {
        let s = GameSession::from_config(&GameConfig::default(), 1).unwrap();
        assert!(s.catalog.len() >= 15);
        assert_eq!(s.tracker().catalog().len(), 9);
    }
}
