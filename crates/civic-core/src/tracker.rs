//! Per-session achievement progress and unlock evaluation.
//!
//! The tracker owns one [`AchievementProgress`] record per catalog entry,
//! the set of unlocked achievements, and an audit history of stats and
//! decisions. [`AchievementTracker::update_progress`] runs once per turn
//! and returns only the achievements that unlocked on that call.
//!
//! # Evaluation rules
//!
//! - Definitions are evaluated in catalog order.
//! - An unlocked definition is skipped entirely: no re-check, no progress
//!   mutation.
//! - A consecutive-threshold miss resets the run before the comparison.
//! - A recovery crisis is armed only from the not-in-crisis state; a second
//!   dip inside an open crisis keeps the original start turn.
//! - Final-state criteria only pass once the game has ended.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use civic_types::{
    AchievementId, AchievementSummary, ChoiceId, DecisionCategory, GameState, GameStatus, StatSet,
    UnlockedAchievement,
};

use crate::achievement::{AchievementCatalog, AchievementDefinition, Criterion};

/// The decision just taken, as seen by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTaken {
    /// Category of the decision.
    pub category: DecisionCategory,
    /// Choice that was picked.
    pub choice: ChoiceId,
}

/// Stats observed at one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    /// Turn at evaluation time.
    pub turn: u32,
    /// Stats at evaluation time.
    pub stats: StatSet,
}

/// A decision observed at one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRecord {
    /// Turn at evaluation time.
    pub turn: u32,
    /// Category of the decision.
    pub category: DecisionCategory,
}

/// Mutable progress toward one achievement. The variant follows the
/// criterion kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementProgress {
    /// Run length for a consecutive-threshold criterion.
    Consecutive {
        /// Current run.
        current: u32,
        /// Longest run seen.
        best: u32,
    },
    /// Crisis window for a recovery criterion.
    Recovery {
        /// Whether a crisis window is open.
        in_crisis: bool,
        /// Turn the window opened.
        crisis_start_turn: Option<u32>,
        /// Whether the recovery already fired.
        recovered: bool,
    },
    /// Matching decisions for a decision-count criterion.
    DecisionCount {
        /// Matching decisions taken.
        count: u32,
        /// Categories of the matching decisions, in order.
        matched: Vec<DecisionCategory>,
    },
    /// Criteria that carry no state between evaluations.
    Stateless,
}

impl AchievementProgress {
    /// Fresh progress for a criterion.
    pub const fn for_criterion(criterion: &Criterion) -> Self {
        match criterion {
            Criterion::ConsecutiveStatThreshold { .. } => Self::Consecutive {
                current: 0,
                best: 0,
            },
            Criterion::Recovery { .. } => Self::Recovery {
                in_crisis: false,
                crisis_start_turn: None,
                recovered: false,
            },
            Criterion::DecisionCount { .. } => Self::DecisionCount {
                count: 0,
                matched: Vec::new(),
            },
            _ => Self::Stateless,
        }
    }
}

/// Tracks achievement progress and unlocks for one session.
#[derive(Debug, Clone)]
pub struct AchievementTracker {
    catalog: AchievementCatalog,
    progress: Vec<AchievementProgress>,
    unlocked: Vec<UnlockedAchievement>,
    unlocked_ids: BTreeSet<AchievementId>,
    stat_history: Vec<StatRecord>,
    decision_history: Vec<DecisionRecord>,
}

impl AchievementTracker {
    /// Create an initialized tracker over `catalog`.
    pub fn new(catalog: AchievementCatalog) -> Self {
        let mut tracker = Self {
            catalog,
            progress: Vec::new(),
            unlocked: Vec::new(),
            unlocked_ids: BTreeSet::new(),
            stat_history: Vec::new(),
            decision_history: Vec::new(),
        };
        tracker.initialize();
        tracker
    }

    /// Allocate fresh progress for every definition and clear unlocks and
    /// history.
    pub fn initialize(&mut self) {
        self.progress = self
            .catalog
            .definitions()
            .iter()
            .map(|d| AchievementProgress::for_criterion(&d.criterion))
            .collect();
        self.unlocked.clear();
        self.unlocked_ids.clear();
        self.stat_history.clear();
        self.decision_history.clear();
    }

    /// Same as [`initialize`](Self::initialize).
    pub fn reset(&mut self) {
        self.initialize();
    }

    /// Record the turn and return the achievements that unlock on it.
    pub fn update_progress(
        &mut self,
        state: &GameState,
        decision: Option<&DecisionTaken>,
    ) -> Vec<UnlockedAchievement> {
        self.stat_history.push(StatRecord {
            turn: state.turn,
            stats: state.stats,
        });
        if let Some(taken) = decision {
            self.decision_history.push(DecisionRecord {
                turn: state.turn,
                category: taken.category,
            });
        }

        let category = decision.map(|d| d.category);
        self.evaluate(|_| true, |def, progress| evaluate(def, progress, state, category))
    }

    /// Evaluate only the final-state criteria against a finished game.
    ///
    /// Does not append history and does not touch progress of other kinds.
    pub fn finalize(&mut self, state: &GameState) -> Vec<UnlockedAchievement> {
        self.evaluate(
            |def| def.criterion.is_final(),
            |def, progress| evaluate(def, progress, state, None),
        )
    }

    fn evaluate(
        &mut self,
        applies: impl Fn(&AchievementDefinition) -> bool,
        mut check: impl FnMut(&AchievementDefinition, &mut AchievementProgress) -> bool,
    ) -> Vec<UnlockedAchievement> {
        let now = Utc::now();
        let mut newly = Vec::new();

        for (def, progress) in self
            .catalog
            .definitions()
            .iter()
            .zip(self.progress.iter_mut())
        {
            if self.unlocked_ids.contains(&def.id) || !applies(def) {
                continue;
            }
            if check(def, progress) {
                tracing::info!(achievement = %def.id, title = %def.title, "achievement unlocked");
                self.unlocked_ids.insert(def.id.clone());
                newly.push(def.unlock(now));
            }
        }

        self.unlocked.extend(newly.iter().cloned());
        newly
    }

    /// Achievements unlocked this session, in unlock order.
    pub fn unlocked(&self) -> &[UnlockedAchievement] {
        &self.unlocked
    }

    /// Number of unlocked achievements.
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Whether an achievement has been unlocked.
    pub fn is_unlocked(&self, id: &AchievementId) -> bool {
        self.unlocked_ids.contains(id)
    }

    /// Progress record for an achievement.
    pub fn progress_of(&self, id: &AchievementId) -> Option<&AchievementProgress> {
        self.catalog
            .definitions()
            .iter()
            .zip(&self.progress)
            .find(|(def, _)| &def.id == id)
            .map(|(_, progress)| progress)
    }

    /// Every stat snapshot recorded this session.
    pub fn stat_history(&self) -> &[StatRecord] {
        &self.stat_history
    }

    /// Every decision recorded this session.
    pub fn decision_history(&self) -> &[DecisionRecord] {
        &self.decision_history
    }

    /// The catalog the tracker evaluates.
    pub const fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Percentage progress (0-100) for every definition.
    pub fn progress_percentages(&self) -> BTreeMap<AchievementId, u8> {
        self.catalog
            .definitions()
            .iter()
            .zip(&self.progress)
            .map(|(def, progress)| {
                let pct = if self.unlocked_ids.contains(&def.id) {
                    100
                } else {
                    percentage(&def.criterion, progress)
                };
                (def.id.clone(), pct)
            })
            .collect()
    }

    /// Readable progress line for every definition, in catalog order.
    pub fn progress_summary(&self) -> Vec<AchievementSummary> {
        self.catalog
            .definitions()
            .iter()
            .zip(&self.progress)
            .map(|(def, progress)| {
                let unlocked = self.unlocked_ids.contains(&def.id);
                AchievementSummary {
                    id: def.id.clone(),
                    title: def.title.clone(),
                    description: def.description.clone(),
                    unlocked,
                    progress_text: readable(&def.criterion, progress, unlocked),
                }
            })
            .collect()
    }
}

/// Check one criterion, mutating its progress. Kind mismatches are false.
fn evaluate(
    def: &AchievementDefinition,
    progress: &mut AchievementProgress,
    state: &GameState,
    category: Option<DecisionCategory>,
) -> bool {
    let stats = state.stats;
    let ended = state.game_status == GameStatus::Ended;

    match (&def.criterion, progress) {
        (Criterion::StatThreshold { stat, threshold }, _) => stats.get(*stat) >= *threshold,

        (
            Criterion::ConsecutiveStatThreshold {
                stat,
                threshold,
                duration,
            },
            AchievementProgress::Consecutive { current, best },
        ) => {
            if stats.get(*stat) >= *threshold {
                *current = current.saturating_add(1);
                *best = (*best).max(*current);
            } else {
                *current = 0;
            }
            *current >= (*duration).max(1)
        }

        (Criterion::AllStatsThreshold { threshold }, _) => stats.all(|v| v >= *threshold),

        (
            Criterion::Recovery {
                from_threshold,
                to_threshold,
                duration,
            },
            AchievementProgress::Recovery {
                in_crisis,
                crisis_start_turn,
                recovered,
            },
        ) => {
            let lowest = stats.min();
            if !*in_crisis && lowest <= *from_threshold {
                *in_crisis = true;
                *crisis_start_turn = Some(state.turn);
                tracing::debug!(
                    achievement = %def.id,
                    turn = state.turn,
                    lowest,
                    "crisis window opened"
                );
            }
            if *in_crisis && !*recovered {
                let elapsed = crisis_start_turn
                    .map_or(u32::MAX, |start| state.turn.saturating_sub(start));
                if lowest >= *to_threshold && elapsed <= *duration {
                    *recovered = true;
                    return true;
                }
            }
            false
        }

        (
            Criterion::DecisionCount { categories, count },
            AchievementProgress::DecisionCount {
                count: taken,
                matched,
            },
        ) => {
            if let Some(cat) = category
                && categories.contains(&cat)
            {
                *taken = taken.saturating_add(1);
                matched.push(cat);
            }
            *taken >= (*count).max(1)
        }

        (Criterion::EarlyAchievement { threshold, by_turn }, _) => {
            state.turn <= *by_turn && stats.any(|v| v >= *threshold)
        }

        (
            Criterion::FinalBalance {
                min_threshold,
                max_threshold,
            },
            _,
        ) => ended && stats.all(|v| (*min_threshold..=*max_threshold).contains(&v)),

        (Criterion::FinalStat { stat, threshold }, _) => ended && stats.get(*stat) >= *threshold,

        _ => false,
    }
}

fn ratio_percent(numerator: u32, denominator: u32) -> u8 {
    let pct = u64::from(numerator)
        .saturating_mul(100)
        .checked_div(u64::from(denominator.max(1)))
        .unwrap_or(0)
        .min(100);
    u8::try_from(pct).unwrap_or(100)
}

fn percentage(criterion: &Criterion, progress: &AchievementProgress) -> u8 {
    match (criterion, progress) {
        (
            Criterion::ConsecutiveStatThreshold { duration, .. },
            AchievementProgress::Consecutive { current, .. },
        ) => ratio_percent(*current, *duration),
        (
            Criterion::DecisionCount { count, .. },
            AchievementProgress::DecisionCount { count: taken, .. },
        ) => ratio_percent(*taken, *count),
        (_, AchievementProgress::Recovery { in_crisis: true, .. }) => 50,
        _ => 0,
    }
}

fn readable(criterion: &Criterion, progress: &AchievementProgress, unlocked: bool) -> String {
    if unlocked {
        return String::from("Unlocked!");
    }
    match (criterion, progress) {
        (
            Criterion::ConsecutiveStatThreshold { duration, .. },
            AchievementProgress::Consecutive { current, .. },
        ) => format!("{current}/{} consecutive turns", (*duration).max(1)),
        (
            Criterion::DecisionCount { count, .. },
            AchievementProgress::DecisionCount { count: taken, .. },
        ) => format!("{taken}/{} decisions made", (*count).max(1)),
        (_, AchievementProgress::Recovery { in_crisis: true, .. }) => {
            String::from("In crisis - work on recovery!")
        }
        (_, AchievementProgress::Recovery { .. }) => String::from("Waiting for crisis..."),
        _ => String::from("In progress..."),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civic_types::{AchievementCategory, Difficulty, Stat};

    use super::*;

    fn def(id: &str, criterion: Criterion) -> AchievementDefinition {
        AchievementDefinition {
            id: AchievementId::from(id),
            title: id.to_owned(),
            description: String::new(),
            category: AchievementCategory::Leadership,
            difficulty: Difficulty::Medium,
            criterion,
            reward: None,
        }
    }

    fn tracker(defs: Vec<AchievementDefinition>) -> AchievementTracker {
        AchievementTracker::new(AchievementCatalog::new(defs).unwrap())
    }

    fn state(turn: u32, env: i32, eco: i32, happy: i32) -> GameState {
        let mut s = GameState::new(StatSet::clamped(env, eco, happy), 15, Vec::new());
        s.turn = turn;
        s
    }

    fn taken(category: DecisionCategory) -> DecisionTaken {
        DecisionTaken {
            category,
            choice: ChoiceId::from("choice_1_1"),
        }
    }

    #[test]
    fn consecutive_run_unlocks_once() {
        let mut t = tracker(vec![def(
            "cheer",
            Criterion::ConsecutiveStatThreshold {
                stat: Stat::Happiness,
                threshold: 80,
                duration: 3,
            },
        )]);

        let sequence = [85, 85, 85, 60, 85, 85, 85];
        let mut unlock_turns = Vec::new();
        for (turn, happy) in (1_u32..).zip(sequence) {
            let newly = t.update_progress(&state(turn, 50, 50, happy), None);
            if !newly.is_empty() {
                unlock_turns.push(turn);
            }
        }
        assert_eq!(unlock_turns, vec![3]);
    }

    #[test]
    fn consecutive_run_needs_full_streak_after_miss() {
        let mut t = tracker(vec![def(
            "cheer",
            Criterion::ConsecutiveStatThreshold {
                stat: Stat::Happiness,
                threshold: 80,
                duration: 3,
            },
        )]);

        let sequence = [85, 85, 60, 85, 85, 85];
        let mut unlock_turns = Vec::new();
        for (turn, happy) in (1_u32..).zip(sequence) {
            if !t.update_progress(&state(turn, 50, 50, happy), None).is_empty() {
                unlock_turns.push(turn);
            }
        }
        assert_eq!(unlock_turns, vec![6]);
    }

    #[test]
    fn unlocked_definitions_are_not_re_evaluated() {
        let mut t = tracker(vec![def(
            "cheer",
            Criterion::ConsecutiveStatThreshold {
                stat: Stat::Happiness,
                threshold: 80,
                duration: 1,
            },
        )]);
        let id = AchievementId::from("cheer");

        assert_eq!(t.update_progress(&state(1, 50, 50, 90), None).len(), 1);
        // A miss after unlock must not perturb the frozen counter.
        assert!(t.update_progress(&state(2, 50, 50, 10), None).is_empty());
        assert_eq!(
            t.progress_of(&id),
            Some(&AchievementProgress::Consecutive { current: 1, best: 1 })
        );
        assert!(t.update_progress(&state(3, 50, 50, 90), None).is_empty());
        assert_eq!(t.unlocked_count(), 1);
    }

    fn recovery() -> AchievementDefinition {
        def(
            "phoenix",
            Criterion::Recovery {
                from_threshold: 20,
                to_threshold: 60,
                duration: 3,
            },
        )
    }

    #[test]
    fn recovery_within_window_unlocks() {
        let mut t = tracker(vec![recovery()]);
        assert!(t.update_progress(&state(1, 50, 50, 50), None).is_empty());
        assert!(t.update_progress(&state(2, 15, 70, 70), None).is_empty());
        assert!(t.update_progress(&state(3, 40, 70, 70), None).is_empty());
        assert_eq!(t.update_progress(&state(4, 65, 70, 70), None).len(), 1);
    }

    #[test]
    fn recovery_outside_window_never_unlocks() {
        let mut t = tracker(vec![recovery()]);
        t.update_progress(&state(2, 15, 70, 70), None);
        t.update_progress(&state(3, 30, 70, 70), None);
        t.update_progress(&state(4, 40, 70, 70), None);
        t.update_progress(&state(5, 50, 70, 70), None);
        assert!(t.update_progress(&state(6, 65, 70, 70), None).is_empty());
        assert!(t.update_progress(&state(7, 70, 70, 70), None).is_empty());
        assert_eq!(t.unlocked_count(), 0);
    }

    #[test]
    fn second_dip_keeps_original_crisis_start() {
        let mut t = tracker(vec![recovery()]);
        t.update_progress(&state(2, 15, 70, 70), None);
        t.update_progress(&state(4, 10, 70, 70), None);
        assert_eq!(
            t.progress_of(&AchievementId::from("phoenix")),
            Some(&AchievementProgress::Recovery {
                in_crisis: true,
                crisis_start_turn: Some(2),
                recovered: false,
            })
        );
        // Turn 6 is four turns after the original start.
        assert!(t.update_progress(&state(6, 65, 70, 70), None).is_empty());
    }

    #[test]
    fn decision_count_ignores_other_categories() {
        let mut t = tracker(vec![def(
            "green",
            Criterion::DecisionCount {
                categories: BTreeSet::from([DecisionCategory::Environmental]),
                count: 3,
            },
        )]);
        let id = AchievementId::from("green");

        for turn in 2..5 {
            t.update_progress(&state(turn, 50, 50, 50), Some(&taken(DecisionCategory::Economic)));
        }
        assert_eq!(t.progress_percentages().get(&id), Some(&0));
        assert_eq!(t.decision_history().len(), 3);

        t.update_progress(&state(5, 50, 50, 50), Some(&taken(DecisionCategory::Environmental)));
        assert_eq!(t.progress_percentages().get(&id), Some(&33));
        t.update_progress(&state(6, 50, 50, 50), Some(&taken(DecisionCategory::Environmental)));
        let newly =
            t.update_progress(&state(7, 50, 50, 50), Some(&taken(DecisionCategory::Environmental)));
        assert_eq!(newly.len(), 1);
        assert_eq!(t.progress_percentages().get(&id), Some(&100));
    }

    #[test]
    fn early_achievement_respects_turn_limit() {
        let early = || {
            def(
                "early",
                Criterion::EarlyAchievement {
                    threshold: 80,
                    by_turn: 5,
                },
            )
        };
        let mut late = tracker(vec![early()]);
        assert!(late.update_progress(&state(6, 90, 50, 50), None).is_empty());

        let mut on_time = tracker(vec![early()]);
        assert_eq!(on_time.update_progress(&state(5, 50, 80, 50), None).len(), 1);
    }

    #[test]
    fn final_criteria_wait_for_ended_game() {
        let mut t = tracker(vec![
            def(
                "balance",
                Criterion::FinalBalance {
                    min_threshold: 80,
                    max_threshold: 90,
                },
            ),
            def(
                "green_finish",
                Criterion::FinalStat {
                    stat: Stat::Environment,
                    threshold: 90,
                },
            ),
        ]);

        let mut s = state(15, 85, 85, 85);
        assert!(t.update_progress(&s, None).is_empty());

        s.game_status = GameStatus::Ended;
        let newly = t.finalize(&s);
        let ids: Vec<&str> = newly.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["balance"]);
        // finalize does not record history.
        assert_eq!(t.stat_history().len(), 1);
    }

    #[test]
    fn finalize_skips_non_final_criteria() {
        let mut t = tracker(vec![def(
            "rich",
            Criterion::StatThreshold {
                stat: Stat::Economy,
                threshold: 60,
            },
        )]);
        let mut s = state(15, 50, 90, 50);
        s.game_status = GameStatus::Ended;
        assert!(t.finalize(&s).is_empty());
        assert!(!t.is_unlocked(&AchievementId::from("rich")));
    }

    #[test]
    fn unsupported_criterion_never_unlocks() {
        let mut t = tracker(vec![def("mystery", Criterion::Unsupported)]);
        let mut s = state(3, 100, 100, 100);
        assert!(t.update_progress(&s, None).is_empty());
        s.game_status = GameStatus::Ended;
        assert!(t.finalize(&s).is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut t = tracker(vec![def("balanced", Criterion::AllStatsThreshold { threshold: 70 })]);
        t.update_progress(&state(2, 75, 75, 75), Some(&taken(DecisionCategory::Social)));
        assert_eq!(t.unlocked_count(), 1);

        t.reset();
        assert!(t.unlocked().is_empty());
        assert!(t.stat_history().is_empty());
        assert!(t.decision_history().is_empty());
        assert_eq!(
            t.progress_percentages().get(&AchievementId::from("balanced")),
            Some(&0)
        );
    }

    #[test]
    fn summary_text_follows_progress() {
        let mut t = tracker(vec![
            def(
                "cheer",
                Criterion::ConsecutiveStatThreshold {
                    stat: Stat::Happiness,
                    threshold: 80,
                    duration: 5,
                },
            ),
            recovery(),
            def("balanced", Criterion::AllStatsThreshold { threshold: 70 }),
        ]);
        t.update_progress(&state(2, 15, 50, 85), None);

        let summary = t.progress_summary();
        let texts: Vec<&str> = summary.iter().map(|s| s.progress_text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "1/5 consecutive turns",
                "In crisis - work on recovery!",
                "In progress..."
            ]
        );
        assert_eq!(
            t.progress_percentages().get(&AchievementId::from("phoenix")),
            Some(&50)
        );
    }
}
