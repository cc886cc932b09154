//! Ending classification.
//!
//! Runs after every turn on the post-increment state. The first matching
//! rule wins: collapse, then revolt, then turn-limit scoring through the
//! configured tier table.

use civic_types::{EndingKind, GameState};

use crate::config::{EndingConfig, EndingText};

/// A classified game ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ending {
    /// Victory or failure.
    pub kind: EndingKind,
    /// Headline.
    pub title: String,
    /// Body with placeholders filled in.
    pub description: String,
}

/// Classify the state, or `None` while the game continues.
///
/// `achievements` is the number of achievements unlocked so far.
pub fn classify(state: &GameState, achievements: usize, config: &EndingConfig) -> Option<Ending> {
    let stats = state.stats;
    let average = stats.average();

    if stats.environment <= config.collapse_threshold && stats.economy <= config.collapse_threshold
    {
        return Some(render(&config.collapse, average, achievements));
    }

    if stats.happiness <= config.revolt_threshold {
        return Some(render(&config.revolt, average, achievements));
    }

    if state.turn < state.max_turns {
        return None;
    }

    let ending = config
        .tiers
        .iter()
        .find(|tier| average >= tier.min_average && achievements >= tier.min_achievements)
        .map_or_else(
            || render(&config.fallback, average, achievements),
            |tier| Ending {
                kind: tier.kind,
                title: tier.title.clone(),
                description: fill(&tier.description, average, achievements),
            },
        );
    Some(ending)
}

fn render(text: &EndingText, average: f64, achievements: usize) -> Ending {
    Ending {
        kind: text.kind,
        title: text.title.clone(),
        description: fill(&text.description, average, achievements),
    }
}

fn fill(template: &str, average: f64, achievements: usize) -> String {
    template
        .replace("{average}", &format!("{average:.1}"))
        .replace("{achievements}", &achievements.to_string())
}
