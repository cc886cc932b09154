//! Decision content loading and the immutable decision catalog.
//!
//! Decision content is a static list of `{question, choices}` records. The
//! [`DecisionSource`] trait abstracts where those records come from: the
//! deck embedded in the binary, a JSON file named in the configuration, or
//! a test fixture. [`DecisionCatalog`] turns raw records into [`Decision`]
//! values, deriving stable ids, a keyword category, and feedback text from
//! the impact sign pattern.

use std::path::PathBuf;

use civic_types::{Choice, ChoiceId, Decision, DecisionCategory, DecisionId, StatImpact};
use serde::Deserialize;

use crate::error::GameError;

/// The decision deck compiled into the binary.
const EMBEDDED_DECISIONS: &str = include_str!("../data/decisions.json");

/// Top-level shape of a decision content file.
#[derive(Debug, Clone, Deserialize)]
struct RawDeck {
    decisions: Vec<RawDecision>,
}

/// A decision as authored in content files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawDecision {
    /// Question shown to the player.
    pub question: String,
    /// Available answers.
    #[serde(default)]
    pub choices: Vec<RawChoice>,
}

/// A choice as authored in content files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawChoice {
    /// Answer text.
    pub text: String,
    /// Stat impact. Missing components are 0.
    #[serde(default)]
    pub impact: StatImpact,
}

/// A source of raw decision content, read once at startup.
pub trait DecisionSource {
    /// Load every raw decision record, in authoring order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if the content cannot be read or parsed.
    fn load(&self) -> Result<Vec<RawDecision>, GameError>;
}

/// The deck embedded in the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDecisionSource;

impl DecisionSource for EmbeddedDecisionSource {
    fn load(&self) -> Result<Vec<RawDecision>, GameError> {
        parse_deck(EMBEDDED_DECISIONS)
    }
}

/// A JSON content file on disk.
#[derive(Debug, Clone)]
pub struct FileDecisionSource {
    path: PathBuf,
}

impl FileDecisionSource {
    /// Read decisions from the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DecisionSource for FileDecisionSource {
    fn load(&self) -> Result<Vec<RawDecision>, GameError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            GameError::Content(format!("failed to read {}: {e}", self.path.display()))
        })?;
        parse_deck(&contents)
    }
}

fn parse_deck(json: &str) -> Result<Vec<RawDecision>, GameError> {
    let deck: RawDeck = serde_json::from_str(json)
        .map_err(|e| GameError::Content(format!("malformed decision JSON: {e}")))?;
    Ok(deck.decisions)
}

/// The immutable set of decisions available to a session.
#[derive(Debug, Clone)]
pub struct DecisionCatalog {
    decisions: Vec<Decision>,
}

impl DecisionCatalog {
    /// Build the catalog from the embedded deck.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if the embedded deck is malformed.
    pub fn builtin() -> Result<Self, GameError> {
        Self::from_source(&EmbeddedDecisionSource)
    }

    /// Build the catalog from any [`DecisionSource`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if the source fails or its content is
    /// unusable.
    pub fn from_source(source: &dyn DecisionSource) -> Result<Self, GameError> {
        Self::from_raw(source.load()?)
    }

    /// Build the catalog from a JSON document `{"decisions": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if the JSON is malformed or a decision
    /// has fewer than two choices.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        Self::from_raw(parse_deck(json)?)
    }

    /// Build the catalog from raw records, deriving ids, categories and
    /// feedback. Ids are 1-based: `decision_{n}` and `choice_{n}_{m}`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if there are no decisions or a
    /// decision has fewer than two choices.
    pub fn from_raw(raw: Vec<RawDecision>) -> Result<Self, GameError> {
        if raw.is_empty() {
            return Err(GameError::Content(String::from("decision deck is empty")));
        }

        let mut decisions = Vec::with_capacity(raw.len());
        for (n, record) in (1_usize..).zip(raw) {
            if record.choices.len() < 2 {
                return Err(GameError::Content(format!(
                    "decision {n} (\"{}\") needs at least two choices, found {}",
                    record.question,
                    record.choices.len()
                )));
            }

            let choices = (1_usize..)
                .zip(record.choices)
                .map(|(m, choice)| Choice {
                    id: ChoiceId(format!("choice_{n}_{m}")),
                    feedback: feedback_for(&choice.impact),
                    text: choice.text,
                    impact: choice.impact,
                })
                .collect();

            decisions.push(Decision {
                id: DecisionId(format!("decision_{n}")),
                title: record.question.clone(),
                category: categorize(&record.question),
                description: record.question,
                choices,
            });
        }

        tracing::debug!(decisions = decisions.len(), "decision catalog built");
        Ok(Self { decisions })
    }

    /// Look up a decision by key.
    pub fn get(&self, id: &DecisionId) -> Option<&Decision> {
        self.decisions.iter().find(|d| &d.id == id)
    }

    /// All decisions in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter()
    }

    /// Number of decisions.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Whether the catalog holds no decisions. Never true for a catalog
    /// built through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Assign a category from keywords in the question text.
///
/// Rules are tried in order and the first match wins.
pub fn categorize(question: &str) -> DecisionCategory {
    let lower = question.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["park", "recycling", "green"]) {
        DecisionCategory::Environmental
    } else if has(&["factory", "economic"]) {
        DecisionCategory::Economic
    } else if has(&["transport", "infrastructure"]) {
        DecisionCategory::Infrastructure
    } else {
        DecisionCategory::Social
    }
}

/// Synthesize feedback text from the sign of each impact component.
pub fn feedback_for(impact: &StatImpact) -> String {
    let mut effects = Vec::new();
    match impact.environment.signum() {
        1 => effects.push("improved environmental health"),
        -1 => effects.push("environmental concerns"),
        _ => {}
    }
    match impact.economy.signum() {
        1 => effects.push("economic growth"),
        -1 => effects.push("economic strain"),
        _ => {}
    }
    match impact.happiness.signum() {
        1 => effects.push("increased citizen satisfaction"),
        -1 => effects.push("decreased citizen satisfaction"),
        _ => {}
    }

    if effects.is_empty() {
        String::from("This choice had minimal impact.")
    } else {
        format!("This choice resulted in {}.", effects.join(", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SMALL_DECK: &str = r#"{
        "decisions": [
            {
                "question": "Should we open a new park downtown?",
                "choices": [
                    { "text": "Yes, build the park",
                      "impact": { "environment": 10, "economy": -5 } },
                    { "text": "No", "impact": {} }
                ]
            },
            {
                "question": "A factory wants tax breaks.",
                "choices": [
                    { "text": "Grant them",
                      "impact": { "economy": 8, "environment": -6, "happiness": 2 } },
                    { "text": "Refuse", "impact": { "economy": -4 } }
                ]
            }
        ]
    }"#;

    #[test]
    fn ids_are_one_based_and_positional() {
        let catalog = DecisionCatalog::from_json(SMALL_DECK);
        assert!(catalog.is_ok());
        let Ok(catalog) = catalog else { return };

        assert_eq!(catalog.len(), 2);
        let first = catalog.get(&DecisionId::from("decision_1"));
        assert!(first.is_some());
        let Some(first) = first else { return };
        let ids: Vec<&str> = first.choices.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["choice_1_1", "choice_1_2"]);
        assert_eq!(first.title, first.description);
    }

    #[test]
    fn missing_impact_components_default_to_zero() {
        let catalog = DecisionCatalog::from_json(SMALL_DECK).unwrap();
        let decision = catalog.get(&DecisionId::from("decision_1"));
        let choice = decision.and_then(|d| d.choice(&ChoiceId::from("choice_1_2")));
        assert!(choice.is_some_and(|c| c.impact.is_neutral()));
        assert!(choice.is_some_and(|c| c.feedback == "This choice had minimal impact."));
    }

    #[test]
    fn categories_follow_keywords() {
        assert_eq!(categorize("Expand the PARK system?"), DecisionCategory::Environmental);
        assert_eq!(categorize("Fund a recycling drive"), DecisionCategory::Environmental);
        assert_eq!(categorize("Open a factory"), DecisionCategory::Economic);
        assert_eq!(categorize("Economic stimulus?"), DecisionCategory::Economic);
        assert_eq!(categorize("Improve public transport"), DecisionCategory::Infrastructure);
        assert_eq!(categorize("Hire more teachers"), DecisionCategory::Social);
        // First rule wins when several keywords appear.
        assert_eq!(
            categorize("Turn the old factory into a park"),
            DecisionCategory::Environmental
        );
    }

    #[test]
    fn feedback_lists_effects_in_stat_order() {
        let impact = StatImpact {
            environment: -6,
            economy: 8,
            happiness: 2,
        };
        assert_eq!(
            feedback_for(&impact),
            "This choice resulted in environmental concerns, economic growth, \
             increased citizen satisfaction."
        );
    }

    #[test]
    fn decision_without_choices_is_rejected() {
        let json = r#"{"decisions": [{"question": "Empty?", "choices": []}]}"#;
        let result = DecisionCatalog::from_json(json);
        assert!(matches!(result, Err(GameError::Content(_))));
    }

    #[test]
    fn decision_with_one_choice_is_rejected() {
        let json = r#"{"decisions": [
            {"question": "Two ways?", "choices": [{"text": "A"}, {"text": "B"}]},
            {"question": "Only one way?", "choices": [{"text": "Take it"}]}
        ]}"#;
        let result = DecisionCatalog::from_json(json);
        assert!(matches!(
            result,
            Err(GameError::Content(msg)) if msg.contains("decision 2") && msg.contains("found 1")
        ));
    }

    #[test]
    fn empty_deck_is_rejected() {
        let result = DecisionCatalog::from_json(r#"{"decisions": []}"#);
        assert!(matches!(result, Err(GameError::Content(_))));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = DecisionCatalog::from_json("{not json");
        assert!(matches!(result, Err(GameError::Content(_))));
    }

    #[test]
    fn missing_file_is_a_content_error() {
        let source = FileDecisionSource::new("/nonexistent/decisions.json");
        let result = DecisionCatalog::from_source(&source);
        assert!(matches!(result, Err(GameError::Content(_))));
    }

    #[test]
    fn builtin_deck_is_well_formed() {
        let catalog = DecisionCatalog::builtin();
        assert!(catalog.is_ok());
        let Ok(catalog) = catalog else { return };
        assert!(catalog.len() >= 15);
        assert!(catalog.iter().all(|d| d.choices.len() >= 2));
        assert!(
            catalog
                .iter()
                .any(|d| d.category == DecisionCategory::Environmental)
        );
    }
}
