//! Configuration loading and typed config structures for the Civic game.
//!
//! The canonical configuration lives in `civic-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads it. Every field has a default, so an
//! empty file (or no file at all) yields a playable game.

use std::path::Path;

use civic_types::{EndingKind, StatSet};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `civic-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Turn limit, starting stats, deck policy, seed.
    #[serde(default)]
    pub game: RulesConfig,

    /// Ending thresholds and tier table.
    #[serde(default)]
    pub endings: EndingConfig,

    /// Optional YAML file replacing the built-in achievement catalog.
    #[serde(default)]
    pub achievements_path: Option<String>,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Advisor settings.
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the advisor:
    /// - `ADVISOR_API_KEY` overrides `advisor.api_key`
    /// - `ADVISOR_REMOTE_URL` overrides `advisor.remote_url`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.advisor.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.advisor.apply_env_overrides();
        Ok(config)
    }
}

/// Core game rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Turn at which the game is scored.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Stats at session start. Out-of-range values are clamped.
    #[serde(default)]
    pub starting_stats: StatSet,

    /// Whether an exhausted deck is reshuffled instead of running dry.
    #[serde(default = "default_true")]
    pub recycle_decisions: bool,

    /// Random seed for reproducible sessions. Drawn by the caller when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Optional JSON decision content file. The embedded deck is used when absent.
    #[serde(default)]
    pub decisions_path: Option<String>,
}

impl RulesConfig {
    /// Starting stats with every component clamped into range.
    pub fn starting_stats(&self) -> StatSet {
        let s = self.starting_stats;
        StatSet::clamped(
            i32::from(s.environment),
            i32::from(s.economy),
            i32::from(s.happiness),
        )
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            starting_stats: StatSet::default(),
            recycle_decisions: true,
            seed: None,
            decisions_path: None,
        }
    }
}

/// Title, description, and classification of one ending.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndingText {
    /// Victory or failure.
    pub kind: EndingKind,
    /// Headline.
    pub title: String,
    /// Body. `{average}` and `{achievements}` are substituted.
    pub description: String,
}

/// One row of the turn-limit scoring table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndingTier {
    /// Minimum average stat.
    pub min_average: f64,
    /// Minimum number of unlocked achievements.
    #[serde(default)]
    pub min_achievements: usize,
    /// Victory or failure.
    pub kind: EndingKind,
    /// Headline.
    pub title: String,
    /// Body. `{average}` and `{achievements}` are substituted.
    pub description: String,
}

/// Ending thresholds.
///
/// Early-failure checks (collapse, revolt) run before turn-limit scoring.
/// Tiers are tried in order and the first match wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndingConfig {
    /// Environment and economy both at or below this value collapse the city.
    #[serde(default = "default_collapse_threshold")]
    pub collapse_threshold: u8,

    /// Happiness at or below this value triggers a revolt.
    #[serde(default = "default_revolt_threshold")]
    pub revolt_threshold: u8,

    /// Text of the collapse ending.
    #[serde(default = "default_collapse")]
    pub collapse: EndingText,

    /// Text of the revolt ending.
    #[serde(default = "default_revolt")]
    pub revolt: EndingText,

    /// Ordered scoring tiers applied at the turn limit.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<EndingTier>,

    /// Ending used when no tier matches.
    #[serde(default = "default_fallback")]
    pub fallback: EndingText,
}

impl Default for EndingConfig {
    fn default() -> Self {
        Self {
            collapse_threshold: default_collapse_threshold(),
            revolt_threshold: default_revolt_threshold(),
            collapse: default_collapse(),
            revolt: default_revolt(),
            tiers: default_tiers(),
            fallback: default_fallback(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Single origin allowed by CORS. Any origin when absent.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

/// Advisor settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvisorConfig {
    /// Endpoint of the remote advice service. Rule-based only when absent.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Bearer token for the remote service.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Budget for one remote call.
    #[serde(default = "default_advisor_timeout_ms")]
    pub timeout_ms: u64,
}

impl AdvisorConfig {
    /// Override advisor settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ADVISOR_API_KEY") {
            self.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("ADVISOR_REMOTE_URL") {
            self.remote_url = Some(val);
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            api_key: None,
            timeout_ms: default_advisor_timeout_ms(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_max_turns() -> u32 {
    15
}

const fn default_collapse_threshold() -> u8 {
    10
}

const fn default_revolt_threshold() -> u8 {
    10
}

fn default_collapse() -> EndingText {
    EndingText {
        kind: EndingKind::Failure,
        title: String::from("Economic and Environmental Collapse"),
        description: String::from(
            "Your city has fallen into complete disarray. Both the economy and environment \
             have collapsed, leaving citizens desperate and the city uninhabitable.",
        ),
    }
}

fn default_revolt() -> EndingText {
    EndingText {
        kind: EndingKind::Failure,
        title: String::from("Citizen Revolt"),
        description: String::from(
            "The people have risen up against your leadership. Despite your efforts, \
             citizen satisfaction has plummeted to dangerous levels.",
        ),
    }
}

fn default_tiers() -> Vec<EndingTier> {
    vec![
        EndingTier {
            min_average: 80.0,
            min_achievements: 5,
            kind: EndingKind::Victory,
            title: String::from("Legendary City Leader"),
            description: String::from(
                "Exceptional! You've created a truly sustainable city with an average score \
                 of {average} and unlocked {achievements} achievements. Your legacy will \
                 inspire generations of city planners.",
            ),
        },
        EndingTier {
            min_average: 80.0,
            min_achievements: 0,
            kind: EndingKind::Victory,
            title: String::from("Sustainable City Achievement"),
            description: String::from(
                "Excellent work! Your city achieved sustainability with an average score of \
                 {average}. The citizens live in harmony with nature and prosperity.",
            ),
        },
        EndingTier {
            min_average: 60.0,
            min_achievements: 3,
            kind: EndingKind::Victory,
            title: String::from("Accomplished Leader"),
            description: String::from(
                "Good progress! With an average score of {average} and {achievements} \
                 achievements, you've shown real leadership potential.",
            ),
        },
        EndingTier {
            min_average: 60.0,
            min_achievements: 0,
            kind: EndingKind::Victory,
            title: String::from("Decent Progress"),
            description: String::from(
                "Your city shows promise with an average score of {average}. With more \
                 experience, you could become a great leader.",
            ),
        },
    ]
}

fn default_fallback() -> EndingText {
    EndingText {
        kind: EndingKind::Failure,
        title: String::from("Mediocre Leadership"),
        description: String::from(
            "Your leadership resulted in an average score of {average}. The city survived, \
             but citizens expected more from their leader.",
        ),
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

const fn default_advisor_timeout_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.game.max_turns, 15);
        assert!(config.game.recycle_decisions);
        assert_eq!(config.game.starting_stats(), StatSet::default());
        assert_eq!(config.endings.tiers.len(), 4);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
game:
  max_turns: 10
  starting_stats:
    environment: 40
    economy: 60
    happiness: 55
  recycle_decisions: false
  seed: 99

endings:
  collapse_threshold: 5
  revolt_threshold: 15
  tiers:
    - min_average: 70.0
      kind: victory
      title: "Good"
      description: "Average {average}"

server:
  host: "127.0.0.1"
  port: 9090
  allowed_origin: "http://localhost:3000"

advisor:
  timeout_ms: 500

logging:
  level: "debug"
  format: json
"#;

        let config = GameConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.game.max_turns, 10);
        assert_eq!(config.game.starting_stats().economy, 60);
        assert!(!config.game.recycle_decisions);
        assert_eq!(config.game.seed, Some(99));
        assert_eq!(config.endings.collapse_threshold, 5);
        assert_eq!(config.endings.revolt_threshold, 15);
        assert_eq!(config.endings.tiers.len(), 1);
        // Sections not overridden keep their defaults.
        assert_eq!(config.endings.fallback.title, "Mediocre Leadership");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.server.allowed_origin.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.advisor.timeout_ms, 500);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "game:\n  seed: 7\n";
        let config = GameConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.game.seed, Some(7));
        assert_eq!(config.game.max_turns, 15);
        assert_eq!(config.endings.collapse_threshold, 10);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = GameConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn starting_stats_are_clamped() {
        let yaml = "game:\n  starting_stats:\n    environment: 180\n    economy: 50\n    \
                    happiness: 50\n";
        let config = GameConfig::parse(yaml).ok().unwrap_or_default();
        assert_eq!(config.game.starting_stats().environment, 100);
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let config = GameConfig::parse("game: [not, a, map]");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }
}
