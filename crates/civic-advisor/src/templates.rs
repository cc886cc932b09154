//! Message templates rendered with `minijinja`.
//!
//! One template per advisor personality plus a hint template for
//! decision-specific advice. The built-in set is compiled into the binary;
//! [`TemplateEngine::from_dir`] loads replacements from disk so the copy can
//! be tuned without recompiling.

use std::path::Path;

use civic_types::AdvisorPersonality;
use minijinja::Environment;
use serde::Serialize;

use crate::error::AdvisorError;

const PERSONALITIES: [AdvisorPersonality; 4] = [
    AdvisorPersonality::Optimistic,
    AdvisorPersonality::Encouraging,
    AdvisorPersonality::Concerned,
    AdvisorPersonality::Sarcastic,
];

const HINT: &str = "hint";

/// Values a personality template may read.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext<'a> {
    /// Name of the focus stat.
    pub priority: &'a str,
    /// Current value of the focus stat.
    pub level: u8,
    /// Current turn. Selects among interchangeable lines.
    pub turn: u32,
}

/// Values the hint template may read.
#[derive(Debug, Clone, Serialize)]
pub struct HintContext<'a> {
    /// Decision question.
    pub question: &'a str,
    /// Text of the recommended choice.
    pub choice: &'a str,
    /// Name of the focus stat.
    pub priority: &'a str,
    /// Signed change, e.g. `+15`.
    pub delta: String,
}

/// Loaded advisor templates.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Engine with the templates compiled into the crate.
    pub fn builtin() -> Result<Self, AdvisorError> {
        let mut env = Environment::new();
        let sources = [
            ("optimistic", include_str!("../templates/optimistic.j2")),
            ("encouraging", include_str!("../templates/encouraging.j2")),
            ("concerned", include_str!("../templates/concerned.j2")),
            ("sarcastic", include_str!("../templates/sarcastic.j2")),
            (HINT, include_str!("../templates/hint.j2")),
        ];
        for (name, source) in sources {
            env.add_template(name, source).map_err(|e| {
                AdvisorError::Template(format!("failed to add {name} template: {e}"))
            })?;
        }
        Ok(Self { env })
    }

    /// Engine loading `<name>.j2` files from `dir`.
    ///
    /// The directory must contain `optimistic.j2`, `encouraging.j2`,
    /// `concerned.j2`, `sarcastic.j2` and `hint.j2`.
    pub fn from_dir(dir: &Path) -> Result<Self, AdvisorError> {
        let mut env = Environment::new();
        let names = PERSONALITIES.iter().map(|p| p.name()).chain([HINT]);
        for name in names {
            let source = load_template(dir, name)?;
            env.add_template_owned(name, source).map_err(|e| {
                AdvisorError::Template(format!("failed to add {name} template: {e}"))
            })?;
        }
        Ok(Self { env })
    }

    /// Render the base message for a personality.
    pub fn message(
        &self,
        personality: AdvisorPersonality,
        ctx: &MessageContext<'_>,
    ) -> Result<String, AdvisorError> {
        self.render(personality.name(), ctx)
    }

    /// Render a decision hint.
    pub fn hint(&self, ctx: &HintContext<'_>) -> Result<String, AdvisorError> {
        self.render(HINT, ctx)
    }

    fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String, AdvisorError> {
        let text = self
            .env
            .get_template(name)
            .map_err(|e| AdvisorError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| AdvisorError::Template(format!("{name} render failed: {e}")))?;
        Ok(text.trim().to_owned())
    }
}

fn load_template(dir: &Path, name: &str) -> Result<String, AdvisorError> {
    let path = dir.join(format!("{name}.j2"));
    std::fs::read_to_string(&path)
        .map_err(|e| AdvisorError::Template(format!("failed to read {}: {e}", path.display())))
}
