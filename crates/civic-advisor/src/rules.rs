//! Rule-based judgement: tone, focus stat, and the best choice for it.

use civic_types::{AdvisorPersonality, Choice, Decision, Stat, StatSet};

/// Pick the advisor's tone from the average stat.
pub fn personality(stats: StatSet) -> AdvisorPersonality {
    let average = stats.average();
    if average >= 70.0 {
        AdvisorPersonality::Optimistic
    } else if average >= 50.0 {
        AdvisorPersonality::Encouraging
    } else if average >= 30.0 {
        AdvisorPersonality::Concerned
    } else {
        AdvisorPersonality::Sarcastic
    }
}

/// The lowest stat. Ties go to environment, then economy.
pub const fn priority(stats: StatSet) -> Stat {
    if stats.environment <= stats.economy && stats.environment <= stats.happiness {
        Stat::Environment
    } else if stats.economy <= stats.happiness {
        Stat::Economy
    } else {
        Stat::Happiness
    }
}

/// The choice that raises `stat` the most. The earliest choice wins ties.
pub fn best_choice(decision: &Decision, stat: Stat) -> Option<&Choice> {
    decision
        .choices
        .iter()
        .reduce(|best, c| if c.impact.get(stat) > best.impact.get(stat) { c } else { best })
}

/// Line used when a template cannot be rendered.
pub const fn fallback_line(personality: AdvisorPersonality) -> &'static str {
    match personality {
        AdvisorPersonality::Optimistic => {
            "Excellent work! Your city is thriving across all sectors!"
        }
        AdvisorPersonality::Encouraging => {
            "You're on the right track! Keep making thoughtful decisions!"
        }
        AdvisorPersonality::Concerned => "Things are slipping. Time for decisive action.",
        AdvisorPersonality::Sarcastic => {
            "I'd offer advice, but I'm not sure it would help at this point."
        }
    }
}
