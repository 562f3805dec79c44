use thiserror::Error;

/// Why an ability cannot be used right now. The display text is what the
/// player sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    #[error("Not enough mana (need {need}, have {have})")]
    InsufficientMana { need: i32, have: i32 },

    #[error("Skill on cooldown ({remaining_secs} seconds remaining)")]
    OnCooldown { remaining_secs: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,

    #[error("invalid dice term '{0}'")]
    InvalidDice(String),

    #[error("invalid term '{0}'")]
    InvalidTerm(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read ability file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ability JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate ability id {0}")]
    DuplicateId(u32),

    #[error("duplicate ability name '{0}'")]
    DuplicateName(String),

    #[error("ability {ability}: unknown targeting mode '{mode}'")]
    UnknownTargeting { ability: String, mode: String },

    #[error("ability {ability}: {source}")]
    InvalidFormula {
        ability: String,
        #[source]
        source: FormulaError,
    },
}
