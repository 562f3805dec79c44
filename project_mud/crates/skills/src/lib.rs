pub mod ability;
pub mod catalog;
pub mod error;
pub mod formula;
pub mod progress;
pub mod stat;

pub use ability::{Ability, AbilityId, AbilityMessages, Effect, Targeting};
pub use catalog::{AbilityCatalog, PartialMatch};
pub use error::{CatalogError, FormulaError, SkillError};
pub use formula::{Dice, Formula};
pub use progress::{
    proficiency_bonus, unix_now, use_ability, SkillBook, SkillProgress, MAX_PROFICIENCY,
    PROFICIENCY_GAIN,
};
pub use stat::{Attributes, Stat};
