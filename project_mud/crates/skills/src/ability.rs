use serde::Deserialize;

use crate::error::CatalogError;
use crate::formula::Formula;

pub type AbilityId = u32;

/// Who an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targeting {
    SelfOnly,
    SingleHostile,
    AreaHostile,
    Ally,
}

impl Targeting {
    pub fn parse(mode: &str) -> Option<Targeting> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "self" | "" => Some(Targeting::SelfOnly),
            "hostile_single" => Some(Targeting::SingleHostile),
            "hostile_area" => Some(Targeting::AreaHostile),
            "ally_single" => Some(Targeting::Ally),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Targeting::SelfOnly => "self",
            Targeting::SingleHostile => "hostile_single",
            Targeting::AreaHostile => "hostile_area",
            Targeting::Ally => "ally_single",
        }
    }

    pub fn is_hostile(self) -> bool {
        matches!(self, Targeting::SingleHostile | Targeting::AreaHostile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Damage { formula: Formula, damage_type: String },
    Healing { formula: Formula },
    /// Message only.
    Utility,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AbilityMessages {
    /// Shown to the user. May contain `$actor`, `$target`, `$spell`.
    pub cast: String,
    /// Shown to the rest of the room; falls back to `cast`.
    pub cast_room: String,
    pub hit: String,
    pub miss: String,
}

impl AbilityMessages {
    pub fn render_cast(&self, actor: &str, target: &str, spell: &str) -> String {
        substitute(&self.cast, actor, target, spell)
    }

    pub fn render_room(&self, actor: &str, target: &str, spell: &str) -> String {
        let template = if self.cast_room.is_empty() {
            &self.cast
        } else {
            &self.cast_room
        };
        substitute(template, actor, target, spell)
    }
}

fn substitute(template: &str, actor: &str, target: &str, spell: &str) -> String {
    template
        .replace("$actor", actor)
        .replace("$target", target)
        .replace("$spell", spell)
}

/// Immutable catalog entry for a spell or maneuver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub description: String,
    pub mana_cost: i32,
    pub cooldown_secs: u64,
    pub level_required: i32,
    pub targeting: Targeting,
    pub range: i32,
    pub effect: Effect,
    pub save: Option<(String, i32)>,
    pub messages: AbilityMessages,
}

impl Ability {
    /// Maneuvers occupy the 2000..3000 id block.
    pub fn is_maneuver(&self) -> bool {
        (2000..3000).contains(&self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TargetingRecord {
    mode: String,
    range: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EffectsRecord {
    damage: String,
    damage_type: String,
    save_type: String,
    save_dc: i32,
    healing: String,
}

/// On-disk shape of one ability.
#[derive(Debug, Deserialize)]
pub(crate) struct AbilityRecord {
    id: AbilityId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    mana_cost: i32,
    #[serde(default)]
    cooldown_seconds: u64,
    #[serde(default)]
    level_required: i32,
    #[serde(default)]
    targeting: TargetingRecord,
    #[serde(default)]
    effects: EffectsRecord,
    #[serde(default)]
    messages: AbilityMessages,
}

impl TryFrom<AbilityRecord> for Ability {
    type Error = CatalogError;

    fn try_from(rec: AbilityRecord) -> Result<Self, Self::Error> {
        let targeting =
            Targeting::parse(&rec.targeting.mode).ok_or_else(|| CatalogError::UnknownTargeting {
                ability: rec.name.clone(),
                mode: rec.targeting.mode.clone(),
            })?;

        let parse = |text: &str| -> Result<Formula, CatalogError> {
            text.parse().map_err(|source| CatalogError::InvalidFormula {
                ability: rec.name.clone(),
                source,
            })
        };

        let damage = rec.effects.damage.trim();
        let healing = rec.effects.healing.trim();
        let effect = if !damage.is_empty() && damage != "0" {
            Effect::Damage {
                formula: parse(damage)?,
                damage_type: rec.effects.damage_type.clone(),
            }
        } else if !healing.is_empty() && healing != "0" {
            Effect::Healing {
                formula: parse(healing)?,
            }
        } else {
            Effect::Utility
        };

        let save_type = rec.effects.save_type.trim();
        let save = if save_type.is_empty() || save_type.eq_ignore_ascii_case("none") {
            None
        } else {
            Some((save_type.to_string(), rec.effects.save_dc))
        };

        Ok(Ability {
            id: rec.id,
            name: rec.name,
            description: rec.description,
            mana_cost: rec.mana_cost.max(0),
            cooldown_secs: rec.cooldown_seconds,
            level_required: rec.level_required,
            targeting,
            range: rec.targeting.range,
            effect,
            save,
            messages: rec.messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> AbilityRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn damage_record_converts() {
        let ability = Ability::try_from(record(
            r#"{"id": 1001, "name": "Arcane Bolt", "mana_cost": 10, "cooldown_seconds": 3,
                "targeting": {"mode": "hostile_single", "range": 3},
                "effects": {"damage": "1d6 + I/2", "damage_type": "magic", "save_type": "none"},
                "messages": {"cast": "You hurl a bolt at $target."}}"#,
        ))
        .unwrap();
        assert_eq!(ability.targeting, Targeting::SingleHostile);
        assert!(matches!(ability.effect, Effect::Damage { .. }));
        assert_eq!(ability.save, None);
        assert!(!ability.is_maneuver());
    }

    #[test]
    fn healing_and_utility_records() {
        let heal = Ability::try_from(record(
            r#"{"id": 1003, "name": "Mend", "targeting": {"mode": "ally_single"},
                "effects": {"damage": "0", "healing": "2d4 + W/2"}}"#,
        ))
        .unwrap();
        assert!(matches!(heal.effect, Effect::Healing { .. }));

        let stance = Ability::try_from(record(
            r#"{"id": 2003, "name": "Defensive Stance", "targeting": {"mode": "self"}}"#,
        ))
        .unwrap();
        assert_eq!(stance.effect, Effect::Utility);
        assert!(stance.is_maneuver());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = Ability::try_from(record(
            r#"{"id": 5, "name": "Odd", "targeting": {"mode": "sideways"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTargeting { .. }));
    }

    #[test]
    fn messages_substitute_tokens() {
        let msgs = AbilityMessages {
            cast: "You cast $spell at $target.".into(),
            cast_room: String::new(),
            ..Default::default()
        };
        assert_eq!(
            msgs.render_cast("Ayla", "a rat", "Arcane Bolt"),
            "You cast Arcane Bolt at a rat."
        );
        assert_eq!(
            msgs.render_room("Ayla", "a rat", "Arcane Bolt"),
            "You cast Arcane Bolt at a rat."
        );
    }
}
