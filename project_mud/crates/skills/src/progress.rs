use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityId};
use crate::error::SkillError;

pub const MAX_PROFICIENCY: u8 = 100;
pub const PROFICIENCY_GAIN: u8 = 1;

/// Seconds since the Unix epoch. A clock set before 1970 reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Flat damage bonus granted by practice.
pub fn proficiency_bonus(proficiency: u8) -> i32 {
    i32::from(proficiency / 20)
}

/// One character's standing with one ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub ability_id: AbilityId,
    pub proficiency: u8,
    pub learned: bool,
    #[serde(default)]
    pub uses: u32,
    /// Unix seconds of the last successful use.
    #[serde(default)]
    pub last_used: Option<u64>,
}

impl SkillProgress {
    pub fn learned(ability_id: AbilityId, proficiency: u8) -> Self {
        Self {
            ability_id,
            proficiency: proficiency.min(MAX_PROFICIENCY),
            learned: true,
            uses: 0,
            last_used: None,
        }
    }

    pub fn cooldown_remaining(&self, ability: &Ability, now: u64) -> u64 {
        match self.last_used {
            None => 0,
            Some(last) => ability
                .cooldown_secs
                .saturating_sub(now.saturating_sub(last)),
        }
    }

    /// Mana is checked before cooldown.
    pub fn can_use(&self, ability: &Ability, mana: i32, now: u64) -> Result<(), SkillError> {
        if mana < ability.mana_cost {
            return Err(SkillError::InsufficientMana {
                need: ability.mana_cost,
                have: mana,
            });
        }
        let remaining = self.cooldown_remaining(ability, now);
        if remaining > 0 {
            return Err(SkillError::OnCooldown {
                remaining_secs: remaining,
            });
        }
        Ok(())
    }

    pub fn record_use(&mut self, now: u64) {
        self.last_used = Some(now);
        self.proficiency = self
            .proficiency
            .saturating_add(PROFICIENCY_GAIN)
            .min(MAX_PROFICIENCY);
        self.uses = self.uses.saturating_add(1);
    }
}

/// Check, pay for and record one use. Nothing changes on error.
pub fn use_ability(
    progress: &mut SkillProgress,
    ability: &Ability,
    mana: &mut i32,
    now: u64,
) -> Result<(), SkillError> {
    progress.can_use(ability, *mana, now)?;
    *mana -= ability.mana_cost;
    progress.record_use(now);
    Ok(())
}

/// Every ability a character knows, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillBook(BTreeMap<AbilityId, SkillProgress>);

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and leaves the entry alone if the ability is already known.
    pub fn learn(&mut self, ability_id: AbilityId, proficiency: u8) -> bool {
        if self.knows(ability_id) {
            return false;
        }
        self.0
            .insert(ability_id, SkillProgress::learned(ability_id, proficiency));
        true
    }

    pub fn knows(&self, ability_id: AbilityId) -> bool {
        self.0.get(&ability_id).is_some_and(|p| p.learned)
    }

    pub fn get(&self, ability_id: AbilityId) -> Option<&SkillProgress> {
        self.0.get(&ability_id)
    }

    pub fn get_mut(&mut self, ability_id: AbilityId) -> Option<&mut SkillProgress> {
        self.0.get_mut(&ability_id)
    }

    /// Learned entries in id order.
    pub fn learned(&self) -> impl Iterator<Item = &SkillProgress> {
        self.0.values().filter(|p| p.learned)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AbilityCatalog;

    fn bolt() -> Ability {
        AbilityCatalog::builtin().unwrap().get(1001).unwrap().clone()
    }

    #[test]
    fn fresh_skill_is_ready() {
        let p = SkillProgress::learned(1001, 50);
        assert_eq!(p.cooldown_remaining(&bolt(), 0), 0);
        assert!(p.can_use(&bolt(), 100, 0).is_ok());
    }

    #[test]
    fn mana_checked_before_cooldown() {
        let mut p = SkillProgress::learned(1001, 50);
        p.record_use(1000);
        assert_eq!(
            p.can_use(&bolt(), 3, 1001),
            Err(SkillError::InsufficientMana { need: 10, have: 3 })
        );
        assert_eq!(
            p.can_use(&bolt(), 50, 1001),
            Err(SkillError::OnCooldown { remaining_secs: 2 })
        );
        assert!(p.can_use(&bolt(), 50, 1003).is_ok());
    }

    #[test]
    fn cooldown_holds_at_the_instant_of_use_and_clears_on_expiry() {
        let mut p = SkillProgress::learned(1001, 50);
        p.record_use(1000);
        assert_eq!(
            p.can_use(&bolt(), 50, 1000),
            Err(SkillError::OnCooldown { remaining_secs: 3 })
        );
        assert!(p.can_use(&bolt(), 50, 1003).is_ok());
        assert!(p.can_use(&bolt(), 50, 5000).is_ok());
    }

    #[test]
    fn uses_below_the_cap_add_one_proficiency_each() {
        let mut p = SkillProgress::learned(1001, 30);
        let mut mana = 1000;
        for n in 0..20u64 {
            use_ability(&mut p, &bolt(), &mut mana, 100 + n * 3).unwrap();
        }
        assert_eq!(p.proficiency, 30 + 20 * PROFICIENCY_GAIN);
        assert_eq!(p.uses, 20);
        assert_eq!(mana, 1000 - 20 * 10);
        assert_eq!(p.last_used, Some(100 + 19 * 3));
    }

    #[test]
    fn clock_going_backwards_keeps_full_cooldown() {
        let mut p = SkillProgress::learned(1001, 50);
        p.record_use(1000);
        assert_eq!(p.cooldown_remaining(&bolt(), 900), 3);
    }

    #[test]
    fn use_deducts_mana_and_gains_proficiency() {
        let mut p = SkillProgress::learned(1001, 99);
        let mut mana = 25;
        use_ability(&mut p, &bolt(), &mut mana, 10).unwrap();
        assert_eq!(mana, 15);
        assert_eq!(p.proficiency, 100);
        assert_eq!(p.uses, 1);

        use_ability(&mut p, &bolt(), &mut mana, 20).unwrap();
        assert_eq!(p.proficiency, MAX_PROFICIENCY);
        assert_eq!(p.uses, 2);
    }

    #[test]
    fn failed_use_changes_nothing() {
        let mut p = SkillProgress::learned(1001, 40);
        let mut mana = 5;
        let before = p.clone();
        assert!(use_ability(&mut p, &bolt(), &mut mana, 10).is_err());
        assert_eq!(mana, 5);
        assert_eq!(p, before);
    }

    #[test]
    fn bonus_scales_with_proficiency() {
        assert_eq!(proficiency_bonus(0), 0);
        assert_eq!(proficiency_bonus(19), 0);
        assert_eq!(proficiency_bonus(50), 2);
        assert_eq!(proficiency_bonus(100), 5);
    }

    #[test]
    fn learning_twice_is_a_no_op() {
        let mut book = SkillBook::new();
        assert!(book.learn(1001, 50));
        book.get_mut(1001).unwrap().record_use(5);
        assert!(!book.learn(1001, 10));
        assert_eq!(book.get(1001).unwrap().proficiency, 51);
        assert!(book.knows(1001));
        assert!(!book.knows(2001));
    }

    #[test]
    fn book_serializes_as_map() {
        let mut book = SkillBook::new();
        book.learn(2001, 5);
        book.learn(1001, 20);
        let json = serde_json::to_string(&book).unwrap();
        let back: SkillBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
        let ids: Vec<_> = back.learned().map(|p| p.ability_id).collect();
        assert_eq!(ids, vec![1001, 2001]);
    }
}
