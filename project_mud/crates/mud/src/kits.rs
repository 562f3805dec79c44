//! Starting packages offered to new characters.

use skills::AbilityId;

use crate::model::{EquipSlot, Object, Player};

/// Every new character learns this spell.
pub const STARTER_SPELL: AbilityId = 1001;
pub const STARTER_SPELL_PROFICIENCY: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitItem {
    Robes,
    Spellbook,
    LeatherArmor,
    Sword,
    SpellScroll,
}

impl KitItem {
    pub fn build(self) -> Object {
        let (item_type, short, keywords): (&str, &str, &[&str]) = match self {
            KitItem::Robes => ("armor", "a set of plain scholar's robes", &["robes", "robe"][..]),
            KitItem::Spellbook => ("book", "a worn leather spellbook", &["spellbook", "book"][..]),
            KitItem::LeatherArmor => ("armor", "a suit of leather armor", &["armor", "leather"][..]),
            KitItem::Sword => ("weapon", "a plain iron sword", &["sword", "iron"][..]),
            KitItem::SpellScroll => ("scroll", "a faded spell scroll", &["scroll", "spell"][..]),
        };
        let mut obj = Object::new(0, item_type, short);
        obj.keywords = keywords.iter().map(|k| k.to_string()).collect();
        obj.long = format!("{} lies here.", capitalize(short));
        match self {
            KitItem::Robes => {
                obj.equip_slot = Some(EquipSlot::Body);
                obj.armor = 1;
                obj.weight = 2;
            }
            KitItem::Spellbook => {
                obj.teaches = Some((1003, 30));
                obj.weight = 3;
            }
            KitItem::LeatherArmor => {
                obj.equip_slot = Some(EquipSlot::Body);
                obj.armor = 3;
                obj.weight = 8;
            }
            KitItem::Sword => {
                obj.equip_slot = Some(EquipSlot::Wield);
                obj.weight = 6;
            }
            KitItem::SpellScroll => {
                obj.teaches = Some((1004, 30));
                obj.consumable = true;
                obj.weight = 1;
            }
        }
        obj
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StarterKit {
    pub name: &'static str,
    pub description: &'static str,
    pub flavor: &'static str,
    pub hp: i32,
    pub mana: i32,
    pub movement: i32,
    /// `(ability, starting proficiency)`.
    pub skills: &'static [(AbilityId, u8)],
    pub equipment: &'static [KitItem],
}

pub const KITS: [StarterKit; 3] = [
    StarterKit {
        name: "Scholar's Kit",
        description: "Simple robes, basic spellbook, and studying supplies. Begin your journey with the foundation of magical study.",
        flavor: "Scholars are seekers of knowledge who unlock magical power by studying enchanted items found throughout the world.",
        hp: 100,
        mana: 150,
        movement: 100,
        skills: &[(1001, 30)],
        equipment: &[KitItem::Robes, KitItem::Spellbook],
    },
    StarterKit {
        name: "Warrior's Kit",
        description: "Leather armor, a basic sword, and training manual. Begin your path to combat mastery.",
        flavor: "Warriors are masters of combat who learn devastating maneuvers and grow stronger through battle.",
        hp: 150,
        mana: 50,
        movement: 120,
        skills: &[(2001, 10)],
        equipment: &[KitItem::LeatherArmor, KitItem::Sword],
    },
    StarterKit {
        name: "Wanderer's Kit",
        description: "Light armor, a simple weapon, and a basic spell scroll. Walk your own path between combat and magic.",
        flavor: "Wanderers embrace both blade and spell, adapting to any challenge.",
        hp: 125,
        mana: 100,
        movement: 110,
        skills: &[(1001, 20), (2001, 5)],
        equipment: &[KitItem::LeatherArmor, KitItem::Sword, KitItem::SpellScroll],
    },
];

/// 1-based, as shown in [`menu`].
pub fn by_menu_choice(choice: &str) -> Option<&'static StarterKit> {
    let n: usize = choice.trim().parse().ok()?;
    n.checked_sub(1).and_then(|i| KITS.get(i))
}

pub fn menu() -> String {
    KITS.iter()
        .enumerate()
        .map(|(i, kit)| format!("  {}) {}\n     {}\n", i + 1, kit.name, kit.description))
        .collect()
}

impl StarterKit {
    /// Set vitals, grant skills and hand over equipment.
    pub fn apply(&self, player: &mut Player) {
        player.hp = self.hp;
        player.max_hp = self.hp;
        player.mana = self.mana;
        player.max_mana = self.mana;
        player.movement = self.movement;
        player.max_movement = self.movement;
        for &(id, proficiency) in self.skills {
            player.skills.learn(id, proficiency);
        }
        player
            .inventory
            .extend(self.equipment.iter().map(|item| item.build()));
    }
}

/// Teach the starter spell, raising it to the starter proficiency if the kit
/// already granted it lower.
pub fn grant_starter_spell(player: &mut Player) {
    if !player.skills.learn(STARTER_SPELL, STARTER_SPELL_PROFICIENCY) {
        if let Some(progress) = player.skills.get_mut(STARTER_SPELL) {
            progress.proficiency = progress.proficiency.max(STARTER_SPELL_PROFICIENCY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CaptureOutput;
    use std::sync::Arc;

    fn fresh() -> Player {
        Player::new("Ayla", Arc::new(CaptureOutput::new()))
    }

    #[test]
    fn menu_choice_is_one_based() {
        assert_eq!(by_menu_choice("1").unwrap().name, "Scholar's Kit");
        assert_eq!(by_menu_choice(" 3 ").unwrap().name, "Wanderer's Kit");
        assert!(by_menu_choice("0").is_none());
        assert!(by_menu_choice("4").is_none());
        assert!(by_menu_choice("warrior").is_none());
        assert!(menu().contains("2) Warrior's Kit"));
    }

    #[test]
    fn warrior_kit_applies_vitals_skills_and_gear() {
        let mut p = fresh();
        KITS[1].apply(&mut p);
        assert_eq!((p.hp, p.max_hp, p.mana, p.max_movement), (150, 150, 50, 120));
        assert_eq!(p.skills.get(2001).unwrap().proficiency, 10);
        let slots: Vec<_> = p.inventory.iter().filter_map(Object::wear_slot).collect();
        assert_eq!(slots, vec![EquipSlot::Body, EquipSlot::Wield]);
    }

    #[test]
    fn starter_spell_raises_kit_proficiency() {
        let mut p = fresh();
        KITS[0].apply(&mut p);
        assert_eq!(p.skills.get(STARTER_SPELL).unwrap().proficiency, 30);
        grant_starter_spell(&mut p);
        assert_eq!(p.skills.get(STARTER_SPELL).unwrap().proficiency, 50);

        let mut w = fresh();
        KITS[1].apply(&mut w);
        grant_starter_spell(&mut w);
        assert!(w.skills.knows(STARTER_SPELL));
    }

    #[test]
    fn scroll_is_consumable_study_item() {
        let scroll = KitItem::SpellScroll.build();
        assert!(scroll.consumable);
        assert_eq!(scroll.teaches, Some((1004, 30)));
        assert!(scroll.wear_slot().is_none());
    }
}
