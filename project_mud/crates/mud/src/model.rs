use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skills::{AbilityId, Attributes, SkillBook, Stat};

use crate::output::Output;

pub type Vnum = i32;

static NEXT_MOB_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of a live mobile instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MobId(pub u64);

impl MobId {
    pub fn next() -> Self {
        MobId(NEXT_MOB_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-unique id of a live object instance. Not persisted; a reloaded
/// object gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipSlot {
    Head,
    Body,
    Neck,
    Back,
    Waist,
    Wield,
}

impl EquipSlot {
    /// Display order for equipment listings.
    pub const ALL: [EquipSlot; 6] = [
        EquipSlot::Head,
        EquipSlot::Body,
        EquipSlot::Neck,
        EquipSlot::Back,
        EquipSlot::Waist,
        EquipSlot::Wield,
    ];

    pub fn parse(name: &str) -> Option<EquipSlot> {
        match name.trim().to_ascii_lowercase().as_str() {
            "head" => Some(EquipSlot::Head),
            "body" => Some(EquipSlot::Body),
            "neck" => Some(EquipSlot::Neck),
            "back" => Some(EquipSlot::Back),
            "waist" => Some(EquipSlot::Waist),
            "wield" => Some(EquipSlot::Wield),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EquipSlot::Head => "head",
            EquipSlot::Body => "body",
            EquipSlot::Neck => "neck",
            EquipSlot::Back => "back",
            EquipSlot::Waist => "waist",
            EquipSlot::Wield => "wield",
        }
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const HEAD_WORDS: &[&str] = &[
    "helm", "helmet", "hat", "cap", "hood", "mask", "crown", "circlet", "tiara", "coif", "bonnet",
    "earmuff", "earmuffs", "glasses", "goggles",
];
const NECK_WORDS: &[&str] = &[
    "neck", "necklace", "amulet", "pendant", "torc", "choker", "collar", "gorget", "scarf",
];
const BACK_WORDS: &[&str] = &["cloak", "cape", "back", "mantle", "shawl", "poncho"];
const WAIST_WORDS: &[&str] = &["belt", "waist", "girdle", "sash", "cincture"];

fn keyword_matches(keywords: &[String], short: &str, keyword: &str) -> bool {
    let key = keyword.trim().to_lowercase();
    if key.is_empty() {
        return false;
    }
    keywords.iter().any(|k| k.to_lowercase() == key) || short.to_lowercase().contains(&key)
}

/// What a trainer mobile teaches and what it asks of a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerInfo {
    pub teaches: AbilityId,
    pub required_stat: Option<Stat>,
    pub required_value: i32,
    pub message: String,
}

/// A non-player character instance.
#[derive(Debug, Clone)]
pub struct Mobile {
    pub id: MobId,
    pub vnum: Vnum,
    pub keywords: Vec<String>,
    pub short: String,
    pub long: String,
    pub race: String,
    pub class: String,
    pub position: String,
    pub gender: String,
    pub level: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub attributes: Attributes,
    pub gold: i32,
    pub trainer: Option<TrainerInfo>,
}

impl Mobile {
    /// Copy this prototype into a new live instance.
    pub fn instantiate(&self) -> Mobile {
        Mobile {
            id: MobId::next(),
            ..self.clone()
        }
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        let key = keyword.trim().to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == key)
    }

    pub fn matches(&self, keyword: &str) -> bool {
        keyword_matches(&self.keywords, &self.short, keyword)
    }

    pub fn position_text(&self) -> &str {
        match self.position.trim() {
            "" => "standing",
            p => p,
        }
    }

    /// Room line, or `None` for a mobile with no short description.
    pub fn room_line(&self) -> Option<String> {
        if self.short.is_empty() {
            return None;
        }
        Some(format!("{} is {}.", self.short, self.position_text()))
    }
}

/// An item instance. Owned by exactly one room, inventory or equipment slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    #[serde(skip, default = "ObjectId::next")]
    pub id: ObjectId,
    pub vnum: Vnum,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub long: String,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub value: [i32; 4],
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    #[serde(default)]
    pub armor: i32,
    /// Ability taught by studying this item, with the starting proficiency.
    #[serde(default)]
    pub teaches: Option<(AbilityId, u8)>,
    #[serde(default)]
    pub consumable: bool,
}

impl Object {
    /// A bare object with a fresh id; the rest is filled in by the caller.
    pub fn new(vnum: Vnum, item_type: &str, short: &str) -> Self {
        Object {
            id: ObjectId::next(),
            vnum,
            keywords: Vec::new(),
            item_type: item_type.to_string(),
            short: short.to_string(),
            long: String::new(),
            weight: 0,
            value: [0; 4],
            flags: BTreeSet::new(),
            equip_slot: None,
            armor: 0,
            teaches: None,
            consumable: false,
        }
    }

    pub fn instantiate(&self) -> Object {
        Object {
            id: ObjectId::next(),
            ..self.clone()
        }
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        let key = keyword.trim().to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == key)
    }

    pub fn matches(&self, keyword: &str) -> bool {
        keyword_matches(&self.keywords, &self.short, keyword)
    }

    pub fn label(&self) -> &str {
        if self.short.is_empty() {
            "something"
        } else {
            &self.short
        }
    }

    pub fn room_line(&self) -> Option<String> {
        if self.short.is_empty() {
            return None;
        }
        Some(format!("{} is here.", self.short))
    }

    pub fn is_takeable(&self) -> bool {
        let fixed = matches!(self.item_type.as_str(), "fountain" | "furniture");
        !fixed && !self.flags.contains("notake") && !self.flags.contains("no_take")
    }

    pub fn is_wearable(&self) -> bool {
        matches!(
            self.item_type.trim().to_ascii_lowercase().as_str(),
            "armor" | "_worn" | "weapon"
        )
    }

    /// The slot this item goes in: the explicit slot if authored, otherwise
    /// guessed from its type and keywords. `None` if it cannot be worn.
    pub fn wear_slot(&self) -> Option<EquipSlot> {
        if !self.is_wearable() {
            return None;
        }
        if let Some(slot) = self.equip_slot {
            return Some(slot);
        }
        if self.item_type.trim().eq_ignore_ascii_case("weapon") {
            return Some(EquipSlot::Wield);
        }
        let slot = if self.mentions_any(HEAD_WORDS) {
            EquipSlot::Head
        } else if self.mentions_any(NECK_WORDS) {
            EquipSlot::Neck
        } else if self.mentions_any(BACK_WORDS) {
            EquipSlot::Back
        } else if self.mentions_any(WAIST_WORDS) {
            EquipSlot::Waist
        } else {
            EquipSlot::Body
        };
        Some(slot)
    }

    fn mentions_any(&self, words: &[&str]) -> bool {
        let short = self.short.to_lowercase();
        words.iter().any(|word| {
            short.contains(word) || self.keywords.iter().any(|k| k.to_lowercase().contains(word))
        })
    }
}

/// Declarative population rule bound to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reset {
    pub vnum: Vnum,
    pub count: u32,
    pub room: Vnum,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub vnum: Vnum,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub flags: BTreeSet<String>,
    pub exits: BTreeMap<String, Vnum>,
    pub extra_descriptions: BTreeMap<String, String>,
    pub area_name: String,
    pub area_author: String,
    pub area_reset_minutes: u32,
    pub mobiles: Vec<Mobile>,
    pub objects: Vec<Object>,
    pub mobile_resets: Vec<Reset>,
    pub object_resets: Vec<Reset>,
}

impl Room {
    pub fn new(vnum: Vnum, name: &str, description: &str) -> Self {
        Room {
            vnum,
            name: name.to_string(),
            description: description.to_string(),
            sector: String::new(),
            flags: BTreeSet::new(),
            exits: BTreeMap::new(),
            extra_descriptions: BTreeMap::new(),
            area_name: String::new(),
            area_author: String::new(),
            area_reset_minutes: 0,
            mobiles: Vec::new(),
            objects: Vec::new(),
            mobile_resets: Vec::new(),
            object_resets: Vec::new(),
        }
    }

    /// Area name used for respawn grouping.
    pub fn area_key(&self) -> &str {
        if self.area_name.is_empty() {
            "Unknown"
        } else {
            &self.area_name
        }
    }
}

/// Snapshot of a room as one player sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub vnum: Vnum,
    pub name: String,
    pub description: String,
    pub exits: Vec<String>,
    pub others: Vec<String>,
    pub mobiles: Vec<String>,
    pub objects: Vec<String>,
    pub area_name: String,
    pub area_author: String,
}

/// A connected character. Lives as long as its connection.
#[derive(Clone)]
pub struct Player {
    pub name: String,
    pub output: Arc<dyn Output>,
    pub location: Vnum,
    pub auto_exits: bool,
    pub race: i32,
    pub class: i32,
    pub sex: i32,
    pub level: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub movement: i32,
    pub max_movement: i32,
    pub gold: i32,
    pub experience: i32,
    pub attributes: Attributes,
    pub alignment: i32,
    pub hitroll: i32,
    pub damroll: i32,
    pub armor: i32,
    pub hair: String,
    pub eyes: String,
    pub inventory: Vec<Object>,
    pub equipment: BTreeMap<EquipSlot, Object>,
    pub skills: SkillBook,
    pub is_keeper: bool,
}

impl Player {
    /// A level-one character with baseline stats, not yet placed in a room.
    pub fn new(name: &str, output: Arc<dyn Output>) -> Self {
        Player {
            name: name.to_string(),
            output,
            location: 0,
            auto_exits: true,
            race: 0,
            class: 0,
            sex: 0,
            level: 1,
            hp: 100,
            max_hp: 100,
            mana: 100,
            max_mana: 100,
            movement: 100,
            max_movement: 100,
            gold: 0,
            experience: 0,
            attributes: [13; 7],
            alignment: 0,
            hitroll: 0,
            damroll: 0,
            armor: 0,
            hair: String::new(),
            eyes: String::new(),
            inventory: Vec::new(),
            equipment: BTreeMap::new(),
            skills: SkillBook::new(),
            is_keeper: false,
        }
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        stat.of(&self.attributes)
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("hp", &self.hp)
            .field("mana", &self.mana)
            .field("is_keeper", &self.is_keeper)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armor(short: &str, keywords: &[&str]) -> Object {
        let mut obj = Object::new(10, "armor", short);
        obj.keywords = keywords.iter().map(|k| k.to_string()).collect();
        obj
    }

    #[test]
    fn wear_slot_prefers_explicit_slot() {
        let mut obj = armor("a leather cap", &["cap"]);
        obj.equip_slot = Some(EquipSlot::Waist);
        assert_eq!(obj.wear_slot(), Some(EquipSlot::Waist));
    }

    #[test]
    fn wear_slot_inferred_from_keywords() {
        assert_eq!(armor("an iron helm", &["helm"]).wear_slot(), Some(EquipSlot::Head));
        assert_eq!(armor("a silver amulet", &["amulet"]).wear_slot(), Some(EquipSlot::Neck));
        assert_eq!(armor("a wool cloak", &["cloak"]).wear_slot(), Some(EquipSlot::Back));
        assert_eq!(armor("a rope belt", &["belt"]).wear_slot(), Some(EquipSlot::Waist));
        assert_eq!(armor("a padded vest", &["vest"]).wear_slot(), Some(EquipSlot::Body));
        assert_eq!(
            Object::new(11, "weapon", "a short sword").wear_slot(),
            Some(EquipSlot::Wield)
        );
        assert_eq!(Object::new(12, "food", "a loaf").wear_slot(), None);
    }

    #[test]
    fn keyword_match_then_short_substring() {
        let obj = armor("a battered shield", &["shield"]);
        assert!(obj.matches("SHIELD"));
        assert!(obj.matches("batter"));
        assert!(!obj.matches("sword"));
        assert!(!obj.matches("  "));
    }

    #[test]
    fn fixtures_cannot_be_taken() {
        let mut obj = Object::new(1, "fountain", "a fountain");
        assert!(!obj.is_takeable());
        obj.item_type = "trash".into();
        assert!(obj.is_takeable());
        obj.flags.insert("no_take".into());
        assert!(!obj.is_takeable());
    }

    #[test]
    fn instantiate_assigns_fresh_ids() {
        let proto = Object::new(1, "trash", "a pebble");
        let a = proto.instantiate();
        let b = proto.instantiate();
        assert_ne!(a.id, b.id);
        assert_eq!(a.vnum, b.vnum);
    }

    #[test]
    fn object_id_not_serialized() {
        let obj = Object::new(3, "armor", "a cap");
        let json = serde_json::to_string(&obj).unwrap();
        assert!(!json.contains("\"id\""));
        let back: Object = serde_json::from_str(&json).unwrap();
        assert_ne!(back.id, obj.id);
        assert_eq!(back.short, "a cap");
    }

    #[test]
    fn empty_area_groups_as_unknown() {
        let mut room = Room::new(1, "A", "");
        assert_eq!(room.area_key(), "Unknown");
        room.area_name = "Midgaard".into();
        assert_eq!(room.area_key(), "Midgaard");
    }
}
