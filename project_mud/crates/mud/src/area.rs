//! JSON area files.
//!
//! One file per area: area metadata plus maps of rooms, mobile prototypes and
//! object prototypes, each keyed by a string vnum. Files load in file-name
//! order; a later file may override an earlier file's vnums.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use skills::{AbilityId, Attributes, Stat};

use crate::error::AreaLoadError;
use crate::model::{EquipSlot, MobId, Mobile, Object, ObjectId, Reset, Room, TrainerInfo, Vnum};
use crate::respawn::populate_all;
use crate::world::World;

/// Proficiency granted by a study item that does not say otherwise.
pub const DEFAULT_TEACH_AMOUNT: u8 = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AreaFile {
    name: String,
    author: String,
    reset_minutes: u32,
    rooms: HashMap<String, RoomRecord>,
    mobiles: HashMap<String, MobileRecord>,
    objects: HashMap<String, ObjectRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoomRecord {
    vnum: Vnum,
    name: String,
    description: String,
    sector: String,
    flags: HashMap<String, bool>,
    exits: BTreeMap<String, Vnum>,
    exdescs: BTreeMap<String, String>,
    mobile_resets: Vec<ResetRecord>,
    object_resets: Vec<ResetRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResetRecord {
    vnum: Vnum,
    count: u32,
    room: Vnum,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MobileRecord {
    vnum: Vnum,
    keywords: Vec<String>,
    short: String,
    long: String,
    race: String,
    class: String,
    position: String,
    gender: String,
    level: i32,
    max_hp: i32,
    hp: i32,
    mana: i32,
    max_mana: i32,
    attributes: Attributes,
    gold: i32,
    is_trainer: bool,
    teaches_spell_id: AbilityId,
    required_stat_name: String,
    required_stat_value: i32,
    trainer_message: String,
}

/// Legacy files carry a single number; newer ones a 4-slot array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueRecord {
    Single(i32),
    Slots(Vec<i32>),
}

impl Default for ValueRecord {
    fn default() -> Self {
        ValueRecord::Single(0)
    }
}

impl ValueRecord {
    fn to_slots(&self) -> [i32; 4] {
        let mut slots = [0; 4];
        match self {
            ValueRecord::Single(v) => slots[0] = *v,
            ValueRecord::Slots(vs) => {
                for (slot, v) in slots.iter_mut().zip(vs) {
                    *slot = *v;
                }
            }
        }
        slots
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectRecord {
    vnum: Vnum,
    keywords: Vec<String>,
    #[serde(rename = "type")]
    item_type: String,
    short: String,
    long: String,
    weight: i32,
    value: ValueRecord,
    flags: HashMap<String, bool>,
    equip_slot: String,
    armor_value: i32,
    teaches_spell_id: AbilityId,
    teaches_amount: u8,
    consumable: bool,
}

fn set_flags(flags: HashMap<String, bool>) -> BTreeSet<String> {
    flags
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name)
        .collect()
}

impl MobileRecord {
    fn into_mobile(self) -> Mobile {
        let trainer = self.is_trainer.then(|| {
            let required_stat = if self.required_stat_name.trim().is_empty() {
                None
            } else {
                let stat = Stat::from_name(&self.required_stat_name);
                if stat.is_none() {
                    tracing::warn!(
                        vnum = self.vnum,
                        stat = %self.required_stat_name,
                        "Trainer has unknown stat requirement"
                    );
                }
                stat
            };
            TrainerInfo {
                teaches: self.teaches_spell_id,
                required_stat,
                required_value: self.required_stat_value,
                message: self.trainer_message.clone(),
            }
        });
        Mobile {
            id: MobId::next(),
            vnum: self.vnum,
            keywords: self.keywords,
            short: self.short,
            long: self.long,
            race: self.race,
            class: self.class,
            position: self.position,
            gender: self.gender,
            level: self.level,
            hp: if self.hp > 0 { self.hp } else { self.max_hp },
            max_hp: self.max_hp,
            mana: self.mana,
            max_mana: self.max_mana,
            attributes: self.attributes,
            gold: self.gold,
            trainer,
        }
    }
}

impl ObjectRecord {
    fn into_object(self) -> Object {
        let value = self.value.to_slots();
        let teaches = if self.teaches_spell_id != 0 {
            let amount = if self.teaches_amount == 0 {
                DEFAULT_TEACH_AMOUNT
            } else {
                self.teaches_amount
            };
            Some((self.teaches_spell_id, amount))
        } else if value[3] > 0 {
            Some((value[3] as AbilityId, DEFAULT_TEACH_AMOUNT))
        } else {
            None
        };
        Object {
            id: ObjectId::next(),
            vnum: self.vnum,
            keywords: self.keywords,
            item_type: self.item_type,
            short: self.short,
            long: self.long,
            weight: self.weight,
            value,
            flags: set_flags(self.flags),
            equip_slot: EquipSlot::parse(&self.equip_slot),
            armor: self.armor_value,
            teaches,
            consumable: self.consumable,
        }
    }
}

fn resets(records: Vec<ResetRecord>, owner: Vnum) -> Vec<Reset> {
    records
        .into_iter()
        .filter(|r| r.vnum > 0 && r.count > 0)
        .map(|r| Reset {
            vnum: r.vnum,
            count: r.count,
            room: if r.room > 0 { r.room } else { owner },
        })
        .collect()
}

/// Everything read from an areas directory, before it becomes a [`World`].
#[derive(Debug, Default)]
pub struct AreaSet {
    pub rooms: BTreeMap<Vnum, Room>,
    pub mobiles: BTreeMap<Vnum, Mobile>,
    pub objects: BTreeMap<Vnum, Object>,
}

impl AreaSet {
    /// Merge one area file's JSON into the set.
    pub fn add_json(&mut self, json: &str, path: &str) -> Result<(), AreaLoadError> {
        let area: AreaFile = serde_json::from_str(json).map_err(|source| AreaLoadError::Json {
            path: path.to_string(),
            source,
        })?;

        for rec in area.rooms.into_values().filter(|r| r.vnum > 0) {
            let mut room = Room::new(rec.vnum, &rec.name, &rec.description);
            room.sector = rec.sector;
            room.flags = set_flags(rec.flags);
            room.exits = rec.exits;
            room.extra_descriptions = rec
                .exdescs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect();
            room.area_name = area.name.clone();
            room.area_author = area.author.clone();
            room.area_reset_minutes = area.reset_minutes;
            room.mobile_resets = resets(rec.mobile_resets, rec.vnum);
            room.object_resets = resets(rec.object_resets, rec.vnum);
            self.rooms.insert(room.vnum, room);
        }
        for rec in area.mobiles.into_values().filter(|m| m.vnum > 0) {
            self.mobiles.insert(rec.vnum, rec.into_mobile());
        }
        for rec in area.objects.into_values().filter(|o| o.vnum > 0) {
            self.objects.insert(rec.vnum, rec.into_object());
        }
        Ok(())
    }

    /// Build the live world and instantiate load-time content from resets.
    pub fn into_world(self, start: Vnum) -> World {
        let world = World::new(self.rooms, start).with_prototypes(self.mobiles, self.objects);
        populate_all(&mut world.write());
        world
    }
}

/// Read every `*.json` file in `dir`, in file-name order. A missing
/// directory is treated as empty.
pub fn load_areas(dir: &Path) -> Result<AreaSet, AreaLoadError> {
    let mut set = AreaSet::default();
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Areas directory not found, using default world");
        return Ok(set);
    }

    let io_err = |source| AreaLoadError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    for path in files {
        let shown = path.display().to_string();
        let json = std::fs::read_to_string(&path).map_err(|source| AreaLoadError::Io {
            path: shown.clone(),
            source,
        })?;
        set.add_json(&json, &shown)?;
        tracing::debug!(file = %shown, "Area file loaded");
    }

    tracing::info!(
        rooms = set.rooms.len(),
        mobiles = set.mobiles.len(),
        objects = set.objects.len(),
        "Areas loaded"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"{
        "name": "Sewers",
        "author": "Ayla",
        "reset_minutes": 12,
        "rooms": {
            "3001": {
                "vnum": 3001, "name": "Drain", "description": "Water drips.",
                "flags": {"dark": true, "safe": false},
                "exits": {"north": 3002},
                "exdescs": {"Grate": "A rusty grate."},
                "mobile_resets": [{"vnum": 3100, "count": 2, "room": 3001}],
                "object_resets": [{"vnum": 3200, "count": 1, "room": 3001}]
            },
            "3002": {"vnum": 3002, "name": "Tunnel", "exits": {"south": 3001}}
        },
        "mobiles": {
            "3100": {"vnum": 3100, "keywords": ["rat"], "short": "a rat",
                     "max_hp": 8, "attributes": [5,5,5,5,5,5,5]},
            "3101": {"vnum": 3101, "keywords": ["sage"], "short": "an old sage",
                     "is_trainer": true, "teaches_spell_id": 1003,
                     "required_stat_name": "wisdom", "required_stat_value": 14,
                     "trainer_message": "Heal well."}
        },
        "objects": {
            "3200": {"vnum": 3200, "keywords": ["coin"], "type": "treasure",
                     "short": "a coin", "value": 5},
            "3201": {"vnum": 3201, "keywords": ["scroll"], "type": "scroll",
                     "short": "a scroll", "value": [1, 0, 0, 1001], "consumable": true},
            "3202": {"vnum": 3202, "keywords": ["cap"], "type": "armor",
                     "short": "a cap", "equip_slot": "head", "armor_value": 2,
                     "flags": {"no_take": false}}
        }
    }"#;

    fn sample() -> AreaSet {
        let mut set = AreaSet::default();
        set.add_json(SAMPLE, "sewers.json").unwrap();
        set
    }

    #[test]
    fn rooms_carry_area_metadata() {
        let set = sample();
        let drain = &set.rooms[&3001];
        assert_eq!(drain.area_name, "Sewers");
        assert_eq!(drain.area_author, "Ayla");
        assert_eq!(drain.area_reset_minutes, 12);
        assert!(drain.flags.contains("dark"));
        assert!(!drain.flags.contains("safe"));
        assert_eq!(drain.extra_descriptions["grate"], "A rusty grate.");
        assert_eq!(drain.mobile_resets, vec![Reset { vnum: 3100, count: 2, room: 3001 }]);
    }

    #[test]
    fn object_value_accepts_number_or_array() {
        let set = sample();
        assert_eq!(set.objects[&3200].value, [5, 0, 0, 0]);
        assert_eq!(set.objects[&3201].value, [1, 0, 0, 1001]);
        assert_eq!(set.objects[&3201].teaches, Some((1001, DEFAULT_TEACH_AMOUNT)));
        assert_eq!(set.objects[&3200].teaches, None);
        assert_eq!(set.objects[&3202].equip_slot, Some(EquipSlot::Head));
        assert_eq!(set.objects[&3202].armor, 2);
        assert!(set.objects[&3202].flags.is_empty());
    }

    #[test]
    fn trainer_fields_parsed() {
        let set = sample();
        let sage = set.mobiles[&3101].trainer.clone().unwrap();
        assert_eq!(sage.teaches, 1003);
        assert_eq!(sage.required_stat, Some(Stat::Wisdom));
        assert_eq!(sage.required_value, 14);
        assert!(set.mobiles[&3100].trainer.is_none());
        assert_eq!(set.mobiles[&3100].hp, 8);
    }

    #[test]
    fn into_world_instantiates_resets() {
        let world = sample().into_world(0);
        assert_eq!(world.start_room(), 3001);
        let state = world.read();
        let drain = &state.rooms[&3001];
        assert_eq!(drain.mobiles.len(), 2);
        assert_ne!(drain.mobiles[0].id, drain.mobiles[1].id);
        assert_eq!(drain.objects.len(), 1);
    }

    #[test]
    fn loads_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"rooms": {"1": {"vnum": 1, "name": "Later"}}}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"rooms": {"1": {"vnum": 1, "name": "Earlier"}}}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let set = load_areas(dir.path()).unwrap();
        assert_eq!(set.rooms[&1].name, "Later");
    }

    #[test]
    fn missing_directory_gives_default_world() {
        let set = load_areas(Path::new("/nonexistent/areas")).unwrap();
        assert!(set.rooms.is_empty());
        let world = set.into_world(0);
        assert_eq!(world.room_count(), 1);
        assert!(world.has_room(1));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        assert!(matches!(
            load_areas(dir.path()),
            Err(AreaLoadError::Json { .. })
        ));
    }
}
