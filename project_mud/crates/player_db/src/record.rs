use std::collections::BTreeMap;
use std::sync::Arc;

use mud::{EquipSlot, Object, Output, Player, Vnum};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use skills::{Attributes, SkillBook};

use crate::error::PlayerDbError;

/// The persistent part of a [`Player`]. Session-bound fields (the output
/// sink, display preferences) are not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub location: Vnum,
    #[serde(default)]
    pub race: i32,
    #[serde(default)]
    pub class: i32,
    #[serde(default)]
    pub sex: i32,
    pub level: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub movement: i32,
    pub max_movement: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub experience: i32,
    pub attributes: Attributes,
    #[serde(default)]
    pub alignment: i32,
    #[serde(default)]
    pub hitroll: i32,
    #[serde(default)]
    pub damroll: i32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub hair: String,
    #[serde(default)]
    pub eyes: String,
    #[serde(default)]
    pub inventory: Vec<Object>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipSlot, Object>,
    #[serde(default)]
    pub skills: SkillBook,
    #[serde(default)]
    pub is_keeper: bool,
}

impl PlayerRecord {
    pub fn capture(player: &Player) -> Self {
        PlayerRecord {
            name: player.name.clone(),
            location: player.location,
            race: player.race,
            class: player.class,
            sex: player.sex,
            level: player.level,
            hp: player.hp,
            max_hp: player.max_hp,
            mana: player.mana,
            max_mana: player.max_mana,
            movement: player.movement,
            max_movement: player.max_movement,
            gold: player.gold,
            experience: player.experience,
            attributes: player.attributes,
            alignment: player.alignment,
            hitroll: player.hitroll,
            damroll: player.damroll,
            armor: player.armor,
            hair: player.hair.clone(),
            eyes: player.eyes.clone(),
            inventory: player.inventory.clone(),
            equipment: player.equipment.clone(),
            skills: player.skills.clone(),
            is_keeper: player.is_keeper,
        }
    }

    /// Rebuild a live player bound to a fresh output sink.
    pub fn restore(self, output: Arc<dyn Output>) -> Player {
        let mut player = Player::new(&self.name, output);
        player.location = self.location;
        player.race = self.race;
        player.class = self.class;
        player.sex = self.sex;
        player.level = self.level;
        player.hp = self.hp;
        player.max_hp = self.max_hp;
        player.mana = self.mana;
        player.max_mana = self.max_mana;
        player.movement = self.movement;
        player.max_movement = self.max_movement;
        player.gold = self.gold;
        player.experience = self.experience;
        player.attributes = self.attributes;
        player.alignment = self.alignment;
        player.hitroll = self.hitroll;
        player.damroll = self.damroll;
        player.armor = self.armor;
        player.hair = self.hair;
        player.eyes = self.eyes;
        player.inventory = self.inventory;
        player.equipment = self.equipment;
        player.skills = self.skills;
        player.is_keeper = self.is_keeper;
        player
    }
}

/// Repository for player records.
pub struct PlayerRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PlayerRepo<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look a player up by name (case-insensitive).
    pub fn load(&self, name: &str) -> Result<Option<PlayerRecord>, PlayerDbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM players WHERE name = ?1")?;
        let json: String = match stmt.query_row(rusqlite::params![name.trim()], |row| row.get(0)) {
            Ok(json) => json,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Insert or replace the record stored under the record's name.
    pub fn save(&self, record: &PlayerRecord) -> Result<(), PlayerDbError> {
        let json = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO players (name, record, last_saved) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET record = excluded.record, last_saved = excluded.last_saved",
            rusqlite::params![record.name, json],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, PlayerDbError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
        Ok(n.max(0) as usize)
    }
}
