//! Shared simulation state.
//!
//! Every room, live mobile, live object and connected player sits behind one
//! `RwLock`. Queries take the read lock and hand back owned snapshots;
//! mutations take the write lock and validate fully before changing
//! anything. Text is never written while the lock is held: broadcasts
//! collect their recipients first and write after the guard drops.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::error::WorldError;
use crate::model::{EquipSlot, MobId, Mobile, Object, ObjectId, Player, Room, RoomView, Vnum};
use crate::output::Output;

pub(crate) struct WorldState {
    pub(crate) rooms: BTreeMap<Vnum, Room>,
    pub(crate) start: Vnum,
    players: HashMap<String, Player>,
    pub(crate) mob_protos: BTreeMap<Vnum, Mobile>,
    pub(crate) obj_protos: BTreeMap<Vnum, Object>,
    pub(crate) area_last_respawn: HashMap<String, Instant>,
}

/// Result of [`World::damage_mob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageOutcome {
    Wounded { hp: i32, max_hp: i32 },
    /// The mobile died and was removed from its room. `loot` lists what the
    /// attacker collected.
    Killed { loot: Vec<String> },
}

pub struct World {
    state: RwLock<WorldState>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 3 to 16 ASCII letters or digits.
pub fn validate_name(name: &str) -> Result<(), WorldError> {
    let valid = (3..=16).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(WorldError::NameInvalid)
    }
}

impl WorldState {
    fn player(&self, name: &str) -> Result<&Player, WorldError> {
        self.players
            .get(&key(name))
            .ok_or_else(|| WorldError::PlayerNotFound(name.to_string()))
    }

    fn player_mut(&mut self, name: &str) -> Result<&mut Player, WorldError> {
        self.players
            .get_mut(&key(name))
            .ok_or_else(|| WorldError::PlayerNotFound(name.to_string()))
    }

    fn room_of(&self, name: &str) -> Result<&Room, WorldError> {
        let location = self.player(name)?.location;
        self.rooms.get(&location).ok_or(WorldError::RoomNotFound)
    }

    /// Player and the room they stand in, both mutable.
    fn player_and_room_mut(&mut self, name: &str) -> Result<(&mut Player, &mut Room), WorldError> {
        let player = self
            .players
            .get_mut(&key(name))
            .ok_or_else(|| WorldError::PlayerNotFound(name.to_string()))?;
        let room = self
            .rooms
            .get_mut(&player.location)
            .ok_or(WorldError::RoomNotFound)?;
        Ok((player, room))
    }

    fn view_for(&self, name: &str) -> Result<RoomView, WorldError> {
        let viewer = self.player(name)?;
        let room = self.rooms.get(&viewer.location).ok_or(WorldError::RoomNotFound)?;

        let mut others: Vec<String> = self
            .players
            .values()
            .filter(|p| p.location == room.vnum && !p.name.eq_ignore_ascii_case(&viewer.name))
            .map(|p| p.name.clone())
            .collect();
        others.sort();

        let mut mobiles: Vec<String> = room.mobiles.iter().filter_map(Mobile::room_line).collect();
        mobiles.sort();
        let mut objects: Vec<String> = room.objects.iter().filter_map(Object::room_line).collect();
        objects.sort();

        Ok(RoomView {
            vnum: room.vnum,
            name: room.name.clone(),
            description: room.description.clone(),
            exits: room.exits.keys().cloned().collect(),
            others,
            mobiles,
            objects,
            area_name: room.area_name.clone(),
            area_author: room.area_author.clone(),
        })
    }

    fn outputs_where<F>(&self, pred: F) -> Vec<(String, Arc<dyn Output>)>
    where
        F: Fn(&Player) -> bool,
    {
        self.players
            .values()
            .filter(|p| pred(*p))
            .map(|p| (p.name.clone(), Arc::clone(&p.output)))
            .collect()
    }
}

impl World {
    /// Build a world from loaded rooms. `start == 0` selects the lowest vnum;
    /// an empty room set yields the default one-room world.
    pub fn new(rooms: BTreeMap<Vnum, Room>, start: Vnum) -> Self {
        if rooms.is_empty() {
            return Self::default_world();
        }
        let lowest = rooms.keys().next().copied().unwrap_or_default();
        let start = if start != 0 && rooms.contains_key(&start) {
            start
        } else {
            if start != 0 {
                tracing::warn!(start, fallback = lowest, "Start room not found");
            }
            lowest
        };
        World {
            state: RwLock::new(WorldState {
                rooms,
                start,
                players: HashMap::new(),
                mob_protos: BTreeMap::new(),
                obj_protos: BTreeMap::new(),
                area_last_respawn: HashMap::new(),
            }),
        }
    }

    pub fn default_world() -> Self {
        let room = Room::new(
            1,
            "The Crossroads",
            "A simple stone path crosses here, leading to all corners of the land.",
        );
        let vnum = room.vnum;
        Self::new(BTreeMap::from([(vnum, room)]), vnum)
    }

    /// Install the prototype tables used by respawn and `spawn`.
    pub fn with_prototypes(
        self,
        mobiles: BTreeMap<Vnum, Mobile>,
        objects: BTreeMap<Vnum, Object>,
    ) -> Self {
        {
            let mut state = self.write();
            state.mob_protos = mobiles;
            state.obj_protos = objects;
        }
        self
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start_room(&self) -> Vnum {
        self.read().start
    }

    pub fn has_room(&self, vnum: Vnum) -> bool {
        self.read().rooms.contains_key(&vnum)
    }

    pub fn room_count(&self) -> usize {
        self.read().rooms.len()
    }

    // ---- players ----

    /// Register a connected player. A missing or stale location is replaced
    /// by the start room.
    pub fn add_player(&self, mut player: Player) -> Result<(), WorldError> {
        validate_name(&player.name)?;
        let mut state = self.write();
        let k = key(&player.name);
        if state.players.contains_key(&k) {
            return Err(WorldError::NameInUse);
        }
        if player.location == 0 || !state.rooms.contains_key(&player.location) {
            player.location = state.start;
        }
        state.players.insert(k, player);
        Ok(())
    }

    /// Idempotent. Returns the player that was removed, if any.
    pub fn remove_player(&self, name: &str) -> Option<Player> {
        self.write().players.remove(&key(name))
    }

    pub fn is_online(&self, name: &str) -> bool {
        self.read().players.contains_key(&key(name))
    }

    /// Names of everyone online, sorted.
    pub fn list_players(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().players.values().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }

    pub fn find_player(&self, name: &str) -> Option<Player> {
        self.read().players.get(&key(name)).cloned()
    }

    pub fn players_snapshot(&self) -> Vec<Player> {
        self.read().players.values().cloned().collect()
    }

    /// Run `f` against the live player under the read lock.
    pub fn with_player<R>(&self, name: &str, f: impl FnOnce(&Player) -> R) -> Option<R> {
        self.read().players.get(&key(name)).map(f)
    }

    /// Run `f` against the live player under the write lock. `f` must not
    /// block.
    pub fn with_player_mut<R>(&self, name: &str, f: impl FnOnce(&mut Player) -> R) -> Option<R> {
        self.write().players.get_mut(&key(name)).map(f)
    }

    // ---- rooms and movement ----

    pub fn describe_room(&self, name: &str) -> Result<RoomView, WorldError> {
        self.read().view_for(name)
    }

    /// Follow `direction` out of the player's room. Nothing moves on error.
    pub fn move_player(&self, name: &str, direction: &str) -> Result<RoomView, WorldError> {
        let mut state = self.write();
        let room = state.room_of(name)?;
        let target = *room.exits.get(direction).ok_or(WorldError::NoExit)?;
        if !state.rooms.contains_key(&target) {
            return Err(WorldError::NoExit);
        }
        state.player_mut(name)?.location = target;
        state.view_for(name)
    }

    /// Move the player straight to `vnum`.
    pub fn teleport(&self, name: &str, vnum: Vnum) -> Result<RoomView, WorldError> {
        let mut state = self.write();
        if !state.rooms.contains_key(&vnum) {
            return Err(WorldError::RoomNotFound);
        }
        state.player_mut(name)?.location = vnum;
        state.view_for(name)
    }

    pub fn find_room_extra_description(&self, name: &str, keyword: &str) -> Option<String> {
        let state = self.read();
        let room = state.room_of(name).ok()?;
        let k = keyword.trim().to_lowercase();
        if k.is_empty() {
            return None;
        }
        room.extra_descriptions.get(&k).cloned()
    }

    // ---- broadcast ----

    /// Speaker sees `You say '...'`, everyone else in the room sees
    /// `<name> says '...'`.
    pub fn broadcast_say(&self, speaker: &str, message: &str) {
        let (speaker_name, recipients) = {
            let state = self.read();
            let Ok(sp) = state.player(speaker) else {
                return;
            };
            let location = sp.location;
            (sp.name.clone(), state.outputs_where(|p| p.location == location))
        };
        for (name, out) in recipients {
            if name.eq_ignore_ascii_case(&speaker_name) {
                out.write_line(&format!("You say '{}'", message));
            } else {
                out.write_line(&format!("{} says '{}'", speaker_name, message));
            }
        }
    }

    /// Like [`World::broadcast_say`] but to every connected player.
    pub fn broadcast_chat(&self, speaker: &str, message: &str) {
        let (speaker_name, recipients) = {
            let state = self.read();
            let Ok(sp) = state.player(speaker) else {
                return;
            };
            (sp.name.clone(), state.outputs_where(|_| true))
        };
        for (name, out) in recipients {
            if name.eq_ignore_ascii_case(&speaker_name) {
                out.write_line(&format!("&cYou chat '{}'&w", message));
            } else {
                out.write_line(&format!("&c{} chats '{}'&w", speaker_name, message));
            }
        }
    }

    /// Everyone in the player's room except the player.
    pub fn broadcast_system_to_room_except(&self, except: &str, message: &str) {
        let recipients = {
            let state = self.read();
            let Ok(p) = state.player(except) else {
                return;
            };
            let location = p.location;
            state.outputs_where(|o| o.location == location && !o.name.eq_ignore_ascii_case(except))
        };
        for (_, out) in recipients {
            out.write_line(message);
        }
    }

    pub fn broadcast_combat_message(&self, attacker: &str, message: &str) {
        self.broadcast_system_to_room_except(attacker, message);
    }

    /// Everyone in `vnum`, except `except` if given.
    pub fn broadcast_to_room(&self, vnum: Vnum, message: &str, except: Option<&str>) {
        let recipients = self.read().outputs_where(|p| {
            p.location == vnum && except.map_or(true, |e| !p.name.eq_ignore_ascii_case(e))
        });
        for (_, out) in recipients {
            out.write_line(message);
        }
    }

    /// Every connected player.
    pub fn broadcast_all(&self, message: &str) {
        let recipients = self.read().outputs_where(|_| true);
        for (_, out) in recipients {
            out.write_line(message);
        }
    }

    // ---- lookups ----

    /// Exact name first, then name prefix. Never returns the searcher.
    pub fn find_player_in_room(&self, searcher: &str, keyword: &str) -> Option<Player> {
        let state = self.read();
        let me = state.player(searcher).ok()?;
        let k = keyword.trim().to_lowercase();
        if k.is_empty() {
            return None;
        }
        let mut here: Vec<&Player> = state
            .players
            .values()
            .filter(|p| p.location == me.location && !p.name.eq_ignore_ascii_case(&me.name))
            .collect();
        here.sort_by(|a, b| a.name.cmp(&b.name));
        here.iter()
            .find(|p| p.name.to_lowercase() == k)
            .or_else(|| here.iter().find(|p| p.name.to_lowercase().starts_with(&k)))
            .map(|p| (*p).clone())
    }

    /// Exact keyword first, then substring of the short description.
    pub fn find_mob_in_room(&self, name: &str, keyword: &str) -> Option<Mobile> {
        let state = self.read();
        let room = state.room_of(name).ok()?;
        room.mobiles
            .iter()
            .find(|m| m.has_keyword(keyword))
            .or_else(|| room.mobiles.iter().find(|m| m.matches(keyword)))
            .cloned()
    }

    pub fn room_mobiles(&self, name: &str) -> Vec<Mobile> {
        let state = self.read();
        state
            .room_of(name)
            .map(|r| r.mobiles.clone())
            .unwrap_or_default()
    }

    pub fn find_object_in_room(&self, name: &str, keyword: &str) -> Option<Object> {
        let state = self.read();
        let room = state.room_of(name).ok()?;
        find_object(&room.objects, keyword).cloned()
    }

    pub fn room_objects(&self, name: &str) -> Vec<Object> {
        let state = self.read();
        state
            .room_of(name)
            .map(|r| r.objects.clone())
            .unwrap_or_default()
    }

    pub fn find_object_in_inventory(&self, name: &str, keyword: &str) -> Option<Object> {
        let state = self.read();
        let player = state.player(name).ok()?;
        find_object(&player.inventory, keyword).cloned()
    }

    pub fn find_object_in_equipment(&self, name: &str, keyword: &str) -> Option<(EquipSlot, Object)> {
        let state = self.read();
        let player = state.player(name).ok()?;
        player
            .equipment
            .iter()
            .find(|(_, o)| o.has_keyword(keyword))
            .or_else(|| player.equipment.iter().find(|(_, o)| o.matches(keyword)))
            .map(|(s, o)| (*s, o.clone()))
    }

    // ---- object ownership ----

    /// Move an object from the player's room into their inventory.
    pub fn pick_up_object(&self, name: &str, id: ObjectId) -> Result<Object, WorldError> {
        let mut state = self.write();
        let (player, room) = state.player_and_room_mut(name)?;
        let idx = room
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(WorldError::ObjectNotFound)?;
        let obj = room.objects.remove(idx);
        player.inventory.push(obj.clone());
        Ok(obj)
    }

    /// Move an object from the player's inventory into their room.
    pub fn drop_object(&self, name: &str, id: ObjectId) -> Result<Object, WorldError> {
        let mut state = self.write();
        let (player, room) = state.player_and_room_mut(name)?;
        let idx = player
            .inventory
            .iter()
            .position(|o| o.id == id)
            .ok_or(WorldError::ObjectNotFound)?;
        let obj = player.inventory.remove(idx);
        room.objects.push(obj.clone());
        Ok(obj)
    }

    /// Destroy an object the player is carrying.
    pub fn consume_inventory_object(&self, name: &str, id: ObjectId) -> Result<Object, WorldError> {
        let mut state = self.write();
        let player = state.player_mut(name)?;
        let idx = player
            .inventory
            .iter()
            .position(|o| o.id == id)
            .ok_or(WorldError::ObjectNotFound)?;
        Ok(player.inventory.remove(idx))
    }

    /// Move an object from inventory into `slot`. Armor bonus is left to the
    /// caller.
    pub fn equip_object(&self, name: &str, id: ObjectId, slot: EquipSlot) -> Result<Object, WorldError> {
        let mut state = self.write();
        let player = state.player_mut(name)?;
        if player.equipment.contains_key(&slot) {
            return Err(WorldError::SlotOccupied(slot));
        }
        let idx = player
            .inventory
            .iter()
            .position(|o| o.id == id)
            .ok_or(WorldError::ObjectNotFound)?;
        let obj = player.inventory.remove(idx);
        player.equipment.insert(slot, obj.clone());
        Ok(obj)
    }

    /// Move whatever is in `slot` back to inventory.
    pub fn unequip_object(&self, name: &str, slot: EquipSlot) -> Result<Object, WorldError> {
        let mut state = self.write();
        let player = state.player_mut(name)?;
        let obj = player
            .equipment
            .remove(&slot)
            .ok_or(WorldError::SlotEmpty(slot))?;
        player.inventory.push(obj.clone());
        Ok(obj)
    }

    // ---- mobiles ----

    /// Subtract `amount` HP (floored at zero). A mobile that reaches zero is
    /// removed from the attacker's room and its gold goes to the attacker.
    pub fn damage_mob(&self, attacker: &str, mob: MobId, amount: i32) -> Result<DamageOutcome, WorldError> {
        let mut state = self.write();
        let (player, room) = state.player_and_room_mut(attacker)?;
        let idx = room
            .mobiles
            .iter()
            .position(|m| m.id == mob)
            .ok_or(WorldError::MobNotFound)?;

        let target = &mut room.mobiles[idx];
        target.hp = (target.hp - amount.max(0)).max(0);
        if target.hp > 0 {
            return Ok(DamageOutcome::Wounded {
                hp: target.hp,
                max_hp: target.max_hp,
            });
        }

        let dead = room.mobiles.remove(idx);
        let mut loot = Vec::new();
        if dead.gold > 0 {
            player.gold += dead.gold;
            loot.push(format!("{} gold coins", dead.gold));
        }
        tracing::debug!(attacker = %player.name, mob = %dead.short, vnum = dead.vnum, "Mobile killed");
        Ok(DamageOutcome::Killed { loot })
    }

    /// Clone the prototype `vnum` into the player's room.
    pub fn spawn_mob(&self, name: &str, vnum: Vnum) -> Result<Mobile, WorldError> {
        let mut state = self.write();
        let mob = state
            .mob_protos
            .get(&vnum)
            .ok_or(WorldError::PrototypeNotFound(vnum))?
            .instantiate();
        let (_, room) = state.player_and_room_mut(name)?;
        room.mobiles.push(mob.clone());
        Ok(mob)
    }
}

fn find_object<'a>(objects: &'a [Object], keyword: &str) -> Option<&'a Object> {
    objects
        .iter()
        .find(|o| o.has_keyword(keyword))
        .or_else(|| objects.iter().find(|o| o.matches(keyword)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::output::CaptureOutput;

    pub(crate) fn two_room_world() -> World {
        let mut square = Room::new(100, "Town Square", "A busy square.");
        square.exits.insert("north".into(), 101);
        square.exits.insert("west".into(), 999);
        square.area_name = "Town".into();
        let mut gate = Room::new(101, "North Gate", "A tall gate.");
        gate.exits.insert("south".into(), 100);
        gate.area_name = "Town".into();
        World::new(BTreeMap::from([(100, square), (101, gate)]), 0)
    }

    pub(crate) fn rat() -> Mobile {
        Mobile {
            id: MobId::next(),
            vnum: 500,
            keywords: vec!["rat".into(), "vermin".into()],
            short: "a sewer rat".into(),
            long: "A sewer rat gnaws on something.".into(),
            race: "rodent".into(),
            class: String::new(),
            position: String::new(),
            gender: String::new(),
            level: 1,
            hp: 10,
            max_hp: 10,
            mana: 0,
            max_mana: 0,
            attributes: [8; 7],
            gold: 3,
            trainer: None,
        }
    }

    pub(crate) fn join(world: &World, name: &str) -> Arc<CaptureOutput> {
        let out = Arc::new(CaptureOutput::new());
        world
            .add_player(Player::new(name, out.clone()))
            .unwrap();
        out
    }

    #[test]
    fn names_are_validated() {
        assert!(validate_name("Ayla").is_ok());
        assert!(validate_name("abc123").is_ok());
        assert_eq!(validate_name("ab"), Err(WorldError::NameInvalid));
        assert_eq!(validate_name("a".repeat(17).as_str()), Err(WorldError::NameInvalid));
        assert_eq!(validate_name("Ay la"), Err(WorldError::NameInvalid));
        assert_eq!(validate_name("Äyla"), Err(WorldError::NameInvalid));
    }

    #[test]
    fn duplicate_names_rejected_case_insensitively() {
        let world = two_room_world();
        join(&world, "Ayla");
        let err = world
            .add_player(Player::new("AYLA", Arc::new(CaptureOutput::new())))
            .unwrap_err();
        assert_eq!(err, WorldError::NameInUse);
        assert_eq!(world.list_players(), vec!["Ayla".to_string()]);
    }

    #[test]
    fn stale_location_falls_back_to_start() {
        let world = two_room_world();
        let mut p = Player::new("Brin", Arc::new(CaptureOutput::new()));
        p.location = 4242;
        world.add_player(p).unwrap();
        assert_eq!(world.with_player("brin", |p| p.location), Some(100));
    }

    #[test]
    fn move_follows_exits() {
        let world = two_room_world();
        join(&world, "Ayla");
        let view = world.move_player("Ayla", "north").unwrap();
        assert_eq!(view.name, "North Gate");
        assert_eq!(world.with_player("Ayla", |p| p.location), Some(101));
    }

    #[test]
    fn failed_move_leaves_player_in_place() {
        let world = two_room_world();
        join(&world, "Ayla");
        assert_eq!(world.move_player("Ayla", "east"), Err(WorldError::NoExit));
        assert_eq!(world.move_player("Ayla", "west"), Err(WorldError::NoExit));
        assert_eq!(world.with_player("Ayla", |p| p.location), Some(100));
    }

    #[test]
    fn describe_room_sorts_and_excludes_viewer() {
        let world = two_room_world();
        join(&world, "Zed");
        join(&world, "Ayla");
        join(&world, "Mira");
        {
            let mut state = world.write();
            let room = state.rooms.get_mut(&100).unwrap();
            room.mobiles.push(rat());
            let mut obj = Object::new(1, "trash", "a bent nail");
            obj.keywords = vec!["nail".into()];
            room.objects.push(obj);
        }
        let view = world.describe_room("Mira").unwrap();
        assert_eq!(view.exits, vec!["north", "west"]);
        assert_eq!(view.others, vec!["Ayla", "Zed"]);
        assert_eq!(view.mobiles, vec!["a sewer rat is standing."]);
        assert_eq!(view.objects, vec!["a bent nail is here."]);
        assert_eq!(view.area_name, "Town");
    }

    #[test]
    fn say_reaches_room_only() {
        let world = two_room_world();
        let ayla = join(&world, "Ayla");
        let brin = join(&world, "Brin");
        let cato = join(&world, "Cato");
        world.move_player("Cato", "north").unwrap();
        world.broadcast_say("Ayla", "hello");
        assert_eq!(ayla.contents(), "You say 'hello'\n");
        assert_eq!(brin.contents(), "Ayla says 'hello'\n");
        assert!(cato.contents().is_empty());
    }

    #[test]
    fn chat_reaches_everyone() {
        let world = two_room_world();
        let ayla = join(&world, "Ayla");
        let cato = join(&world, "Cato");
        world.move_player("Cato", "north").unwrap();
        world.broadcast_chat("Ayla", "hi all");
        assert!(ayla.contents().contains("You chat 'hi all'"));
        assert!(cato.contents().contains("Ayla chats 'hi all'"));
    }

    #[test]
    fn find_player_prefers_exact_name() {
        let world = two_room_world();
        join(&world, "Ann");
        join(&world, "Annabel");
        join(&world, "Bob");
        assert_eq!(world.find_player_in_room("Bob", "ann").unwrap().name, "Ann");
        assert_eq!(world.find_player_in_room("Bob", "annab").unwrap().name, "Annabel");
        assert!(world.find_player_in_room("Bob", "bob").is_none());
    }

    #[test]
    fn pickup_moves_object_out_of_room() {
        let world = two_room_world();
        join(&world, "Ayla");
        let mut obj = Object::new(7, "trash", "a smooth stone");
        obj.keywords = vec!["stone".into()];
        let id = obj.id;
        world.write().rooms.get_mut(&100).unwrap().objects.push(obj);

        let found = world.find_object_in_room("Ayla", "stone").unwrap();
        assert_eq!(found.id, id);
        world.pick_up_object("Ayla", id).unwrap();
        assert!(world.find_object_in_room("Ayla", "stone").is_none());
        assert_eq!(world.find_object_in_inventory("Ayla", "stone").unwrap().id, id);
        assert!(matches!(
            world.pick_up_object("Ayla", id),
            Err(WorldError::ObjectNotFound)
        ));

        world.drop_object("Ayla", id).unwrap();
        assert!(world.find_object_in_inventory("Ayla", "stone").is_none());
        assert!(world.find_object_in_room("Ayla", "stone").is_some());
    }

    #[test]
    fn equip_rejects_occupied_and_empty_slots() {
        let world = two_room_world();
        join(&world, "Ayla");
        let cap = Object::new(1, "armor", "a leather cap");
        let hood = Object::new(2, "armor", "a wool hood");
        let (cap_id, hood_id) = (cap.id, hood.id);
        world.with_player_mut("Ayla", |p| {
            p.inventory.push(cap);
            p.inventory.push(hood);
        });

        world.equip_object("Ayla", cap_id, EquipSlot::Head).unwrap();
        assert!(matches!(
            world.equip_object("Ayla", hood_id, EquipSlot::Head),
            Err(WorldError::SlotOccupied(EquipSlot::Head))
        ));
        assert_eq!(world.with_player("Ayla", |p| p.inventory.len()), Some(1));

        let (slot, worn) = world.find_object_in_equipment("Ayla", "cap").unwrap();
        assert_eq!((slot, worn.id), (EquipSlot::Head, cap_id));

        world.unequip_object("Ayla", EquipSlot::Head).unwrap();
        assert!(matches!(
            world.unequip_object("Ayla", EquipSlot::Head),
            Err(WorldError::SlotEmpty(EquipSlot::Head))
        ));
        assert_eq!(world.with_player("Ayla", |p| p.inventory.len()), Some(2));
    }

    #[test]
    fn damage_kills_and_loots() {
        let world = two_room_world();
        join(&world, "Ayla");
        let mob = rat();
        let id = mob.id;
        world.write().rooms.get_mut(&100).unwrap().mobiles.push(mob);

        assert_eq!(
            world.damage_mob("Ayla", id, 4),
            Ok(DamageOutcome::Wounded { hp: 6, max_hp: 10 })
        );
        let outcome = world.damage_mob("Ayla", id, 50).unwrap();
        assert_eq!(
            outcome,
            DamageOutcome::Killed {
                loot: vec!["3 gold coins".to_string()]
            }
        );
        assert!(world.find_mob_in_room("Ayla", "rat").is_none());
        assert_eq!(world.with_player("Ayla", |p| p.gold), Some(3));
        assert_eq!(world.damage_mob("Ayla", id, 1), Err(WorldError::MobNotFound));
    }

    #[test]
    fn find_mob_keyword_then_short() {
        let world = two_room_world();
        join(&world, "Ayla");
        world.write().rooms.get_mut(&100).unwrap().mobiles.push(rat());
        assert!(world.find_mob_in_room("Ayla", "VERMIN").is_some());
        assert!(world.find_mob_in_room("Ayla", "sewer").is_some());
        assert!(world.find_mob_in_room("Ayla", "dragon").is_none());
    }

    #[test]
    fn spawn_and_teleport() {
        let world = two_room_world().with_prototypes(BTreeMap::from([(500, rat())]), BTreeMap::new());
        join(&world, "Ayla");
        let a = world.spawn_mob("Ayla", 500).unwrap();
        let b = world.spawn_mob("Ayla", 500).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(world.room_mobiles("Ayla").len(), 2);
        assert!(matches!(
            world.spawn_mob("Ayla", 1),
            Err(WorldError::PrototypeNotFound(1))
        ));

        assert_eq!(world.teleport("Ayla", 101).unwrap().name, "North Gate");
        assert_eq!(world.teleport("Ayla", 5), Err(WorldError::RoomNotFound));
    }

    #[test]
    fn remove_is_idempotent() {
        let world = two_room_world();
        join(&world, "Ayla");
        assert!(world.remove_player("ayla").is_some());
        assert!(world.remove_player("ayla").is_none());
        assert!(world.list_players().is_empty());
    }

    #[test]
    fn empty_world_gets_default_room() {
        let world = World::new(BTreeMap::new(), 0);
        assert_eq!(world.start_room(), 1);
        assert!(world.has_room(1));
        join(&world, "Ayla");
        assert_eq!(world.describe_room("Ayla").unwrap().name, "The Crossroads");
    }

    #[test]
    fn extra_descriptions_by_keyword() {
        let world = two_room_world();
        world
            .write()
            .rooms
            .get_mut(&100)
            .unwrap()
            .extra_descriptions
            .insert("fountain".into(), "Water bubbles up.".into());
        join(&world, "Ayla");
        assert_eq!(
            world.find_room_extra_description("Ayla", " Fountain ").as_deref(),
            Some("Water bubbles up.")
        );
        assert!(world.find_room_extra_description("Ayla", "").is_none());
    }
}
