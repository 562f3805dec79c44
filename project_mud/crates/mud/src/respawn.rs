use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::model::{Mobile, Object, Room, Vnum};
use crate::world::{World, WorldState};

/// What one respawn tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RespawnReport {
    /// Areas considered this tick.
    pub monitored: usize,
    /// `"<area> (next in Nm)"` or `"<area> (initial, next in Nm)"`.
    pub respawned: Vec<String>,
}

impl RespawnReport {
    pub fn summary(&self) -> String {
        if self.respawned.is_empty() {
            format!("Respawn tick: no areas ready ({} monitored)", self.monitored)
        } else {
            format!(
                "Respawn tick: {}/{} areas respawned - {}",
                self.respawned.len(),
                self.monitored,
                self.respawned.join(", ")
            )
        }
    }
}

impl World {
    pub fn respawn_tick(&self, default_minutes: u32, logger: Option<&dyn Fn(&str)>) -> RespawnReport {
        self.respawn_tick_at(Instant::now(), default_minutes, logger)
    }

    /// Repopulate every area whose reset interval has elapsed by `now`.
    ///
    /// The first tick for an area only records a baseline so load-time
    /// content is not doubled. A due area is cleared and rebuilt from its
    /// resets; resets naming a missing prototype are skipped.
    pub fn respawn_tick_at(
        &self,
        now: Instant,
        default_minutes: u32,
        logger: Option<&dyn Fn(&str)>,
    ) -> RespawnReport {
        let report = {
            let mut state = self.write();
            tick_areas(&mut state, now, default_minutes)
        };
        if let Some(log) = logger {
            log(&report.summary());
        }
        report
    }
}

fn tick_areas(state: &mut WorldState, now: Instant, default_minutes: u32) -> RespawnReport {
    let WorldState {
        rooms,
        mob_protos,
        obj_protos,
        area_last_respawn,
        ..
    } = state;

    let mut areas: BTreeMap<String, Vec<Vnum>> = BTreeMap::new();
    for room in rooms.values() {
        areas
            .entry(room.area_key().to_string())
            .or_default()
            .push(room.vnum);
    }

    let mut report = RespawnReport {
        monitored: areas.len(),
        respawned: Vec::new(),
    };

    for (area, vnums) in &areas {
        let Some(first) = vnums.first().and_then(|v| rooms.get(v)) else {
            continue;
        };
        let minutes = if first.area_reset_minutes > 0 {
            first.area_reset_minutes
        } else {
            default_minutes
        };

        let Some(last) = area_last_respawn.get(area).copied() else {
            area_last_respawn.insert(area.clone(), now);
            report
                .respawned
                .push(format!("{} (initial, next in {}m)", area, minutes));
            continue;
        };

        let interval = Duration::from_secs(u64::from(minutes) * 60);
        if now.saturating_duration_since(last) < interval {
            continue;
        }

        for vnum in vnums {
            if let Some(room) = rooms.get_mut(vnum) {
                repopulate(room, mob_protos, obj_protos);
            }
        }
        area_last_respawn.insert(area.clone(), now);
        report.respawned.push(format!("{} (next in {}m)", area, minutes));
    }

    report
}

fn repopulate(
    room: &mut Room,
    mob_protos: &BTreeMap<Vnum, Mobile>,
    obj_protos: &BTreeMap<Vnum, Object>,
) {
    room.mobiles.clear();
    room.objects.clear();

    for reset in &room.mobile_resets {
        match mob_protos.get(&reset.vnum) {
            Some(proto) => room
                .mobiles
                .extend((0..reset.count).map(|_| proto.instantiate())),
            None => tracing::debug!(room = room.vnum, vnum = reset.vnum, "Missing mobile prototype"),
        }
    }
    for reset in &room.object_resets {
        match obj_protos.get(&reset.vnum) {
            Some(proto) => room
                .objects
                .extend((0..reset.count).map(|_| proto.instantiate())),
            None => tracing::debug!(room = room.vnum, vnum = reset.vnum, "Missing object prototype"),
        }
    }
}

/// Populate every room from its resets once, at load.
pub(crate) fn populate_all(state: &mut WorldState) {
    let WorldState {
        rooms,
        mob_protos,
        obj_protos,
        ..
    } = state;
    for room in rooms.values_mut() {
        repopulate(room, mob_protos, obj_protos);
    }
}
