//! Ordered writes of live player state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mud::World;

use crate::db::PlayerStore;
use crate::error::PlayerDbError;
use crate::record::PlayerRecord;

/// Funnels every save of an online player through one gate. Records are
/// captured from the world while the gate is held, so writes land in the
/// same order as the snapshots they carry.
///
/// All methods block on the store; async callers run them on
/// `spawn_blocking`.
pub struct PlayerSaver {
    store: Arc<dyn PlayerStore>,
    gate: Mutex<()>,
}

impl PlayerSaver {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn load(&self, name: &str) -> Result<Option<PlayerRecord>, PlayerDbError> {
        self.store.load(name)
    }

    /// Save one player as they are right now. `Ok(false)` if they are not
    /// online.
    pub fn save_online(&self, world: &World, name: &str) -> Result<bool, PlayerDbError> {
        let _gate = self.lock();
        let Some(record) = world.with_player(name, PlayerRecord::capture) else {
            return Ok(false);
        };
        self.store.save(&record)?;
        Ok(true)
    }

    /// Take a player out of the world and save what they left with. The
    /// player is removed even if the write fails.
    pub fn retire(&self, world: &World, name: &str) -> Result<bool, PlayerDbError> {
        let _gate = self.lock();
        let Some(player) = world.remove_player(name) else {
            return Ok(false);
        };
        self.store.save(&PlayerRecord::capture(&player))?;
        Ok(true)
    }

    /// Save everyone online. Returns how many saved cleanly.
    pub fn save_all(&self, world: &World) -> usize {
        let _gate = self.lock();
        world
            .players_snapshot()
            .iter()
            .map(PlayerRecord::capture)
            .filter(|record| match self.store.save(record) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(player = %record.name, error = %e, "Save failed");
                    false
                }
            })
            .count()
    }
}
