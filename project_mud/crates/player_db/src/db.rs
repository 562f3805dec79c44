use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::error::PlayerDbError;
use crate::record::{PlayerRecord, PlayerRepo};
use crate::schema;

/// The two persistence entry points the server needs.
pub trait PlayerStore: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<PlayerRecord>, PlayerDbError>;
    fn save(&self, record: &PlayerRecord) -> Result<(), PlayerDbError>;
}

/// Main database handle wrapping a SQLite connection.
pub struct PlayerDb {
    conn: Mutex<Connection>,
}

impl PlayerDb {
    /// Open (or create) a database at the given file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlayerDbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::create_tables(&conn)?;
        tracing::info!(path = %path.display(), "Player database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self, PlayerDbError> {
        let conn = Connection::open_in_memory()?;
        schema::create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the player repository.
    pub fn players<R>(&self, f: impl FnOnce(PlayerRepo<'_>) -> R) -> R {
        let conn = self.lock();
        f(PlayerRepo::new(&conn))
    }
}

impl PlayerStore for PlayerDb {
    fn load(&self, name: &str) -> Result<Option<PlayerRecord>, PlayerDbError> {
        self.players(|repo| repo.load(name))
    }

    fn save(&self, record: &PlayerRecord) -> Result<(), PlayerDbError> {
        self.players(|repo| repo.save(record))?;
        tracing::debug!(player = %record.name, "Player saved");
        Ok(())
    }
}
