use rusqlite::Connection;

use crate::error::PlayerDbError;

pub fn create_tables(conn: &Connection) -> Result<(), PlayerDbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS players (
            name       TEXT PRIMARY KEY COLLATE NOCASE,
            record     TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            last_saved TEXT
        );
        ",
    )?;
    Ok(())
}
