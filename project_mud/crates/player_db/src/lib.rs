pub mod db;
pub mod error;
pub mod record;
pub mod saver;
mod schema;

pub use db::{PlayerDb, PlayerStore};
pub use error::PlayerDbError;
pub use record::{PlayerRecord, PlayerRepo};
pub use saver::PlayerSaver;
