use thiserror::Error;

use crate::model::{EquipSlot, Vnum};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("name must be 3-16 letters or digits")]
    NameInvalid,

    #[error("name already in use")]
    NameInUse,

    #[error("no exit")]
    NoExit,

    #[error("room not found")]
    RoomNotFound,

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("already wearing something on {0}")]
    SlotOccupied(EquipSlot),

    #[error("nothing worn on {0}")]
    SlotEmpty(EquipSlot),

    #[error("object not found")]
    ObjectNotFound,

    #[error("mobile not found")]
    MobNotFound,

    #[error("no prototype for vnum {0}")]
    PrototypeNotFound(Vnum),
}

#[derive(Debug, Error)]
pub enum AreaLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
