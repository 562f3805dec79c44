pub mod area;
pub mod error;
pub mod kits;
pub mod model;
pub mod output;
pub mod respawn;
pub mod world;

pub use area::{load_areas, AreaSet};
pub use error::{AreaLoadError, WorldError};
pub use model::{
    EquipSlot, MobId, Mobile, Object, ObjectId, Player, Reset, Room, RoomView, TrainerInfo, Vnum,
};
pub use output::{CaptureOutput, Output};
pub use respawn::RespawnReport;
pub use world::{validate_name, DamageOutcome, World};
