pub mod config;
pub mod login;
pub mod server;
pub mod shutdown;

pub use config::{ConfigError, ServerConfig};
pub use server::{autosave_loop, respawn_loop, save_all, serve, shutdown_world, Shared};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownTx};
