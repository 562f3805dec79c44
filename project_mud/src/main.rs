use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use commands::HelpTopics;
use player_db::{PlayerDb, PlayerStore};
use project_mud::{
    autosave_loop, respawn_loop, serve, shutdown_channel, shutdown_world, wait_for_signal,
    ServerConfig, Shared,
};
use skills::AbilityCatalog;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "mud_server")]
#[command(about = "Multiplayer text-world server")]
#[command(version)]
struct Cli {
    /// TCP port to listen on
    #[arg(short, long, default_value_t = 4000)]
    port: u16,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Everything loaded before the listener opens.
fn load_shared(config: &ServerConfig) -> Result<Shared, String> {
    let areas = mud::load_areas(Path::new(&config.areas_dir)).map_err(|e| e.to_string())?;
    let world = areas.into_world(config.start_room_vnum);
    tracing::info!(
        rooms = world.room_count(),
        start = world.start_room(),
        "World loaded"
    );

    let abilities = Path::new(&config.abilities_path);
    let catalog = if abilities.exists() {
        AbilityCatalog::load(abilities).map_err(|e| e.to_string())?
    } else {
        tracing::warn!(path = %abilities.display(), "Ability file not found, using built-in abilities");
        AbilityCatalog::builtin().map_err(|e| e.to_string())?
    };

    let help = HelpTopics::load(Path::new(&config.help_path)).map_err(|e| e.to_string())?;

    let db = PlayerDb::open(&config.database.path).map_err(|e| e.to_string())?;
    let store: Arc<dyn PlayerStore> = Arc::new(db);

    Ok(Shared::new(world, catalog, store, help))
}

#[tokio::main]
async fn main() -> ExitCode {
    observability::init_logging();
    let cli = Cli::parse();

    let config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("MUD server starting...");

    let shared = match load_shared(&config) {
        Ok(shared) => Arc::new(shared),
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let addr = format!("{}:{}", config.net.bind_host, cli.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    tokio::spawn(respawn_loop(
        Arc::clone(&shared.world),
        config.respawn_default_minutes,
        config.respawn_interval(),
        shutdown_rx.clone(),
    ));
    tokio::spawn(autosave_loop(
        Arc::clone(&shared.world),
        Arc::clone(&shared.saver),
        config.autosave_interval(),
        shutdown_rx.clone(),
    ));
    let mut server = tokio::spawn(serve(listener, Arc::clone(&shared), shutdown_rx));

    tokio::select! {
        _ = wait_for_signal() => {
            tracing::info!("Shutdown signal received, stopping server...");
            shutdown_tx.trigger();
            let _ = tokio::time::timeout(Duration::from_secs(2), &mut server).await;
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!("TCP server error: {}", e);
                    return ExitCode::FAILURE;
                }
                Err(e) => {
                    tracing::error!("TCP server task failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    let saved = shutdown_world(Arc::clone(&shared.world), Arc::clone(&shared.saver)).await;
    tracing::info!(saved, "Server stopped.");
    ExitCode::SUCCESS
}
