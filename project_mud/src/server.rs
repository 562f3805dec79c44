use std::sync::Arc;
use std::time::{Duration, Instant};

use commands::{Dispatcher, HelpTopics};
use mud::World;
use net::Connection;
use observability::LoopMetrics;
use player_db::{PlayerSaver, PlayerStore};
use skills::AbilityCatalog;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::login::run_session;
use crate::shutdown::wait_for_shutdown;

/// State every session and background loop shares.
pub struct Shared {
    pub world: Arc<World>,
    pub catalog: Arc<AbilityCatalog>,
    pub saver: Arc<PlayerSaver>,
    pub help: Arc<HelpTopics>,
    pub dispatcher: Dispatcher,
}

impl Shared {
    /// Wire the built-in command set around a world and store.
    pub fn new(
        world: World,
        catalog: AbilityCatalog,
        store: Arc<dyn PlayerStore>,
        help: HelpTopics,
    ) -> Self {
        let mut dispatcher = Dispatcher::new();
        commands::register_builtins(&mut dispatcher);
        tracing::info!(commands = dispatcher.len(), "Commands registered");
        Self {
            world: Arc::new(world),
            catalog: Arc::new(catalog),
            saver: Arc::new(PlayerSaver::new(store)),
            help: Arc::new(help),
            dispatcher,
        }
    }
}

/// Accept players until shutdown.
pub async fn serve(
    listener: TcpListener,
    shared: Arc<Shared>,
    shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    net::run_tcp_server(listener, shutdown_rx, move |conn: Connection| {
        run_session(conn, Arc::clone(&shared))
    })
    .await
}

/// Run the respawn scheduler every `every`. The first tick fires at once
/// and only records each area's baseline.
pub async fn respawn_loop(
    world: Arc<World>,
    default_minutes: u32,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    let mut iteration = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();
                let report = world.respawn_tick(default_minutes, Some(&observability::log_line));
                LoopMetrics {
                    loop_name: "respawn",
                    iteration,
                    duration_us: start.elapsed().as_micros(),
                    items: report.respawned.len(),
                }
                .log();
                iteration += 1;
            }
            _ = wait_for_shutdown(&mut shutdown_rx) => break,
        }
    }
    tracing::debug!("respawn loop stopped");
}

/// Save every connected player every `every`.
pub async fn autosave_loop(
    world: Arc<World>,
    saver: Arc<PlayerSaver>,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    let mut iteration = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();
                let saved = save_all(Arc::clone(&world), Arc::clone(&saver)).await;
                LoopMetrics {
                    loop_name: "autosave",
                    iteration,
                    duration_us: start.elapsed().as_micros(),
                    items: saved,
                }
                .log();
                iteration += 1;
            }
            _ = wait_for_shutdown(&mut shutdown_rx) => break,
        }
    }
    tracing::debug!("autosave loop stopped");
}

/// Save every connected player off the async threads. Returns how many
/// saved cleanly.
pub async fn save_all(world: Arc<World>, saver: Arc<PlayerSaver>) -> usize {
    match tokio::task::spawn_blocking(move || saver.save_all(&world)).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::error!("save task failed: {}", e);
            0
        }
    }
}

/// Final save before exit, then tell everyone still connected.
pub async fn shutdown_world(world: Arc<World>, saver: Arc<PlayerSaver>) -> usize {
    let saved = save_all(Arc::clone(&world), saver).await;
    world.broadcast_all("&YThe world fades as the server shuts down. Your progress has been saved.&w");
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use mud::{CaptureOutput, Player};
    use player_db::PlayerDb;

    fn online(world: &World, name: &str, gold: i32) -> Arc<CaptureOutput> {
        let out = Arc::new(CaptureOutput::new());
        let mut player = Player::new(name, out.clone());
        player.gold = gold;
        world.add_player(player).unwrap();
        out
    }

    #[tokio::test]
    async fn shutdown_saves_and_warns_everyone() {
        let world = Arc::new(World::default_world());
        let ayla = online(&world, "Ayla", 7);
        let brin = online(&world, "Brin", 9);
        let db = Arc::new(PlayerDb::open_memory().unwrap());
        let saver = Arc::new(PlayerSaver::new(db.clone()));

        assert_eq!(shutdown_world(Arc::clone(&world), saver).await, 2);
        assert_eq!(db.load("brin").unwrap().unwrap().gold, 9);
        for out in [ayla, brin] {
            assert!(out.contents().contains("server shuts down"));
        }
    }

    #[tokio::test]
    async fn autosave_runs_until_shutdown() {
        let world = Arc::new(World::default_world());
        online(&world, "Ayla", 3);
        let db = Arc::new(PlayerDb::open_memory().unwrap());
        let saver = Arc::new(PlayerSaver::new(db.clone()));
        let (tx, rx) = crate::shutdown_channel();

        let task = tokio::spawn(autosave_loop(
            Arc::clone(&world),
            saver,
            Duration::from_millis(10),
            rx,
        ));
        for _ in 0..100 {
            if db.load("ayla").unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(db.load("ayla").unwrap().unwrap().gold, 3);

        tx.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
