//! One player's connection from first byte to goodbye.

use std::sync::Arc;

use commands::display::capitalize_name;
use commands::Context;
use mud::kits::{self, STARTER_SPELL};
use mud::{validate_name, Output, Player};
use net::{Connection, ConnectionWriter, LineReader};
use session::{SessionLifecycle, SessionState};
use tokio::io::AsyncRead;

use crate::server::Shared;

pub const BANNER: &str = "\
&C      ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
&C      ~~                                                ~~
&C      ~~   &YThe Hearth of Many Roads&C                     ~~
&C      ~~                                                ~~
&C      ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~&w

Greetings, traveler! Pull up a chair by the fire and stay a while.
If you have any questions, ask for &Whelp&w once you have logged in.";

/// Routes world output for one player to its connection.
pub struct SessionOutput(pub ConnectionWriter);

impl Output for SessionOutput {
    fn write(&self, text: &str) {
        self.0.write(text);
    }

    fn write_line(&self, text: &str) {
        self.0.write_line(text);
    }

    fn request_disconnect(&self, reason: &str) {
        self.0.request_disconnect(reason);
    }
}

pub async fn run_session(conn: Connection, shared: Arc<Shared>) {
    let Connection {
        session_id,
        peer_addr,
        mut reader,
        writer,
    } = conn;
    let mut lifecycle = SessionLifecycle::new(session_id);
    let output: Arc<dyn Output> = Arc::new(SessionOutput(writer.clone()));

    for line in BANNER.lines() {
        writer.write_line(line);
    }
    writer.write_line("");
    writer.write_line("");

    lifecycle.advance(SessionState::Authenticating);
    let Some(name) = authenticate(&shared, &mut reader, &writer, &output).await else {
        lifecycle.advance(SessionState::Disconnecting);
        lifecycle.advance(SessionState::Closed);
        return;
    };
    lifecycle.advance(SessionState::Playing);
    tracing::info!(%session_id, %peer_addr, player = %name, "Player entered the game");

    let ctx = Context {
        world: Arc::clone(&shared.world),
        player: name.clone(),
        output: Arc::clone(&output),
        catalog: Arc::clone(&shared.catalog),
        saver: Arc::clone(&shared.saver),
        help: Arc::clone(&shared.help),
    };
    let shown = capitalize_name(&name);
    shared
        .world
        .broadcast_system_to_room_except(&name, &format!("{} has entered the game.", shown));
    ctx.send(&format!("Welcome back, {}!", shown));
    commands::show_room(&ctx);

    play(&shared, &ctx, &mut reader, &writer).await;

    lifecycle.advance(SessionState::Disconnecting);
    leave(&shared, &name).await;
    lifecycle.advance(SessionState::Closed);
    tracing::info!(%session_id, player = %name, "Player left the game");
}

async fn play<R: AsyncRead + Unpin>(
    shared: &Shared,
    ctx: &Context,
    reader: &mut LineReader<R>,
    writer: &ConnectionWriter,
) {
    loop {
        if writer.is_disconnect_requested() {
            return;
        }
        writer.write("> ");
        let line = match reader.read_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(player = %ctx.player, error = %e, fragment = ?e.fragment(), "Read loop ended");
                return;
            }
        };
        commands::run_line(&shared.dispatcher, ctx, &line);
    }
}

/// Prompt for a name until one is valid and free, restoring or creating the
/// character. Returns the registered name, or `None` if the peer left.
async fn authenticate<R: AsyncRead + Unpin>(
    shared: &Shared,
    reader: &mut LineReader<R>,
    writer: &ConnectionWriter,
    output: &Arc<dyn Output>,
) -> Option<String> {
    loop {
        writer.write("Name: ");
        let line = reader.read_line().await.ok()?;
        let name = line.trim();
        if validate_name(name).is_err() {
            writer.write_line("Invalid name. Use 3-16 letters or digits.");
            continue;
        }
        if shared.world.is_online(name) {
            writer.write_line("That name is already in use.");
            continue;
        }

        let record = match shared.saver.load(name) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(player = %name, error = %e, "Failed to load character");
                writer.write_line("Error loading character. Please try again.");
                continue;
            }
        };

        let player = match record {
            Some(record) => record.restore(Arc::clone(output)),
            None => {
                let mut player = Player::new(name, Arc::clone(output));
                choose_kit(reader, writer, &mut player).await?;
                kits::grant_starter_spell(&mut player);
                if let Some(spell) = shared.catalog.get(STARTER_SPELL) {
                    writer.write_line(&format!(
                        "You have learned &Y{}&w as your first spell!",
                        spell.name
                    ));
                }
                tracing::info!(player = %name, "New character created");
                player
            }
        };

        let registered = player.name.clone();
        match shared.world.add_player(player) {
            Ok(()) => return Some(registered),
            Err(_) => writer.write_line("That name is already in use."),
        }
    }
}

async fn choose_kit<R: AsyncRead + Unpin>(
    reader: &mut LineReader<R>,
    writer: &ConnectionWriter,
    player: &mut Player,
) -> Option<()> {
    writer.write_line("");
    writer.write_line("=== CHOOSE YOUR STARTING KIT ===");
    writer.write_line("");
    writer.write(&kits::menu());
    loop {
        writer.write(&format!("Choice (1-{}): ", kits::KITS.len()));
        let line = reader.read_line().await.ok()?;
        let Some(kit) = kits::by_menu_choice(&line) else {
            writer.write_line("Invalid choice. Please try again.");
            continue;
        };
        kit.apply(player);
        writer.write_line("");
        writer.write_line(kit.flavor);
        writer.write_line(&format!("You take up the {}.", kit.name));
        return Some(());
    }
}

/// Tell the room, then take the player out of the world and save them.
async fn leave(shared: &Shared, name: &str) {
    shared.world.broadcast_system_to_room_except(
        name,
        &format!("{} has left the game.", capitalize_name(name)),
    );
    let world = Arc::clone(&shared.world);
    let saver = Arc::clone(&shared.saver);
    let leaving = name.to_string();
    match tokio::task::spawn_blocking(move || saver.retire(&world, &leaving)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(player = %name, error = %e, "Failed to save on disconnect"),
        Err(e) => {
            tracing::error!(player = %name, "save task failed: {}", e);
            shared.world.remove_player(name);
        }
    }
}
