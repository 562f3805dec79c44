pub mod abilities;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod help;
pub mod info;
pub mod items;
pub mod keeper;
pub mod movement;
pub mod parser;

use std::sync::{Arc, OnceLock};

pub use context::{Context, HelpLoadError, HelpTopic, HelpTopics};
pub use dispatcher::{Dispatcher, Handler};
pub use display::{display_room_view, format_exits};
pub use info::show_room;
pub use parser::parse_input;

/// Reply to input that names no command.
pub const UNKNOWN_COMMAND: &str = "Huh? Type 'help' for commands.";

/// Install every built-in verb. Order matters for prefix resolution: `l`
/// is `look`, `sa` is `say`. Single-letter directions are exact aliases, so
/// `s` and `n` always move.
pub fn register_builtins(d: &mut Dispatcher) {
    d.register("look", info::look);
    d.register("consider", info::consider);
    d.register("say", info::say);
    d.register("chat", info::chat);
    d.register("who", info::who);
    d.register("stats", info::stats);
    d.register("score", info::stats);
    d.register("inventory", info::inventory);
    d.register("inv", info::inventory);
    d.register("equipment", info::equipment);
    d.register("wear", items::wear);
    d.register("remove", items::remove);
    d.register("get", items::get);
    d.register("drop", items::drop);
    d.register("hair", info::hair);
    d.register("eyes", info::eyes);
    d.register("exits", info::exits);
    d.register("autoexits", info::autoexits);
    d.register("astat", info::astat);
    d.register("abilities", abilities::abilities);
    d.register("cast", abilities::cast);
    d.register("slash", abilities::slash);
    d.register("power", abilities::power_attack);
    d.register("powerattack", abilities::power_attack);
    d.register("riposte", abilities::riposte);
    d.register("cleave", abilities::cleave);
    d.register("defensive", abilities::defensive_stance);
    d.register("defensivestance", abilities::defensive_stance);
    d.register("study", abilities::study);
    d.register("train", abilities::train);
    d.register("save", info::save);
    d.register("makekeeper", keeper::makekeeper);
    d.register("removekeeper", keeper::removekeeper);
    d.register("spawn", keeper::spawn);
    d.register("teleport", keeper::teleport);
    d.register("restore", keeper::restore);

    let commands: Arc<OnceLock<Vec<String>>> = Arc::new(OnceLock::new());
    let listed = Arc::clone(&commands);
    d.register("help", move |ctx: &Context, args: &str| {
        let names = listed.get().map(Vec::as_slice).unwrap_or(&[]);
        help::help(ctx, args, names);
    });
    d.register("quit", info::quit);

    for (direction, _) in movement::DIRECTIONS {
        d.register(direction, move |ctx: &Context, _: &str| movement::go(ctx, direction));
    }
    for (direction, short) in movement::DIRECTIONS {
        d.register(short, move |ctx: &Context, _: &str| movement::go(ctx, direction));
    }

    let _ = commands.set(d.list());
}

/// Parse and run one line of player input. Blank lines are ignored.
pub fn run_line(dispatcher: &Dispatcher, ctx: &Context, line: &str) {
    let Some((verb, args)) = parse_input(line) else {
        return;
    };
    if !dispatcher.execute(ctx, &verb, args) {
        ctx.send(UNKNOWN_COMMAND);
    }
}
