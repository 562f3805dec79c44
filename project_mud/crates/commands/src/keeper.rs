//! Administrative commands. Only keepers may use them.

use crate::context::Context;
use crate::display::{capitalize_name, display_room_view};

fn authorized(ctx: &Context) -> bool {
    let allowed = ctx
        .world
        .with_player(&ctx.player, |p| p.is_keeper)
        .unwrap_or(false);
    if !allowed {
        ctx.send("You do not have the authority to do that.");
    }
    allowed
}

fn set_keeper(ctx: &Context, args: &str, grant: bool) {
    if !authorized(ctx) {
        return;
    }
    let target = args.trim();
    if target.is_empty() {
        if grant {
            ctx.send("Usage: makekeeper <player>");
        } else {
            ctx.send("Usage: removekeeper <player>");
        }
        return;
    }
    if !grant && target.eq_ignore_ascii_case(&ctx.player) {
        ctx.send("You cannot remove your own keeper status.");
        return;
    }

    let changed = ctx.world.with_player_mut(target, |p| {
        let was = p.is_keeper;
        p.is_keeper = grant;
        (was, p.name.clone(), p.output.clone())
    });
    let Some((was, name, output)) = changed else {
        ctx.send(&format!("Player '{}' is not online.", target));
        return;
    };
    let name = capitalize_name(&name);

    match (grant, was) {
        (true, true) => ctx.send(&format!("{} is already a keeper.", name)),
        (false, false) => ctx.send(&format!("{} is not a keeper.", name)),
        (true, false) => {
            tracing::info!(by = %ctx.player, target = %name, "Keeper granted");
            ctx.send(&format!("&G{} is now a keeper.&w", name));
            output.write_line("&GYou have been granted keeper status.&w");
        }
        (false, true) => {
            tracing::info!(by = %ctx.player, target = %name, "Keeper revoked");
            ctx.send(&format!("&Y{} is no longer a keeper.&w", name));
            output.write_line("&YYour keeper status has been revoked.&w");
        }
    }
}

pub fn makekeeper(ctx: &Context, args: &str) {
    set_keeper(ctx, args, true);
}

pub fn removekeeper(ctx: &Context, args: &str) {
    set_keeper(ctx, args, false);
}

pub fn spawn(ctx: &Context, args: &str) {
    if !authorized(ctx) {
        return;
    }
    let mut words = args.split_whitespace();
    let (Some(kind), Some(vnum)) = (words.next(), words.next()) else {
        ctx.send("Usage: spawn mob <vnum>");
        ctx.send("Example: spawn mob 3001");
        return;
    };
    if !kind.eq_ignore_ascii_case("mob") {
        ctx.send("Usage: spawn mob <vnum>");
        return;
    }
    let Ok(vnum) = vnum.parse() else {
        ctx.send("Invalid vnum. Must be a number.");
        return;
    };

    match ctx.world.spawn_mob(&ctx.player, vnum) {
        Ok(mob) => {
            tracing::info!(by = %ctx.player, vnum, mob = %mob.short, "Mobile spawned");
            ctx.send(&format!("&GYou summon {} into existence!&w", mob.short));
            ctx.world.broadcast_system_to_room_except(
                &ctx.player,
                &format!("{} appears in a flash of light!", mob.short),
            );
        }
        Err(e) => ctx.send(&format!("Failed to spawn mob: {}", e)),
    }
}

pub fn teleport(ctx: &Context, args: &str) {
    if !authorized(ctx) {
        return;
    }
    let arg = args.trim();
    if arg.is_empty() {
        ctx.send("Usage: teleport <room vnum>");
        return;
    }
    let Ok(vnum) = arg.parse() else {
        ctx.send("Invalid room vnum.");
        return;
    };
    let Some(from) = ctx.world.with_player(&ctx.player, |p| p.location) else {
        return;
    };
    match ctx.world.teleport(&ctx.player, vnum) {
        Ok(view) => {
            let shown = capitalize_name(&ctx.player);
            ctx.world.broadcast_to_room(
                from,
                &format!("{} vanishes in a shimmer of light.", shown),
                Some(ctx.player.as_str()),
            );
            ctx.world.broadcast_system_to_room_except(
                &ctx.player,
                &format!("{} appears in a shimmer of light.", shown),
            );
            ctx.send(&format!("You teleport to room {}.", vnum));
            let auto_exits = ctx
                .world
                .with_player(&ctx.player, |p| p.auto_exits)
                .unwrap_or(true);
            display_room_view(ctx.output.as_ref(), &view, auto_exits);
        }
        Err(_) => ctx.send(&format!("Room {} does not exist.", vnum)),
    }
}

pub fn restore(ctx: &Context, _args: &str) {
    if !authorized(ctx) {
        return;
    }
    let pools = ctx.world.with_player_mut(&ctx.player, |p| {
        p.hp = p.max_hp;
        p.mana = p.max_mana;
        (p.hp, p.max_hp, p.mana, p.max_mana)
    });
    if let Some((hp, max_hp, mana, max_mana)) = pools {
        ctx.send("&GRestored to full HP and Mana!&w");
        ctx.send(&format!("HP: {}/{} | Mana: {}/{}", hp, max_hp, mana, max_mana));
    }
}
