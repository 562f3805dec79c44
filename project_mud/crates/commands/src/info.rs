//! Looking around, talking, and the character sheet.

use std::sync::Arc;

use mud::{EquipSlot, Mobile, Player};
use skills::Stat;

use crate::context::{run_blocking, Context};
use crate::display::{capitalize, capitalize_name, display_room_view, format_exits};

pub fn look(ctx: &Context, args: &str) {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        show_room(ctx);
        return;
    }

    let keyword = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("in ") => trimmed[3..].trim(),
        _ => trimmed,
    };

    if keyword.eq_ignore_ascii_case("me") || keyword.eq_ignore_ascii_case("self") {
        if let Some(me) = ctx.me() {
            describe_player(ctx, &me);
        }
        return;
    }
    if let Some(other) = ctx.world.find_player_in_room(&ctx.player, keyword) {
        describe_player(ctx, &other);
        return;
    }
    if let Some(mob) = ctx.world.find_mob_in_room(&ctx.player, keyword) {
        ctx.send(&mob.long);
        return;
    }
    if let Some(obj) = ctx
        .world
        .find_object_in_room(&ctx.player, keyword)
        .or_else(|| ctx.world.find_object_in_inventory(&ctx.player, keyword))
    {
        ctx.send(&obj.long);
        return;
    }
    match ctx.world.find_room_extra_description(&ctx.player, keyword) {
        Some(desc) => ctx.send(&desc),
        None => ctx.send("You see nothing special."),
    }
}

/// Describe the player's current room the way `look` does.
pub fn show_room(ctx: &Context) {
    let auto_exits = ctx
        .world
        .with_player(&ctx.player, |p| p.auto_exits)
        .unwrap_or(true);
    match ctx.world.describe_room(&ctx.player) {
        Ok(view) => display_room_view(ctx.output.as_ref(), &view, auto_exits),
        Err(_) => ctx.send("You are nowhere."),
    }
}

fn describe_player(ctx: &Context, target: &Player) {
    let or_none = |s: &str| if s.is_empty() { "(none)".to_string() } else { s.to_string() };
    ctx.send(&format!("You see {}.", capitalize_name(&target.name)));
    ctx.send(&format!("Hair: {}", or_none(&target.hair)));
    ctx.send(&format!("Eyes: {}", or_none(&target.eyes)));
}

fn player_score(p: &Player) -> i32 {
    let score = p.max_hp
        + p.stat(Stat::Strength) * 5
        + p.stat(Stat::Dexterity) * 3
        + p.stat(Stat::Constitution) * 4
        + p.armor * 2;
    score.max(1)
}

fn mob_score(m: &Mobile) -> i32 {
    let max_hp = if m.max_hp > 0 { m.max_hp } else { m.hp };
    let score = max_hp
        + Stat::Strength.of(&m.attributes) * 5
        + Stat::Dexterity.of(&m.attributes) * 3
        + Stat::Constitution.of(&m.attributes) * 4
        + m.level * 10;
    score.max(1)
}

fn assess(mine: i32, theirs: i32) -> &'static str {
    let ratio = f64::from(theirs.max(1)) / f64::from(mine.max(1));
    if ratio <= 0.5 {
        "It looks trivial."
    } else if ratio <= 0.8 {
        "You would have the advantage."
    } else if ratio <= 1.2 {
        "It seems evenly matched."
    } else if ratio <= 1.6 {
        "It looks dangerous."
    } else {
        "You would likely be defeated."
    }
}

pub fn consider(ctx: &Context, args: &str) {
    let target = args.trim();
    if target.is_empty() {
        ctx.send("Consider whom? (syntax: consider <target>)");
        return;
    }
    if target.eq_ignore_ascii_case("me") || target.eq_ignore_ascii_case("self") {
        ctx.send("You look capable enough to handle yourself.");
        return;
    }
    let Some(me) = ctx.me() else {
        return;
    };
    if let Some(other) = ctx.world.find_player_in_room(&ctx.player, target) {
        let verdict = assess(player_score(&me), player_score(&other));
        ctx.send(&format!("You size up {}. {}", capitalize_name(&other.name), verdict));
        return;
    }
    match ctx.world.find_mob_in_room(&ctx.player, target) {
        Some(mob) => {
            let verdict = assess(player_score(&me), mob_score(&mob));
            ctx.send(&format!("You size up {}. {}", mob.short, verdict));
        }
        None => ctx.send(&format!("You don't see '{}' here.", target)),
    }
}

pub fn say(ctx: &Context, args: &str) {
    if args.trim().is_empty() {
        ctx.send("Say what?");
        return;
    }
    ctx.world.broadcast_say(&ctx.player, args.trim());
}

pub fn chat(ctx: &Context, args: &str) {
    if args.trim().is_empty() {
        ctx.send("Chat what?");
        return;
    }
    ctx.world.broadcast_chat(&ctx.player, args.trim());
}

pub fn who(ctx: &Context, _args: &str) {
    let players = ctx.world.list_players();
    ctx.send(&format!(
        "Players online ({}): {}",
        players.len(),
        players.join(", ")
    ));
}

pub fn stats(ctx: &Context, _args: &str) {
    let Some(p) = ctx.me() else {
        return;
    };
    let stat = |s: Stat| p.stat(s);
    ctx.send(&format!("=== {} ===", capitalize_name(&p.name)));
    ctx.send(&format!("Level: {}", p.level));
    ctx.send("");
    ctx.send(&format!(
        "HP:    {}/{} | Mana: {}/{} | Move: {}/{}",
        p.hp, p.max_hp, p.mana, p.max_mana, p.movement, p.max_movement
    ));
    ctx.send(&format!("Gold: {} | Experience: {}", p.gold, p.experience));
    ctx.send("");
    ctx.send(&format!(
        "STR: {:2} | DEX: {:2} | CON: {:2}",
        stat(Stat::Strength),
        stat(Stat::Dexterity),
        stat(Stat::Constitution)
    ));
    ctx.send(&format!(
        "INT: {:2} | WIS: {:2} | CHA: {:2} | LCK: {:2}",
        stat(Stat::Intelligence),
        stat(Stat::Wisdom),
        stat(Stat::Charisma),
        stat(Stat::Luck)
    ));
    ctx.send("");
    ctx.send(&format!(
        "Alignment: {} | Hitroll: {} | Damroll: {} | Armor: {}",
        p.alignment, p.hitroll, p.damroll, p.armor
    ));
}

pub fn inventory(ctx: &Context, _args: &str) {
    let Some(p) = ctx.me() else {
        return;
    };
    if p.inventory.is_empty() {
        ctx.send("You are carrying nothing.");
        return;
    }
    ctx.send("You are carrying:");
    for item in &p.inventory {
        ctx.send(&format!("  {}", item.label()));
    }
}

pub fn equipment(ctx: &Context, _args: &str) {
    let Some(p) = ctx.me() else {
        return;
    };
    if p.equipment.is_empty() {
        ctx.send("You are wearing nothing.");
        return;
    }
    ctx.send("You are wearing:");
    for slot in EquipSlot::ALL {
        if let Some(obj) = p.equipment.get(&slot) {
            ctx.send(&format!("  {:<5} {}", format!("{}:", slot), obj.label()));
        }
    }
}

pub fn exits(ctx: &Context, _args: &str) {
    match ctx.world.describe_room(&ctx.player) {
        Ok(view) => ctx.send(&format_exits(&view.exits)),
        Err(_) => ctx.send("You are nowhere."),
    }
}

pub fn autoexits(ctx: &Context, _args: &str) {
    let enabled = ctx.world.with_player_mut(&ctx.player, |p| {
        p.auto_exits = !p.auto_exits;
        p.auto_exits
    });
    match enabled {
        Some(true) => ctx.send("Autoexits enabled."),
        Some(false) => ctx.send("Autoexits disabled."),
        None => {}
    }
}

pub fn astat(ctx: &Context, _args: &str) {
    let Ok(view) = ctx.world.describe_room(&ctx.player) else {
        ctx.send("You are nowhere.");
        return;
    };
    ctx.send("");
    ctx.send("=== AREA STATISTICS ===");
    ctx.send("");
    ctx.send(&format!("Name:   {}", view.area_name));
    ctx.send(&format!("Author: {}", view.area_author));
    ctx.send("");
}

#[derive(Clone, Copy)]
enum Feature {
    Hair,
    Eyes,
}

impl Feature {
    fn label(self) -> &'static str {
        match self {
            Feature::Hair => "hair",
            Feature::Eyes => "eyes",
        }
    }

    fn text(self, p: &Player) -> &str {
        match self {
            Feature::Hair => &p.hair,
            Feature::Eyes => &p.eyes,
        }
    }

    fn field(self, p: &mut Player) -> &mut String {
        match self {
            Feature::Hair => &mut p.hair,
            Feature::Eyes => &mut p.eyes,
        }
    }
}

fn describe_feature(ctx: &Context, args: &str, feature: Feature) {
    let label = feature.label();
    let trimmed = args.trim();
    if trimmed.is_empty() {
        let current = ctx
            .world
            .with_player(&ctx.player, |p| feature.text(p).to_string());
        match current {
            Some(text) if !text.is_empty() => {
                ctx.send(&format!("Your {} description is: {}", label, text))
            }
            Some(_) => ctx.send(&format!("You have no {} description.", label)),
            None => {}
        }
        return;
    }

    let new_text = if trimmed.eq_ignore_ascii_case("clear") {
        String::new()
    } else {
        trimmed.replace('~', "")
    };
    ctx.world
        .with_player_mut(&ctx.player, |p| *feature.field(p) = new_text.clone());
    if new_text.is_empty() {
        ctx.send(&format!("{} description cleared.", capitalize(label)));
    } else {
        ctx.send(&format!("Your {} description is: {}", label, new_text));
    }
}

pub fn hair(ctx: &Context, args: &str) {
    describe_feature(ctx, args, Feature::Hair);
}

pub fn eyes(ctx: &Context, args: &str) {
    describe_feature(ctx, args, Feature::Eyes);
}

pub fn save(ctx: &Context, _args: &str) {
    let world = Arc::clone(&ctx.world);
    let saver = Arc::clone(&ctx.saver);
    let output = Arc::clone(&ctx.output);
    let player = ctx.player.clone();
    run_blocking(move || match saver.save_online(&world, &player) {
        Ok(true) => output.write_line("&YYour progress has been saved.&w"),
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(player = %player, error = %e, "Save failed");
            output.write_line(&format!("&RError saving: {}&w", e));
        }
    });
}

pub fn quit(ctx: &Context, _args: &str) {
    ctx.send("Goodbye.");
    ctx.output.request_disconnect("quit");
}
