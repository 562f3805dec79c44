use skills::{Ability, Effect, PartialMatch, Targeting};

use crate::context::Context;

/// `help`, `help <topic>` or `help <ability>`. Topics win over abilities.
pub fn help(ctx: &Context, args: &str, commands: &[String]) {
    let query = args.trim();
    if query.is_empty() {
        ctx.send("Usage: help <topic>");
        ctx.send("       help <ability name>");
        ctx.send("");
        ctx.send(&format!("Commands: {}", commands.join(", ")));
        return;
    }

    if let Some(topic) = ctx.help.get(query) {
        ctx.send(&format!("&Y=== {} ===&w", topic.title));
        ctx.send("");
        for line in topic.content.lines() {
            ctx.send(line);
        }
        return;
    }

    match ctx.catalog.find_partial(query) {
        PartialMatch::One(ability) => ability_card(ctx, ability),
        PartialMatch::Ambiguous(n) => ctx.send(&format!(
            "Ambiguous: '{}' matches {} abilities. Please be more specific.",
            query, n
        )),
        PartialMatch::None => ctx.send(&format!(
            "Help topic '{}' not found. Type 'help' for usage.",
            query
        )),
    }
}

fn ability_card(ctx: &Context, ability: &Ability) {
    ctx.send(&format!("&Y=== {} ===&w", ability.name));
    ctx.send("");
    if !ability.description.is_empty() {
        ctx.send(&ability.description);
        ctx.send("");
    }

    let known = ctx
        .world
        .with_player(&ctx.player, |p| p.skills.get(ability.id).cloned())
        .flatten();
    if let Some(progress) = known {
        let uses = if ability.is_maneuver() { "Uses" } else { "Casts" };
        ctx.send(&format!(
            "&CProficiency:&w {}% | &C{}:&w {}",
            progress.proficiency, uses, progress.uses
        ));
    }

    ctx.send(&format!(
        "&CMana Cost:&w {} | &CCooldown:&w {}s",
        ability.mana_cost, ability.cooldown_secs
    ));
    let targeting = match ability.targeting {
        Targeting::SelfOnly => "self",
        Targeting::SingleHostile => "single enemy",
        Targeting::AreaHostile => "all enemies in the room",
        Targeting::Ally => "single ally",
    };
    ctx.send(&format!(
        "&CTargeting:&w {} (Range: {})",
        targeting, ability.range
    ));

    match &ability.effect {
        Effect::Damage {
            formula,
            damage_type,
        } => {
            ctx.send(&format!("&CEffect:&w {} damage ({})", damage_type, formula));
            if let Some((save_type, dc)) = &ability.save {
                ctx.send(&format!("&CSave:&w {} (DC {})", save_type, dc));
            }
        }
        Effect::Healing { formula } => ctx.send(&format!("&CHealing:&w +{} HP", formula)),
        Effect::Utility => {}
    }
}
