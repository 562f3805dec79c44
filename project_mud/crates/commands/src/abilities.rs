//! Spells, maneuvers and learning them.
//!
//! Every use goes through [`invoke`]: readiness is checked against a
//! snapshot, targets are resolved, then mana and cooldown are charged under
//! the world lock before any effect lands. Effects are applied through the
//! world's own mutations, so a target that died in the meantime is reported
//! rather than hit twice.

use mud::{DamageOutcome, Mobile, Player};
use skills::{proficiency_bonus, unix_now, use_ability, Ability, Effect, SkillError, Targeting};

use crate::context::Context;
use crate::display::capitalize_name;

/// Starting proficiency for an ability learned from a trainer.
pub const TRAIN_PROFICIENCY: u8 = 10;

#[derive(Debug, Clone, Copy)]
enum Invocation {
    Spell,
    /// The command word, for the syntax hint.
    Maneuver(&'static str),
}

enum Targets {
    Nobody,
    Mobs(Vec<Mobile>),
    /// Heal target; `None` is the caster.
    Ally(Option<Player>),
}

pub fn abilities(ctx: &Context, _args: &str) {
    let Some(me) = ctx.me() else {
        return;
    };
    ctx.send("=== ABILITIES ===");
    ctx.send("");

    let known: Vec<(&Ability, &skills::SkillProgress)> = me
        .skills
        .learned()
        .filter_map(|progress| ctx.catalog.get(progress.ability_id).map(|a| (a, progress)))
        .collect();
    if known.is_empty() {
        ctx.send("You haven't learned any abilities yet.");
        ctx.send("");
        return;
    }

    let (maneuvers, spells): (Vec<_>, Vec<_>) = known.into_iter().partition(|(a, _)| a.is_maneuver());
    if !spells.is_empty() {
        ctx.send("SPELLS:");
        for (ability, progress) in spells {
            ctx.send(&format!("  [{}] {}", ability.id, ability.name));
            ctx.send(&format!(
                "      Mana: {} | Cooldown: {}s | Proficiency: {}%",
                ability.mana_cost, ability.cooldown_secs, progress.proficiency
            ));
            ctx.send(&format!("      Casts: {}", progress.uses));
            ctx.send("");
        }
    }
    if !maneuvers.is_empty() {
        ctx.send("MANEUVERS:");
        for (ability, progress) in maneuvers {
            ctx.send(&format!("  [{}] {}", ability.id, ability.name));
            ctx.send(&format!(
                "      Cooldown: {}s | Proficiency: {}%",
                ability.cooldown_secs, progress.proficiency
            ));
            ctx.send(&format!("      Uses: {}", progress.uses));
            ctx.send("");
        }
    }
}

/// `cast <ability name> [target]`. The longest known ability name that
/// prefixes the words wins; the rest is the target.
pub fn cast(ctx: &Context, args: &str) {
    let args = args.trim();
    if args.is_empty() {
        ctx.send("Cast what? (syntax: cast <spell> or cast <spell> <target>)");
        return;
    }
    let Some(me) = ctx.me() else {
        return;
    };

    let words: Vec<&str> = args.split_whitespace().collect();
    let found = (1..=words.len()).rev().find_map(|i| {
        let ability = ctx.catalog.by_name(&words[..i].join(" "))?;
        me.skills
            .knows(ability.id)
            .then(|| (ability, words[i..].join(" ")))
    });
    let Some((ability, target)) = found else {
        ctx.send(&format!("You don't know any spell called '{}'", args));
        return;
    };
    invoke(ctx, &me, ability, &target, Invocation::Spell);
}

fn maneuver(ctx: &Context, args: &str, id: skills::AbilityId, command: &'static str) {
    let Some(ability) = ctx.catalog.get(id) else {
        ctx.send("That maneuver is not available.");
        return;
    };
    let Some(me) = ctx.me() else {
        return;
    };
    if !me.skills.knows(id) {
        ctx.send(&format!("You haven't learned {} yet.", ability.name));
        return;
    }
    invoke(ctx, &me, ability, args.trim(), Invocation::Maneuver(command));
}

pub fn slash(ctx: &Context, args: &str) {
    maneuver(ctx, args, 2001, "slash");
}

pub fn power_attack(ctx: &Context, args: &str) {
    let args = args.trim();
    let args = args.strip_prefix("attack ").unwrap_or(args);
    maneuver(ctx, args, 2002, "power");
}

pub fn riposte(ctx: &Context, args: &str) {
    maneuver(ctx, args, 2004, "riposte");
}

pub fn cleave(ctx: &Context, args: &str) {
    maneuver(ctx, args, 2005, "cleave");
}

pub fn defensive_stance(ctx: &Context, args: &str) {
    let args = args.trim();
    let args = args.strip_prefix("stance").unwrap_or(args);
    maneuver(ctx, args, 2003, "defensive");
}

fn resolve_targets(
    ctx: &Context,
    ability: &Ability,
    keyword: &str,
    how: Invocation,
) -> Option<Targets> {
    let not_here = || ctx.send(&format!("You don't see '{}' here.", keyword));
    match ability.targeting {
        Targeting::SelfOnly => Some(Targets::Nobody),
        Targeting::SingleHostile => {
            if keyword.is_empty() {
                match how {
                    Invocation::Spell => ctx.send("Cast on whom?"),
                    Invocation::Maneuver(command) => ctx.send(&format!(
                        "{} whom? (syntax: {} <target>)",
                        ability.name, command
                    )),
                }
                return None;
            }
            match ctx.world.find_mob_in_room(&ctx.player, keyword) {
                Some(mob) => Some(Targets::Mobs(vec![mob])),
                None => {
                    not_here();
                    None
                }
            }
        }
        Targeting::AreaHostile => {
            if !keyword.is_empty() && ctx.world.find_mob_in_room(&ctx.player, keyword).is_none() {
                not_here();
                return None;
            }
            let mobs = ctx.world.room_mobiles(&ctx.player);
            if mobs.is_empty() {
                ctx.send("There is nothing here to attack.");
                return None;
            }
            Some(Targets::Mobs(mobs))
        }
        Targeting::Ally => {
            if keyword.is_empty()
                || keyword.eq_ignore_ascii_case("me")
                || keyword.eq_ignore_ascii_case("self")
            {
                return Some(Targets::Ally(None));
            }
            match ctx.world.find_player_in_room(&ctx.player, keyword) {
                Some(other) => Some(Targets::Ally(Some(other))),
                None => {
                    not_here();
                    None
                }
            }
        }
    }
}

/// Charge mana and cooldown. Returns the new proficiency and mana pool.
fn charge(ctx: &Context, ability: &Ability, now: u64) -> Option<Result<(u8, i32, i32), SkillError>> {
    ctx.world.with_player_mut(&ctx.player, |p| {
        let Player {
            skills,
            mana,
            max_mana,
            ..
        } = p;
        let progress = skills.get_mut(ability.id)?;
        Some(use_ability(progress, ability, mana, now).map(|()| (progress.proficiency, *mana, *max_mana)))
    })?
}

fn invoke(ctx: &Context, me: &Player, ability: &Ability, keyword: &str, how: Invocation) {
    let now = unix_now();
    let Some(progress) = me.skills.get(ability.id) else {
        return;
    };
    if let Err(e) = progress.can_use(ability, me.mana, now) {
        ctx.send(&e.to_string());
        return;
    }
    let Some(targets) = resolve_targets(ctx, ability, keyword, how) else {
        return;
    };
    let (proficiency, mana, max_mana) = match charge(ctx, ability, now) {
        Some(Ok(paid)) => paid,
        Some(Err(e)) => {
            ctx.send(&e.to_string());
            return;
        }
        None => return,
    };
    tracing::debug!(player = %me.name, ability = %ability.name, proficiency, "Ability used");

    let mana_line = format!("Mana remaining: {}/{}", mana, max_mana);
    let show_mana = matches!(how, Invocation::Spell);
    let bonus = proficiency_bonus(proficiency);
    let mut rng = rand::thread_rng();

    match (&ability.effect, targets) {
        (Effect::Damage { formula, .. }, Targets::Mobs(mobs)) => {
            for (i, mob) in mobs.iter().enumerate() {
                let amount = formula.roll(&mut rng, &me.attributes) + bonus;
                let text = ability.messages.render_cast(&me.name, &mob.short, &ability.name);
                let text = text.strip_suffix('.').unwrap_or(&text);
                ctx.send(&format!(
                    "{} for &R{}&w damage! (Proficiency: {}%)",
                    text, amount, proficiency
                ));
                if show_mana && i == 0 {
                    ctx.send(&mana_line);
                }
                ctx.world.broadcast_combat_message(
                    &ctx.player,
                    &ability.messages.render_room(&me.name, &mob.short, &ability.name),
                );
                report_damage(ctx, mob, amount);
            }
        }
        (Effect::Healing { formula }, Targets::Ally(target)) => {
            let amount = (formula.roll(&mut rng, &me.attributes) + bonus).max(0);
            let (target_name, shown) = match &target {
                Some(other) => (other.name.clone(), other.name.clone()),
                None => (me.name.clone(), "yourself".to_string()),
            };
            let healed = ctx
                .world
                .with_player_mut(&target_name, |p| {
                    let before = p.hp;
                    p.hp = p.hp.max((p.hp + amount).min(p.max_hp));
                    p.hp - before
                })
                .unwrap_or(0);
            let text = ability.messages.render_cast(&me.name, &shown, &ability.name);
            let text = text.strip_suffix('.').unwrap_or(&text);
            ctx.send(&format!(
                "{}, restoring &G{}&w HP! (Proficiency: {}%)",
                text, healed, proficiency
            ));
            if show_mana {
                ctx.send(&mana_line);
            }
            if let Some(other) = target {
                other.output.write_line(&format!(
                    "{} heals you for {} HP.",
                    capitalize_name(&me.name),
                    healed
                ));
            }
        }
        (_, targets) => {
            let shown = match &targets {
                Targets::Mobs(mobs) => mobs.first().map(|m| m.short.clone()).unwrap_or_default(),
                Targets::Ally(Some(other)) => other.name.clone(),
                Targets::Ally(None) | Targets::Nobody => String::new(),
            };
            let text = ability.messages.render_cast(&me.name, &shown, &ability.name);
            ctx.send(&format!("{} (Proficiency: {}%)", text, proficiency));
            if show_mana {
                ctx.send(&mana_line);
            }
        }
    }
}

fn report_damage(ctx: &Context, mob: &Mobile, amount: i32) {
    match ctx.world.damage_mob(&ctx.player, mob.id, amount) {
        Ok(DamageOutcome::Killed { loot }) => {
            let death = format!("&R{} falls to the ground, defeated!&w", mob.short);
            ctx.send(&death);
            ctx.world.broadcast_combat_message(&ctx.player, &death);
            if !loot.is_empty() {
                ctx.send(&format!("You loot: {}.", loot.join(", ")));
            }
        }
        Ok(DamageOutcome::Wounded { hp, max_hp }) => {
            ctx.send(&format!(
                "{} has &Y{}/{}&w HP remaining.",
                mob.short, hp, max_hp
            ));
        }
        Err(_) => ctx.send(&format!("{} is no longer here.", mob.short)),
    }
}

pub fn study(ctx: &Context, args: &str) {
    let keyword = args.trim();
    if keyword.is_empty() {
        ctx.send("Study what? (syntax: study <item>)");
        return;
    }

    let (obj, carried) = match ctx.world.find_object_in_inventory(&ctx.player, keyword) {
        Some(obj) => (obj, true),
        None => match ctx.world.find_object_in_room(&ctx.player, keyword) {
            Some(obj) => (obj, false),
            None => {
                ctx.send("You don't see that here.");
                return;
            }
        },
    };
    let Some((id, amount)) = obj.teaches else {
        ctx.send("That item doesn't teach any spells.");
        return;
    };
    let Some(ability) = ctx.catalog.get(id) else {
        tracing::warn!(vnum = obj.vnum, ability = id, "Object teaches an unknown ability");
        ctx.send("That spell doesn't exist.");
        return;
    };

    let learned = ctx
        .world
        .with_player_mut(&ctx.player, |p| p.skills.learn(id, amount))
        .unwrap_or(false);
    if !learned {
        ctx.send(&format!("You already know {}!", ability.name));
        return;
    }

    ctx.send(&format!(
        "&YYou carefully study {} and learn &W{}&Y!&w",
        obj.short, ability.name
    ));
    ctx.send(&format!(
        "Proficiency: {}% | Mana Cost: {} | Cooldown: {}s",
        amount, ability.mana_cost, ability.cooldown_secs
    ));

    if obj.consumable && carried && ctx.world.consume_inventory_object(&ctx.player, obj.id).is_ok() {
        ctx.send(&format!(
            "&YThe {} crumbles to dust after you finish studying it.&w",
            crate::display::strip_article(&obj.short)
        ));
    }
}

pub fn train(ctx: &Context, args: &str) {
    let words: Vec<&str> = args.split_whitespace().collect();
    let Some((&trainer_kw, wanted)) = words.split_first() else {
        ctx.send("Train with whom? (syntax: train <trainer> [maneuver])");
        return;
    };
    let Some(mob) = ctx.world.find_mob_in_room(&ctx.player, trainer_kw) else {
        ctx.send("That trainer is not here.");
        return;
    };
    let Some(trainer) = &mob.trainer else {
        ctx.send(&format!("{} doesn't offer training.", mob.short));
        return;
    };
    let Some(ability) = ctx.catalog.get(trainer.teaches) else {
        tracing::warn!(vnum = mob.vnum, ability = trainer.teaches, "Trainer teaches an unknown ability");
        ctx.send("That trainer seems confused about what to teach.");
        return;
    };

    if !wanted.is_empty() {
        let wanted = wanted.join(" ").to_lowercase();
        if !ability.name.to_lowercase().contains(&wanted) {
            ctx.send(&format!(
                "{} teaches {}. Try: train {}",
                mob.short, ability.name, trainer_kw
            ));
            return;
        }
    }

    let Some(me) = ctx.me() else {
        return;
    };
    if me.skills.knows(ability.id) {
        ctx.send(&format!("You already know {}.", ability.name));
        return;
    }
    if let Some(stat) = trainer.required_stat {
        let have = me.stat(stat);
        if trainer.required_value > 0 && have < trainer.required_value {
            ctx.send(&format!(
                "{} says: You're not ready yet. You need +{} {} to learn from me.",
                mob.short,
                trainer.required_value - have,
                stat
            ));
            return;
        }
    }

    ctx.world
        .with_player_mut(&ctx.player, |p| p.skills.learn(ability.id, TRAIN_PROFICIENCY));
    ctx.send(&format!(
        "&YYou train with {} and learn &W{}&Y!&w",
        mob.short, ability.name
    ));
    ctx.send(&format!(
        "Proficiency: {}% | Cooldown: {}s",
        TRAIN_PROFICIENCY, ability.cooldown_secs
    ));
    if !trainer.message.is_empty() {
        ctx.send(&trainer.message);
    }
    ctx.world.broadcast_system_to_room_except(
        &ctx.player,
        &format!("{} trains with {}.", capitalize_name(&me.name), mob.short),
    );
}
