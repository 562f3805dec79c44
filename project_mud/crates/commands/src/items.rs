//! Moving objects between the room, the inventory and equipment slots.

use mud::{EquipSlot, Object};

use crate::context::Context;

/// `all`, `all <kw>` or `all.<kw>`: `Some(filter)` with an empty filter for
/// plain `all`.
fn all_filter(args: &str) -> Option<&str> {
    let lower = args.to_lowercase();
    if lower == "all" {
        Some("")
    } else if lower.starts_with("all ") || lower.starts_with("all.") {
        Some(args.get(4..).unwrap_or("").trim())
    } else {
        None
    }
}

fn passes(obj: &Object, filter: &str) -> bool {
    filter.is_empty() || obj.matches(filter)
}

pub fn get(ctx: &Context, args: &str) {
    let keyword = args.trim();
    if keyword.is_empty() {
        ctx.send("Get what?");
        return;
    }

    if let Some(filter) = all_filter(keyword) {
        let mut picked = 0;
        for obj in ctx.world.room_objects(&ctx.player) {
            if !passes(&obj, filter) || !obj.is_takeable() {
                continue;
            }
            if let Ok(obj) = ctx.world.pick_up_object(&ctx.player, obj.id) {
                ctx.send(&format!("You pick up {}.", obj.label()));
                picked += 1;
            }
        }
        if picked == 0 {
            ctx.send("You see nothing here.");
        }
        return;
    }

    let Some(obj) = ctx.world.find_object_in_room(&ctx.player, keyword) else {
        ctx.send("You don't see that here.");
        return;
    };
    if !obj.is_takeable() {
        ctx.send("You can't take that.");
        return;
    }
    match ctx.world.pick_up_object(&ctx.player, obj.id) {
        Ok(obj) => ctx.send(&format!("You pick up {}.", obj.label())),
        Err(_) => ctx.send("You can't take that."),
    }
}

pub fn drop(ctx: &Context, args: &str) {
    let keyword = args.trim();
    if keyword.is_empty() {
        ctx.send("Drop what?");
        return;
    }

    if let Some(filter) = all_filter(keyword) {
        let carried = ctx
            .world
            .with_player(&ctx.player, |p| p.inventory.clone())
            .unwrap_or_default();
        let mut dropped = 0;
        for obj in carried.iter().filter(|o| passes(o, filter)) {
            if let Ok(obj) = ctx.world.drop_object(&ctx.player, obj.id) {
                ctx.send(&format!("You drop {}.", obj.label()));
                dropped += 1;
            }
        }
        if dropped == 0 {
            ctx.send("You are carrying nothing.");
        }
        return;
    }

    let Some(obj) = ctx.world.find_object_in_inventory(&ctx.player, keyword) else {
        ctx.send("You aren't carrying that.");
        return;
    };
    match ctx.world.drop_object(&ctx.player, obj.id) {
        Ok(obj) => ctx.send(&format!("You drop {}.", obj.label())),
        Err(_) => ctx.send("You can't drop that."),
    }
}

fn wear_message(obj: &Object, slot: EquipSlot) -> String {
    if slot == EquipSlot::Wield {
        format!("You equip {}.", obj.label())
    } else {
        format!("You wear {} on your {}.", obj.label(), slot)
    }
}

/// Equip and apply the armor bonus.
fn equip(ctx: &Context, obj: &Object, slot: EquipSlot) -> bool {
    match ctx.world.equip_object(&ctx.player, obj.id, slot) {
        Ok(worn) => {
            if worn.armor != 0 {
                ctx.world
                    .with_player_mut(&ctx.player, |p| p.armor += worn.armor);
            }
            ctx.send(&wear_message(&worn, slot));
            true
        }
        Err(_) => false,
    }
}

/// Unequip and take the armor bonus back off.
fn unequip(ctx: &Context, slot: EquipSlot) -> Option<Object> {
    let obj = ctx.world.unequip_object(&ctx.player, slot).ok()?;
    if obj.armor != 0 {
        ctx.world
            .with_player_mut(&ctx.player, |p| p.armor -= obj.armor);
    }
    ctx.send(&format!("You remove {} from your {}.", obj.label(), slot));
    Some(obj)
}

fn is_occupied(ctx: &Context, slot: EquipSlot) -> bool {
    ctx.world
        .with_player(&ctx.player, |p| p.equipment.contains_key(&slot))
        .unwrap_or(false)
}

pub fn wear(ctx: &Context, args: &str) {
    let trimmed = args.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        let carried = ctx
            .world
            .with_player(&ctx.player, |p| p.inventory.clone())
            .unwrap_or_default();
        let mut worn = 0;
        for obj in &carried {
            let Some(slot) = obj.wear_slot() else {
                continue;
            };
            if !is_occupied(ctx, slot) && equip(ctx, obj, slot) {
                worn += 1;
            }
        }
        if worn == 0 {
            ctx.send("You have nothing you can wear.");
        }
        return;
    }

    let mut words = trimmed.split_whitespace();
    let Some(keyword) = words.next() else {
        ctx.send("Wear what?");
        return;
    };
    let Some(obj) = ctx.world.find_object_in_inventory(&ctx.player, keyword) else {
        ctx.send("You aren't carrying that.");
        return;
    };

    let slot = match words.next() {
        Some(requested) if obj.is_wearable() => EquipSlot::parse(requested),
        Some(_) => None,
        None => obj.wear_slot(),
    };
    let Some(slot) = slot else {
        ctx.send("You can't wear that.");
        return;
    };
    if is_occupied(ctx, slot) {
        ctx.send(&format!("You are already wearing something on your {}.", slot));
        return;
    }
    if !equip(ctx, &obj, slot) {
        ctx.send("You can't wear that.");
    }
}

pub fn remove(ctx: &Context, args: &str) {
    let trimmed = args.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        let removed = EquipSlot::ALL
            .into_iter()
            .filter_map(|slot| unequip(ctx, slot))
            .count();
        if removed == 0 {
            ctx.send("You are wearing nothing.");
        }
        return;
    }

    let Some(keyword) = trimmed.split_whitespace().next() else {
        ctx.send("Remove what?");
        return;
    };

    if let Some(slot) = EquipSlot::parse(keyword) {
        if unequip(ctx, slot).is_none() {
            ctx.send(&format!("You are not wearing anything on your {}.", slot));
        }
        return;
    }

    let removed = ctx
        .world
        .find_object_in_equipment(&ctx.player, keyword)
        .and_then(|(slot, _)| unequip(ctx, slot));
    if removed.is_none() {
        ctx.send("You are not wearing that.");
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::Harness;

    #[test]
    fn get_wear_remove_tracks_armor() {
        let h = Harness::new();
        let (ctx, out) = h.join("Ayla");

        assert_eq!(h.run(&ctx, &out, "get helm"), "You pick up an iron helm.\n");
        assert_eq!(
            h.run(&ctx, &out, "wear helm"),
            "You wear an iron helm on your head.\n"
        );
        assert_eq!(h.world.with_player("Ayla", |p| p.armor), Some(3));
        assert_eq!(
            h.run(&ctx, &out, "wear helm"),
            "You aren't carrying that.\n"
        );

        assert_eq!(
            h.run(&ctx, &out, "remove head"),
            "You remove an iron helm from your head.\n"
        );
        assert_eq!(h.world.with_player("Ayla", |p| p.armor), Some(0));
        assert_eq!(
            h.run(&ctx, &out, "remove head"),
            "You are not wearing anything on your head.\n"
        );
    }

    #[test]
    fn fixed_objects_stay_put() {
        let h = Harness::new();
        let (ctx, out) = h.join("Ayla");
        assert_eq!(h.run(&ctx, &out, "get fountain"), "You can't take that.\n");
        assert_eq!(h.run(&ctx, &out, "get anvil"), "You don't see that here.\n");
        assert_eq!(h.run(&ctx, &out, "get"), "Get what?\n");
    }

    #[test]
    fn get_all_skips_fixtures() {
        let h = Harness::new();
        let (ctx, out) = h.join("Ayla");
        let seen = h.run(&ctx, &out, "get all");
        assert_eq!(seen, "You pick up an iron helm.\nYou pick up a faded scroll.\n");
        assert_eq!(h.world.room_objects("Ayla").len(), 1);
        assert_eq!(h.run(&ctx, &out, "get all"), "You see nothing here.\n");
    }

    #[test]
    fn drop_returns_object_to_room() {
        let h = Harness::new();
        let (ctx, out) = h.join("Ayla");
        h.run(&ctx, &out, "get scroll");
        assert_eq!(h.run(&ctx, &out, "drop scroll"), "You drop a faded scroll.\n");
        assert_eq!(h.run(&ctx, &out, "drop scroll"), "You aren't carrying that.\n");
        assert!(h.world.find_object_in_room("Ayla", "scroll").is_some());
    }

    #[test]
    fn unwearable_items_are_refused() {
        let h = Harness::new();
        let (ctx, out) = h.join("Ayla");
        h.run(&ctx, &out, "get scroll");
        assert_eq!(h.run(&ctx, &out, "wear scroll"), "You can't wear that.\n");
        assert_eq!(h.run(&ctx, &out, "wear all"), "You have nothing you can wear.\n");
    }
}
