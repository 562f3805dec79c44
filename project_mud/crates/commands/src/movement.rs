use crate::context::Context;
use crate::display::{capitalize_name, display_room_view};

/// Direction words and their abbreviations, in registration order.
pub const DIRECTIONS: [(&str, &str); 10] = [
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("up", "u"),
    ("down", "d"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
];

/// Move one step. The room left behind sees `<Name> leaves <dir>.` and the
/// room entered sees `<Name> arrives.`
pub fn go(ctx: &Context, direction: &str) {
    let Some(from) = ctx.world.with_player(&ctx.player, |p| p.location) else {
        return;
    };
    match ctx.world.move_player(&ctx.player, direction) {
        Ok(view) => {
            let shown = capitalize_name(&ctx.player);
            ctx.world.broadcast_to_room(
                from,
                &format!("{} leaves {}.", shown, direction),
                Some(ctx.player.as_str()),
            );
            ctx.world
                .broadcast_system_to_room_except(&ctx.player, &format!("{} arrives.", shown));
            let auto_exits = ctx
                .world
                .with_player(&ctx.player, |p| p.auto_exits)
                .unwrap_or(true);
            display_room_view(ctx.output.as_ref(), &view, auto_exits);
        }
        Err(_) => ctx.send("You cannot go that way."),
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::Harness;

    #[test]
    fn bystanders_see_departures_and_arrivals() {
        let h = Harness::new();
        let (ayla, ayla_out) = h.join("Ayla");
        let (_, brin_out) = h.join("Brin");

        h.run(&ayla, &ayla_out, "north");
        assert_eq!(brin_out.take(), "Ayla leaves north.\n");

        let (_, cato_out) = h.join_with("Cato", |p| p.location = 101);
        h.run(&ayla, &ayla_out, "s");
        h.run(&ayla, &ayla_out, "n");
        assert_eq!(cato_out.take(), "Ayla leaves south.\nAyla arrives.\n");
        assert_eq!(brin_out.take(), "Ayla arrives.\nAyla leaves north.\n");
    }

    #[test]
    fn blocked_moves_are_silent_to_the_room() {
        let h = Harness::new();
        let (ayla, ayla_out) = h.join("Ayla");
        let (_, brin_out) = h.join("Brin");
        assert_eq!(h.run(&ayla, &ayla_out, "up"), "You cannot go that way.\n");
        assert_eq!(brin_out.take(), "");
    }
}
