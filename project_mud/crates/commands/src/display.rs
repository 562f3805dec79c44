use mud::{Output, RoomView};

const EXIT_ORDER: [&str; 10] = [
    "north",
    "east",
    "south",
    "west",
    "up",
    "down",
    "northeast",
    "northwest",
    "southeast",
    "southwest",
];

/// `Exits: North West Up.` in compass order. Non-standard exits have no
/// movement verb and are not listed.
pub fn format_exits(exits: &[String]) -> String {
    let shown: Vec<String> = EXIT_ORDER
        .iter()
        .filter(|dir| exits.iter().any(|e| e == *dir))
        .map(|dir| capitalize(dir))
        .collect();
    if shown.is_empty() {
        return "Exits: none".to_string();
    }
    format!("Exits: {}.", shown.join(" "))
}

pub fn display_room_view(output: &dyn Output, view: &RoomView, auto_exits: bool) {
    output.write_line(&view.name);
    if !view.description.is_empty() {
        output.write_line(&view.description);
    }
    if auto_exits {
        output.write_line(&format_exits(&view.exits));
    }
    for line in view.mobiles.iter().chain(&view.objects) {
        output.write_line(line);
    }
    if !view.others.is_empty() {
        output.write_line(&format!("Also here: {}", view.others.join(", ")));
    } else if view.mobiles.is_empty() && view.objects.is_empty() {
        output.write_line("You are alone here.");
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `ayla` -> `Ayla`; the rest of the name is lower-cased.
pub fn capitalize_name(name: &str) -> String {
    capitalize(&name.to_lowercase())
}

/// Drop a leading `a `, `an ` or `the `.
pub fn strip_article(text: &str) -> &str {
    ["a ", "an ", "the "]
        .iter()
        .find_map(|article| text.strip_prefix(article))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mud::CaptureOutput;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exits_use_compass_order() {
        let exits = strings(&["west", "north", "up", "southeast"]);
        assert_eq!(format_exits(&exits), "Exits: North West Up Southeast.");
        assert_eq!(format_exits(&[]), "Exits: none");
    }

    #[test]
    fn only_non_standard_exits_read_as_none() {
        let exits = strings(&["portal", "trapdoor"]);
        assert_eq!(format_exits(&exits), "Exits: none");
        let exits = strings(&["portal", "south"]);
        assert_eq!(format_exits(&exits), "Exits: South.");
    }

    #[test]
    fn empty_room_reads_alone() {
        let out = CaptureOutput::new();
        let view = RoomView {
            vnum: 1,
            name: "The Crossroads".into(),
            description: "A path.".into(),
            exits: strings(&["north"]),
            others: vec![],
            mobiles: vec![],
            objects: vec![],
            area_name: String::new(),
            area_author: String::new(),
        };
        display_room_view(&out, &view, true);
        assert_eq!(
            out.lines(),
            vec!["The Crossroads", "A path.", "Exits: North.", "You are alone here."]
        );
    }

    #[test]
    fn occupants_follow_contents() {
        let out = CaptureOutput::new();
        let view = RoomView {
            vnum: 1,
            name: "Square".into(),
            description: String::new(),
            exits: vec![],
            others: strings(&["Bram", "Cira"]),
            mobiles: strings(&["A rat is standing."]),
            objects: strings(&["A coin is here."]),
            area_name: String::new(),
            area_author: String::new(),
        };
        display_room_view(&out, &view, false);
        assert_eq!(
            out.lines(),
            vec!["Square", "A rat is standing.", "A coin is here.", "Also here: Bram, Cira"]
        );
    }

    #[test]
    fn text_helpers() {
        assert_eq!(capitalize_name("aYLA"), "Ayla");
        assert_eq!(strip_article("a faded scroll"), "faded scroll");
        assert_eq!(strip_article("an owl"), "owl");
        assert_eq!(strip_article("sword"), "sword");
    }
}
