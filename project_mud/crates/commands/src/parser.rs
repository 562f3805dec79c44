/// Split a raw line into a lower-cased verb and the remaining arguments in
/// their original case. Blank input yields `None`.
pub fn parse_input(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (verb, args) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    Some((verb.to_lowercase(), args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_is_lowercased_args_keep_case() {
        assert_eq!(
            parse_input("  SAY Hello There  "),
            Some(("say".to_string(), "Hello There"))
        );
    }

    #[test]
    fn bare_verb_has_empty_args() {
        assert_eq!(parse_input("look"), Some(("look".to_string(), "")));
        assert_eq!(parse_input("look\t"), Some(("look".to_string(), "")));
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("   \t "), None);
    }

    #[test]
    fn inner_whitespace_is_preserved() {
        assert_eq!(
            parse_input("cast arcane bolt  rat"),
            Some(("cast".to_string(), "arcane bolt  rat"))
        );
    }
}
