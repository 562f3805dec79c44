//! `&`-code color markup and its translation to ANSI escapes.
//!
//! `&` followed by a letter selects a color, `&&` is a literal `&`, and any
//! other code (or a trailing lone `&`) is dropped.

pub const RESET: &str = "\x1b[0m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const WHITE: &str = "\x1b[37m";

pub const GREY: &str = "\x1b[90m";
pub const BRIGHT_RED: &str = "\x1b[91m";
pub const BRIGHT_GREEN: &str = "\x1b[92m";
pub const BRIGHT_YELLOW: &str = "\x1b[93m";
pub const BRIGHT_BLUE: &str = "\x1b[94m";
pub const BRIGHT_MAGENTA: &str = "\x1b[95m";
pub const BRIGHT_CYAN: &str = "\x1b[96m";
pub const BRIGHT_WHITE: &str = "\x1b[97m";

fn code_for(letter: char) -> Option<&'static str> {
    Some(match letter {
        'x' => RESET,
        'w' | 'Z' => WHITE,
        'W' => BRIGHT_WHITE,
        'r' => RED,
        'R' => BRIGHT_RED,
        'g' => GREEN,
        'G' => BRIGHT_GREEN,
        'b' => BLUE,
        'B' => BRIGHT_BLUE,
        'c' => CYAN,
        'C' => BRIGHT_CYAN,
        'y' | 'o' => YELLOW,
        'Y' | 'O' => BRIGHT_YELLOW,
        'p' => MAGENTA,
        'P' => BRIGHT_MAGENTA,
        'z' => GREY,
        _ => return None,
    })
}

/// Translate `&` markup into terminal escapes.
pub fn render(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('&') => out.push('&'),
            Some(letter) => {
                if let Some(seq) = code_for(letter) {
                    out.push_str(seq);
                }
            }
            None => {}
        }
    }
    out
}

/// Strip all ANSI escape sequences from a string.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // ESC [ params... final byte in 0x40..=0x7E
            for b in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&b) {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }

    out
}
