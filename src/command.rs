//! Script commands and the classifier.
//!
//! A line is a keyword followed by an optional parameter.  The keyword is
//! matched, without regard to case, against [`VOCABULARY`].

use alloc::string::String;
use arrayvec::ArrayString;
use usbd_human_interface_device::page::Keyboard;

use crate::{keymap, Mods};

/// Longest keyword that can be recognized.
pub const MAX_KEYWORD: usize = 31;

/// Longest parameter, in bytes.  Anything past this is ignored.
pub const MAX_PARAM: usize = 223;

/// A single classified script line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Wait this many milliseconds.
    Delay(u32),
    /// Type this text, one character at a time.
    TypeString(String),
    /// Tap a single key with the given modifiers.  The key may be
    /// `NoEventIndicated` for a modifier only tap.
    SpecialKey(Mods, Keyboard),
    /// A known keyword whose parameter gives nothing to send.
    Skip,
    /// Unrecognized keyword, holding the whole line.
    Unknown(String),
}

/// What a keyword does.  The table below maps each spelling to one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Delay,
    String,
    /// Modifier plus the first character of the parameter.  `bare` says
    /// whether an empty parameter still taps the modifier on its own.
    Chord { mods: Mods, bare: bool },
    Key(Keyboard),
}

/// Every keyword the classifier knows.
pub static VOCABULARY: &[(&str, Verb)] = &[
    ("DELAY", Verb::Delay),
    ("STRING", Verb::String),
    ("GUI", Verb::Chord { mods: Mods::LEFT_GUI, bare: true }),
    ("WINDOWS", Verb::Chord { mods: Mods::LEFT_GUI, bare: true }),
    ("CTRL", Verb::Chord { mods: Mods::LEFT_CTRL, bare: false }),
    ("CONTROL", Verb::Chord { mods: Mods::LEFT_CTRL, bare: false }),
    ("ALT", Verb::Chord { mods: Mods::LEFT_ALT, bare: false }),
    ("SHIFT", Verb::Chord { mods: Mods::LEFT_SHIFT, bare: false }),
    ("ENTER", Verb::Key(Keyboard::ReturnEnter)),
    ("TAB", Verb::Key(Keyboard::Tab)),
    ("ESCAPE", Verb::Key(Keyboard::Escape)),
    ("SPACE", Verb::Key(Keyboard::Space)),
    ("BACKSPACE", Verb::Key(Keyboard::DeleteBackspace)),
    ("DELETE", Verb::Key(Keyboard::DeleteForward)),
    ("HOME", Verb::Key(Keyboard::Home)),
    ("END", Verb::Key(Keyboard::End)),
    ("UP", Verb::Key(Keyboard::UpArrow)),
    ("UPARROW", Verb::Key(Keyboard::UpArrow)),
    ("DOWN", Verb::Key(Keyboard::DownArrow)),
    ("DOWNARROW", Verb::Key(Keyboard::DownArrow)),
    ("LEFT", Verb::Key(Keyboard::LeftArrow)),
    ("LEFTARROW", Verb::Key(Keyboard::LeftArrow)),
    ("RIGHT", Verb::Key(Keyboard::RightArrow)),
    ("RIGHTARROW", Verb::Key(Keyboard::RightArrow)),
];

/// Look up an already uppercased keyword.
pub fn lookup(keyword: &str) -> Option<Verb> {
    VOCABULARY
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, verb)| *verb)
}

/// Split a line into its keyword and parameter.
///
/// Leading whitespace is skipped, the keyword runs to the next whitespace,
/// and the parameter is everything after the whitespace that follows it,
/// cut to [`MAX_PARAM`] bytes.  Returns `None` if there is no keyword.
pub fn split(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    let (keyword, rest) = match line.find(char::is_whitespace) {
        Some(pos) => line.split_at(pos),
        None => (line, ""),
    };
    let param = rest.trim_start();
    let mut end = param.len().min(MAX_PARAM);
    while !param.is_char_boundary(end) {
        end -= 1;
    }
    Some((keyword, &param[..end]))
}

/// Classify a single (non-comment, non-empty) script line.
pub fn classify(line: &str) -> Command {
    let unknown = || Command::Unknown(String::from(line));

    let Some((keyword, param)) = split(line) else {
        return unknown();
    };

    // Too long for any entry in the table.
    let mut upper = ArrayString::<MAX_KEYWORD>::new();
    for ch in keyword.chars() {
        if upper.try_push(ch.to_ascii_uppercase()).is_err() {
            return unknown();
        }
    }

    match lookup(&upper) {
        None => unknown(),
        Some(Verb::Delay) => Command::Delay(parse_delay(param)),
        Some(Verb::String) => Command::TypeString(String::from(param)),
        Some(Verb::Chord { mods, bare }) => match param.chars().next() {
            None if bare => Command::SpecialKey(mods, Keyboard::NoEventIndicated),
            None => Command::Skip,
            // Only keys that type the character unshifted.
            Some(ch) => match keymap::translate(ch.to_ascii_lowercase()) {
                Some((key, shift)) if shift.is_empty() => Command::SpecialKey(mods, key),
                _ => Command::Skip,
            },
        },
        Some(Verb::Key(key)) => Command::SpecialKey(Mods::empty(), key),
    }
}

/// Parse a delay the way C's `atoi` would: leading whitespace, an optional
/// sign, then as many digits as are present.  Negative and missing values
/// are zero, and large values saturate.
pub fn parse_delay(param: &str) -> u32 {
    let text = param.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: u32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as u32);
    }
    if negative {
        0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keyword_and_param() {
        assert_eq!(split("STRING hello  world "), Some(("STRING", "hello  world ")));
        assert_eq!(split("  ENTER"), Some(("ENTER", "")));
        assert_eq!(split("DELAY\t\t500"), Some(("DELAY", "500")));
        assert_eq!(split("   "), None);
    }

    #[test]
    fn param_is_bounded() {
        let line = format!("STRING {}", "x".repeat(400));
        let (_, param) = split(&line).unwrap();
        assert_eq!(param.len(), MAX_PARAM);
    }

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(classify("enter"), Command::SpecialKey(Mods::empty(), Keyboard::ReturnEnter));
        assert_eq!(classify("Delay 250"), Command::Delay(250));
        assert_eq!(classify("string Hi"), Command::TypeString("Hi".into()));
    }

    #[test]
    fn every_keyword_classifies() {
        for (name, _) in VOCABULARY {
            let line = format!("{} a", name);
            assert!(!matches!(classify(&line), Command::Unknown(_)), "{}", name);
            assert!(name.len() <= MAX_KEYWORD);
        }
    }

    #[test]
    fn aliases() {
        assert_eq!(classify("WINDOWS r"), classify("GUI r"));
        assert_eq!(classify("CONTROL c"), classify("CTRL c"));
        assert_eq!(classify("UPARROW"), classify("UP"));
        assert_eq!(classify("DOWNARROW"), classify("DOWN"));
        assert_eq!(classify("LEFTARROW"), classify("LEFT"));
        assert_eq!(classify("RIGHTARROW"), classify("RIGHT"));
    }

    #[test]
    fn unknown_keeps_line() {
        assert_eq!(classify("FOOBAR 12"), Command::Unknown("FOOBAR 12".into()));
        assert_eq!(classify(" \t "), Command::Unknown(" \t ".into()));
        let long = "X".repeat(40);
        assert_eq!(classify(&long), Command::Unknown(long.clone()));
    }

    #[test]
    fn chord_uses_first_char_lowercased() {
        assert_eq!(classify("GUI R"), Command::SpecialKey(Mods::LEFT_GUI, Keyboard::R));
        assert_eq!(classify("CTRL alt"), Command::SpecialKey(Mods::LEFT_CTRL, Keyboard::A));
        assert_eq!(classify("ALT f4"), Command::SpecialKey(Mods::LEFT_ALT, Keyboard::F));
        assert_eq!(classify("SHIFT \t"), Command::Skip);
    }

    #[test]
    fn empty_chord_param() {
        assert_eq!(
            classify("GUI"),
            Command::SpecialKey(Mods::LEFT_GUI, Keyboard::NoEventIndicated)
        );
        assert_eq!(classify("CTRL"), Command::Skip);
        assert_eq!(classify("ALT"), Command::Skip);
        assert_eq!(classify("SHIFT"), Command::Skip);
    }

    #[test]
    fn chord_with_unmapped_char() {
        assert_eq!(classify("GUI é"), Command::Skip);
        assert_eq!(classify("CTRL é"), Command::Skip);
    }

    #[test]
    fn chord_needs_unshifted_char() {
        assert_eq!(classify("CTRL !"), Command::Skip);
        assert_eq!(classify("ALT ?"), Command::Skip);
        assert_eq!(classify("SHIFT ~"), Command::Skip);
        assert_eq!(classify("CTRL /"), Command::SpecialKey(Mods::LEFT_CTRL, Keyboard::ForwardSlash));
        assert_eq!(classify("GUI 1"), Command::SpecialKey(Mods::LEFT_GUI, Keyboard::Keyboard1));
    }

    #[test]
    fn delay_parsing() {
        assert_eq!(parse_delay("100"), 100);
        assert_eq!(parse_delay("  42ms"), 42);
        assert_eq!(parse_delay("+7"), 7);
        assert_eq!(parse_delay("-5"), 0);
        assert_eq!(parse_delay("abc"), 0);
        assert_eq!(parse_delay(""), 0);
        assert_eq!(parse_delay("99999999999"), u32::MAX);
    }
}
