//! Character and key-name tables for the US-QWERTY layout.
//!
//! `lookup` maps a typed character to the key combination that produces
//! it. Anything outside the table (non-ASCII, unlisted control characters)
//! is unsupported; callers skip it and carry on.

use crate::hid::keyboard::keycode as kc;
use crate::hid::{KeyPress, Modifiers};

/// ASCII to key combination table.
/// Index = ASCII code, `None` = unsupported.
static ASCII_TABLE: [Option<KeyPress>; 128] = {
    let mut table: [Option<KeyPress>; 128] = [None; 128];

    // Letters (case selects Left Shift)
    let mut i = 0u8;
    while i < 26 {
        table[(b'a' + i) as usize] = Some(KeyPress::plain(kc::A + i));
        table[(b'A' + i) as usize] = Some(KeyPress::shifted(kc::A + i));
        i += 1;
    }

    // Digits 1-9 then 0, and their shifted symbols
    let shifted_digits = *b")!@#$%^&*(";
    let mut d = 0u8;
    while d < 10 {
        let code = if d == 0 { kc::N0 } else { kc::N1 + d - 1 };
        table[(b'0' + d) as usize] = Some(KeyPress::plain(code));
        table[shifted_digits[d as usize] as usize] = Some(KeyPress::shifted(code));
        d += 1;
    }

    // Whitespace
    table[b' ' as usize] = Some(KeyPress::plain(kc::SPACE));
    table[b'\n' as usize] = Some(KeyPress::plain(kc::ENTER));
    table[b'\r' as usize] = Some(KeyPress::plain(kc::ENTER));
    table[b'\t' as usize] = Some(KeyPress::plain(kc::TAB));

    // Punctuation: (plain, shifted, key)
    let punct: [(u8, u8, u8); 11] = [
        (b'-', b'_', kc::MINUS),
        (b'=', b'+', kc::EQUAL),
        (b'[', b'{', kc::LEFT_BRACKET),
        (b']', b'}', kc::RIGHT_BRACKET),
        (b'\\', b'|', kc::BACKSLASH),
        (b';', b':', kc::SEMICOLON),
        (b'\'', b'"', kc::APOSTROPHE),
        (b'`', b'~', kc::GRAVE),
        (b',', b'<', kc::COMMA),
        (b'.', b'>', kc::PERIOD),
        (b'/', b'?', kc::SLASH),
    ];
    let mut p = 0;
    while p < punct.len() {
        let (plain, shifted, code) = punct[p];
        table[plain as usize] = Some(KeyPress::plain(code));
        table[shifted as usize] = Some(KeyPress::shifted(code));
        p += 1;
    }

    table
};

/// Key combination that types `ch`, or `None` if the layout has no key for it.
#[inline]
pub fn lookup(ch: char) -> Option<KeyPress> {
    let code = ch as u32;
    if code < 128 {
        ASCII_TABLE[code as usize]
    } else {
        None
    }
}

/// Modifier named in a `key` combo (`ctrl`, `shift`, `alt`, `gui` and the
/// right-hand `r` variants). Case-insensitive.
pub fn modifier_by_name(name: &str) -> Option<Modifiers> {
    const NAMES: [(&str, Modifiers); 11] = [
        ("ctrl", Modifiers::LEFT_CTRL),
        ("shift", Modifiers::LEFT_SHIFT),
        ("alt", Modifiers::LEFT_ALT),
        ("gui", Modifiers::LEFT_GUI),
        ("win", Modifiers::LEFT_GUI),
        ("cmd", Modifiers::LEFT_GUI),
        ("meta", Modifiers::LEFT_GUI),
        ("rctrl", Modifiers::RIGHT_CTRL),
        ("rshift", Modifiers::RIGHT_SHIFT),
        ("ralt", Modifiers::RIGHT_ALT),
        ("rgui", Modifiers::RIGHT_GUI),
    ];
    NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, m)| m)
}

/// Non-printing key named in a `key` combo. Case-insensitive.
pub fn key_by_name(name: &str) -> Option<u8> {
    const NAMES: [(&str, u8); 20] = [
        ("enter", kc::ENTER),
        ("return", kc::ENTER),
        ("esc", kc::ESCAPE),
        ("escape", kc::ESCAPE),
        ("backspace", kc::BACKSPACE),
        ("tab", kc::TAB),
        ("space", kc::SPACE),
        ("delete", kc::DELETE),
        ("del", kc::DELETE),
        ("insert", kc::INSERT),
        ("home", kc::HOME),
        ("end", kc::END),
        ("pageup", kc::PAGE_UP),
        ("pagedown", kc::PAGE_DOWN),
        ("up", kc::UP_ARROW),
        ("down", kc::DOWN_ARROW),
        ("left", kc::LEFT_ARROW),
        ("right", kc::RIGHT_ARROW),
        ("capslock", kc::CAPS_LOCK),
        ("printscreen", kc::PRINT_SCREEN),
    ];
    if let Some(&(_, code)) = NAMES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        return Some(code);
    }

    // f1 .. f12
    let digits = name
        .strip_prefix('f')
        .or_else(|| name.strip_prefix('F'))?;
    match digits.parse::<u8>() {
        Ok(n @ 1..=12) => Some(kc::F1 + n - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_follow_case() {
        assert_eq!(lookup('a'), Some(KeyPress::plain(0x04)));
        assert_eq!(lookup('z'), Some(KeyPress::plain(0x1D)));
        assert_eq!(lookup('H'), Some(KeyPress::shifted(0x0B)));
        assert_eq!(lookup('Z'), Some(KeyPress::shifted(0x1D)));
    }

    #[test]
    fn digits_run_one_to_nine_then_zero() {
        assert_eq!(lookup('1'), Some(KeyPress::plain(0x1E)));
        assert_eq!(lookup('9'), Some(KeyPress::plain(0x26)));
        assert_eq!(lookup('0'), Some(KeyPress::plain(0x27)));
    }

    #[test]
    fn shifted_symbols_use_us_layout() {
        assert_eq!(lookup('!'), Some(KeyPress::shifted(0x1E)));
        assert_eq!(lookup('@'), Some(KeyPress::shifted(0x1F)));
        assert_eq!(lookup(')'), Some(KeyPress::shifted(0x27)));
        assert_eq!(lookup('_'), Some(KeyPress::shifted(kc::MINUS)));
        assert_eq!(lookup('+'), Some(KeyPress::shifted(kc::EQUAL)));
        assert_eq!(lookup('{'), Some(KeyPress::shifted(kc::LEFT_BRACKET)));
        assert_eq!(lookup('|'), Some(KeyPress::shifted(kc::BACKSLASH)));
        assert_eq!(lookup(':'), Some(KeyPress::shifted(kc::SEMICOLON)));
        assert_eq!(lookup('"'), Some(KeyPress::shifted(kc::APOSTROPHE)));
        assert_eq!(lookup('<'), Some(KeyPress::shifted(kc::COMMA)));
        assert_eq!(lookup('>'), Some(KeyPress::shifted(kc::PERIOD)));
        assert_eq!(lookup('?'), Some(KeyPress::shifted(kc::SLASH)));
        assert_eq!(lookup('~'), Some(KeyPress::shifted(kc::GRAVE)));
    }

    #[test]
    fn whitespace_keys() {
        assert_eq!(lookup(' '), Some(KeyPress::plain(kc::SPACE)));
        assert_eq!(lookup('\n'), Some(KeyPress::plain(kc::ENTER)));
        assert_eq!(lookup('\r'), Some(KeyPress::plain(kc::ENTER)));
        assert_eq!(lookup('\t'), Some(KeyPress::plain(kc::TAB)));
    }

    #[test]
    fn every_printable_ascii_is_mapped() {
        for b in 0x20u8..0x7F {
            assert!(lookup(b as char).is_some(), "no key for {:?}", b as char);
        }
    }

    #[test]
    fn unsupported_characters_fail_consistently() {
        for ch in ['\0', '\x07', '\x08', '\x1B', '\x7F', 'é', '€', '😀'] {
            assert_eq!(lookup(ch), None);
            assert_eq!(lookup(ch), None);
        }
    }

    #[test]
    fn key_names_resolve() {
        assert_eq!(key_by_name("enter"), Some(kc::ENTER));
        assert_eq!(key_by_name("ESC"), Some(kc::ESCAPE));
        assert_eq!(key_by_name("f1"), Some(kc::F1));
        assert_eq!(key_by_name("F12"), Some(kc::F12));
        assert_eq!(key_by_name("f13"), None);
        assert_eq!(key_by_name("f0"), None);
        assert_eq!(key_by_name("banana"), None);
    }

    #[test]
    fn modifier_names_resolve() {
        assert_eq!(modifier_by_name("ctrl"), Some(Modifiers::LEFT_CTRL));
        assert_eq!(modifier_by_name("Win"), Some(Modifiers::LEFT_GUI));
        assert_eq!(modifier_by_name("ralt"), Some(Modifiers::RIGHT_ALT));
        assert_eq!(modifier_by_name("hyper"), None);
    }
}
