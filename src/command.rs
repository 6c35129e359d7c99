//! Command interpreter - one GATT write in, one [`Command`] out.
//!
//! A write is treated as an ASCII command line. Keywords are matched as
//! case-sensitive prefixes in a fixed priority order, first match wins:
//!
//! ```text
//! cancel  volup  voldown  mute  play  next  prev  stop
//! move <dx> <dy>  click  rightclick  middleclick  key <combo>
//! ```
//!
//! Bare keywords match anywhere the line starts with them (`mutex` is
//! `mute`). Keywords with arguments need the separating space (`move 1 2`),
//! so a line such as `keyboard` or `moved` is typed as text. Anything that
//! matches no keyword is typed verbatim, character by character.

use heapless::Vec;

use crate::config::MAX_COMMAND_LEN;
use crate::error::Error;
use crate::hid::{ConsumerAction, KeyPress, Modifiers, MouseButton};
use crate::keymap;

/// Keyword commands without arguments, in match order.
const BARE_KEYWORDS: [(&str, Command); 7] = [
    ("volup", Command::Consumer(ConsumerAction::VolumeUp)),
    ("voldown", Command::Consumer(ConsumerAction::VolumeDown)),
    ("mute", Command::Consumer(ConsumerAction::Mute)),
    ("play", Command::Consumer(ConsumerAction::PlayPause)),
    ("next", Command::Consumer(ConsumerAction::Next)),
    ("prev", Command::Consumer(ConsumerAction::Previous)),
    ("stop", Command::Consumer(ConsumerAction::Stop)),
];

/// Parsed intent of one write.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Abort the text currently being typed.
    Cancel,
    /// One media / volume key tap.
    Consumer(ConsumerAction),
    /// One key combination tap (`key ctrl+c`).
    KeyPress(KeyPress),
    /// Relative pointer motion, split into per-report steps when large.
    MouseMove { dx: i16, dy: i16 },
    /// Button down then up.
    MouseClick(MouseButton),
    /// Literal text.
    TypeText(TypedText),
}

/// Keystrokes for a literal text line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TypedText {
    pub keys: Vec<KeyPress, MAX_COMMAND_LEN>,
    /// Characters that had no key and were left out.
    pub skipped: usize,
}

impl Command {
    /// Decode and parse a raw write payload.
    pub fn from_payload(payload: &[u8]) -> Result<Command, Error> {
        parse(decode(payload)?)
    }

    /// Like [`Command::from_payload`], for a GATT write at `offset`.
    ///
    /// A command must arrive whole in one write; continuation fragments
    /// of a long write are rejected rather than parsed on their own.
    pub fn from_write(offset: usize, payload: &[u8]) -> Result<Command, Error> {
        if offset != 0 {
            return Err(Error::MalformedInput);
        }
        Command::from_payload(payload)
    }
}

/// Validate a raw write and view it as text.
///
/// The payload must be 1..=[`MAX_COMMAND_LEN`] bytes. A NUL byte ends the
/// line early, as a C client would terminate it. The remainder must be
/// valid UTF-8 and not empty.
pub fn decode(payload: &[u8]) -> Result<&str, Error> {
    if payload.is_empty() || payload.len() > MAX_COMMAND_LEN {
        return Err(Error::MalformedInput);
    }
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    if end == 0 {
        return Err(Error::MalformedInput);
    }
    core::str::from_utf8(&payload[..end]).map_err(|_| Error::MalformedInput)
}

/// Classify one command line.
pub fn parse(line: &str) -> Result<Command, Error> {
    if line.starts_with("cancel") {
        return Ok(Command::Cancel);
    }

    if let Some((_, cmd)) = BARE_KEYWORDS.iter().find(|(kw, _)| line.starts_with(kw)) {
        return Ok(cmd.clone());
    }

    if let Some(args) = line.strip_prefix("move ") {
        return parse_move(args);
    }

    if line.starts_with("click") {
        return Ok(Command::MouseClick(MouseButton::Left));
    }

    if line.starts_with("rightclick") {
        return Ok(Command::MouseClick(MouseButton::Right));
    }

    if line.starts_with("middleclick") {
        return Ok(Command::MouseClick(MouseButton::Middle));
    }

    if let Some(args) = line.strip_prefix("key ") {
        return parse_combo(args.trim()).map(Command::KeyPress);
    }

    Ok(Command::TypeText(typed_text(line)))
}

/// `<dx> <dy>`: two signed decimal integers separated by whitespace.
fn parse_move(args: &str) -> Result<Command, Error> {
    let mut parts = args.split_ascii_whitespace();
    let (Some(dx), Some(dy), None) = (parts.next(), parts.next(), parts.next()) else {
        warn_invalid_arguments(args);
        return Err(Error::InvalidArguments);
    };
    match (dx.parse::<i16>(), dy.parse::<i16>()) {
        (Ok(dx), Ok(dy)) => Ok(Command::MouseMove { dx, dy }),
        _ => {
            warn_invalid_arguments(args);
            Err(Error::InvalidArguments)
        }
    }
}

/// `mod+mod+key`. The key is a name from [`keymap::key_by_name`] or a single
/// character (its own shift is merged in). A lone modifier is allowed.
fn parse_combo(combo: &str) -> Result<KeyPress, Error> {
    if combo.is_empty() {
        warn_invalid_arguments(combo);
        return Err(Error::InvalidArguments);
    }

    // `+` itself is a valid key: `key +`, `key ctrl++`.
    let (mods, key) = if combo == "+" {
        ("", "+")
    } else if let Some(mods) = combo.strip_suffix("++") {
        (mods, "+")
    } else {
        match combo.rsplit_once('+') {
            Some((mods, key)) => (mods, key),
            None => ("", combo),
        }
    };

    let mut modifiers = Modifiers::NONE;
    for name in mods.split('+').filter(|s| !s.is_empty()) {
        match keymap::modifier_by_name(name) {
            Some(m) => modifiers = modifiers | m,
            None => {
                warn_invalid_arguments(combo);
                return Err(Error::InvalidArguments);
            }
        }
    }

    if let Some(m) = keymap::modifier_by_name(key) {
        return Ok(KeyPress::new(modifiers | m, 0));
    }

    if let Some(code) = keymap::key_by_name(key) {
        return Ok(KeyPress::new(modifiers, code));
    }

    let mut chars = key.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if let Some(press) = keymap::lookup(ch) {
            return Ok(KeyPress::new(modifiers | press.modifiers, press.keycode));
        }
    }

    warn_invalid_arguments(combo);
    Err(Error::InvalidArguments)
}

/// Look up every character; unsupported ones are logged and left out.
fn typed_text(line: &str) -> TypedText {
    let mut text = TypedText::default();
    for ch in line.chars() {
        match keymap::lookup(ch) {
            Some(press) => {
                if text.keys.push(press).is_err() {
                    break;
                }
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Skipping: {}", Error::UnsupportedCharacter(ch));
                text.skipped += 1;
            }
        }
    }
    text
}

#[allow(unused_variables)]
fn warn_invalid_arguments(args: &str) {
    #[cfg(feature = "defmt")]
    defmt::warn!("Invalid command arguments: {=str}", args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::keyboard::keycode as kc;

    fn text(cmd: Command) -> TypedText {
        match cmd {
            Command::TypeText(t) => t,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_empty_and_oversized() {
        assert_eq!(decode(b""), Err(Error::MalformedInput));
        assert_eq!(decode(&[b'a'; MAX_COMMAND_LEN + 1]), Err(Error::MalformedInput));
        assert!(decode(&[b'a'; MAX_COMMAND_LEN]).is_ok());
    }

    #[test]
    fn decode_stops_at_nul() {
        assert_eq!(decode(b"volup\0garbage"), Ok("volup"));
        assert_eq!(decode(b"\0volup"), Err(Error::MalformedInput));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert_eq!(decode(&[0x66, 0xFF, 0x66]), Err(Error::MalformedInput));
    }

    #[test]
    fn consumer_keywords() {
        let cases = [
            ("volup", ConsumerAction::VolumeUp),
            ("voldown", ConsumerAction::VolumeDown),
            ("mute", ConsumerAction::Mute),
            ("play", ConsumerAction::PlayPause),
            ("next", ConsumerAction::Next),
            ("prev", ConsumerAction::Previous),
            ("stop", ConsumerAction::Stop),
        ];
        for (line, action) in cases {
            assert_eq!(parse(line), Ok(Command::Consumer(action)));
        }
    }

    #[test]
    fn keywords_match_as_prefixes() {
        assert_eq!(parse("mutex"), Ok(Command::Consumer(ConsumerAction::Mute)));
        assert_eq!(parse("volup\n"), Ok(Command::Consumer(ConsumerAction::VolumeUp)));
        assert_eq!(parse("playlist"), Ok(Command::Consumer(ConsumerAction::PlayPause)));
        assert_eq!(parse("clicked"), Ok(Command::MouseClick(MouseButton::Left)));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let t = text(parse("VOLUP").unwrap());
        assert_eq!(t.keys.len(), 5);
    }

    #[test]
    fn move_parses_two_signed_integers() {
        assert_eq!(parse("move 10 -5"), Ok(Command::MouseMove { dx: 10, dy: -5 }));
        assert_eq!(parse("move   -1\t+2\n"), Ok(Command::MouseMove { dx: -1, dy: 2 }));
        assert_eq!(parse("move 300 0"), Ok(Command::MouseMove { dx: 300, dy: 0 }));
    }

    #[test]
    fn move_rejects_bad_arguments() {
        assert_eq!(parse("move abc"), Err(Error::InvalidArguments));
        assert_eq!(parse("move 1"), Err(Error::InvalidArguments));
        assert_eq!(parse("move 1 2 3"), Err(Error::InvalidArguments));
        assert_eq!(parse("move 1 x"), Err(Error::InvalidArguments));
        assert_eq!(parse("move 40000 0"), Err(Error::InvalidArguments));
    }

    #[test]
    fn move_without_space_is_text() {
        assert!(matches!(parse("moved"), Ok(Command::TypeText(_))));
        assert!(matches!(parse("move"), Ok(Command::TypeText(_))));
    }

    #[test]
    fn clicks() {
        assert_eq!(parse("click"), Ok(Command::MouseClick(MouseButton::Left)));
        assert_eq!(parse("rightclick"), Ok(Command::MouseClick(MouseButton::Right)));
        assert_eq!(parse("middleclick"), Ok(Command::MouseClick(MouseButton::Middle)));
    }

    #[test]
    fn cancel_has_top_priority() {
        assert_eq!(parse("cancel"), Ok(Command::Cancel));
    }

    #[test]
    fn key_combos() {
        assert_eq!(
            parse("key ctrl+c"),
            Ok(Command::KeyPress(KeyPress::new(Modifiers::LEFT_CTRL, 0x06)))
        );
        assert_eq!(
            parse("key ctrl+alt+delete"),
            Ok(Command::KeyPress(KeyPress::new(
                Modifiers::LEFT_CTRL | Modifiers::LEFT_ALT,
                kc::DELETE
            )))
        );
        assert_eq!(
            parse("key enter"),
            Ok(Command::KeyPress(KeyPress::plain(kc::ENTER)))
        );
        assert_eq!(
            parse("key gui"),
            Ok(Command::KeyPress(KeyPress::new(Modifiers::LEFT_GUI, 0)))
        );
        assert_eq!(
            parse("key alt+f4"),
            Ok(Command::KeyPress(KeyPress::new(Modifiers::LEFT_ALT, kc::F1 + 3)))
        );
    }

    #[test]
    fn key_combo_merges_character_shift() {
        assert_eq!(
            parse("key ctrl+T"),
            Ok(Command::KeyPress(KeyPress::new(
                Modifiers::LEFT_CTRL | Modifiers::LEFT_SHIFT,
                0x17
            )))
        );
        assert_eq!(
            parse("key ctrl++"),
            Ok(Command::KeyPress(KeyPress::new(
                Modifiers::LEFT_CTRL | Modifiers::LEFT_SHIFT,
                kc::EQUAL
            )))
        );
        assert_eq!(
            parse("key +"),
            Ok(Command::KeyPress(KeyPress::shifted(kc::EQUAL)))
        );
    }

    #[test]
    fn key_combo_rejects_unknown_names() {
        assert_eq!(parse("key "), Err(Error::InvalidArguments));
        assert_eq!(parse("key hyper+x"), Err(Error::InvalidArguments));
        assert_eq!(parse("key ctrl+banana"), Err(Error::InvalidArguments));
        assert_eq!(parse("key ctrl+é"), Err(Error::InvalidArguments));
    }

    #[test]
    fn text_is_typed_verbatim() {
        let t = text(parse("Hi!").unwrap());
        assert_eq!(t.skipped, 0);
        assert_eq!(
            t.keys.as_slice(),
            &[
                KeyPress::shifted(0x0B),
                KeyPress::plain(0x0C),
                KeyPress::shifted(0x1E),
            ]
        );
    }

    #[test]
    fn text_skips_unsupported_characters() {
        let t = text(parse("a€b\x07c").unwrap());
        assert_eq!(t.skipped, 2);
        assert_eq!(
            t.keys.as_slice(),
            &[KeyPress::plain(0x04), KeyPress::plain(0x05), KeyPress::plain(0x06)]
        );
    }

    #[test]
    fn from_payload_chains_decode_and_parse() {
        assert_eq!(
            Command::from_payload(b"volup"),
            Ok(Command::Consumer(ConsumerAction::VolumeUp))
        );
        assert_eq!(Command::from_payload(b""), Err(Error::MalformedInput));
        assert_eq!(Command::from_payload(b"move abc"), Err(Error::InvalidArguments));
    }

    #[test]
    fn write_fragments_are_rejected() {
        assert_eq!(Command::from_write(0, b"enter"), Command::from_payload(b"enter"));
        assert_eq!(Command::from_write(4, b"volup"), Err(Error::MalformedInput));
        assert_eq!(Command::from_write(1, b"stop"), Err(Error::MalformedInput));
    }
}
