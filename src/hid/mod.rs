//! HID report types, the composite report map, and its validator.

pub mod consumer;
pub mod keyboard;
pub mod mouse;
pub mod report_map;
pub mod report_protocol;


pub use consumer::{ConsumerAction, ConsumerReport};
pub use keyboard::{KeyPress, KeyboardReport, Modifiers};
pub use mouse::{MouseButton, MouseReport};

/// Largest input report payload (keyboard).
pub const MAX_REPORT_SIZE: usize = keyboard::KEYBOARD_REPORT_SIZE;

/// Report IDs of the composite report map. Must match [`report_map::REPORT_MAP`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReportId {
    ConsumerControl = 1,
    Mouse = 2,
    Keyboard = 3,
}

impl ReportId {
    pub const ALL: [ReportId; 3] = [ReportId::ConsumerControl, ReportId::Mouse, ReportId::Keyboard];
}

/// One input report, ready to be handed to the HID transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    Consumer(ConsumerReport),
}

impl HidReport {
    pub fn report_id(&self) -> ReportId {
        match self {
            HidReport::Keyboard(_) => ReportId::Keyboard,
            HidReport::Mouse(_) => ReportId::Mouse,
            HidReport::Consumer(_) => ReportId::ConsumerControl,
        }
    }

    /// All-released report of the same kind.
    pub fn released(&self) -> HidReport {
        match self {
            HidReport::Keyboard(_) => HidReport::Keyboard(KeyboardReport::empty()),
            HidReport::Mouse(_) => HidReport::Mouse(MouseReport::empty()),
            HidReport::Consumer(_) => HidReport::Consumer(ConsumerReport::empty()),
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Mouse(m) => m.serialize(buf),
            HidReport::Consumer(c) => c.serialize(buf),
        }
    }

    /// Rebuild a typed report from what went over the wire.
    #[cfg(test)]
    pub fn decode(report_id: ReportId, data: &[u8]) -> Option<HidReport> {
        match report_id {
            ReportId::Keyboard => KeyboardReport::from_bytes(data).map(HidReport::Keyboard),
            ReportId::Mouse => MouseReport::from_bytes(data).map(HidReport::Mouse),
            ReportId::ConsumerControl => {
                ConsumerReport::from_bytes(data).map(HidReport::Consumer)
            }
        }
    }
}

// Encoder entry points

/// Consumer press report and its all-zero release.
pub fn encode_consumer(action: ConsumerAction) -> ([u8; 2], [u8; 2]) {
    (
        ConsumerReport::new(action).to_bytes(),
        ConsumerReport::empty().to_bytes(),
    )
}

/// Keyboard press report for any modifier byte / keycode pair.
pub fn encode_keyboard(modifiers: u8, keycode: u8) -> [u8; 8] {
    KeyboardReport::press(KeyPress::new(Modifiers(modifiers), keycode)).to_bytes()
}

/// Keyboard release report.
pub fn keyboard_release() -> [u8; 8] {
    KeyboardReport::empty().to_bytes()
}

/// Mouse report; only the low 3 bits of `buttons` are meaningful to the host.
pub fn encode_mouse(dx: i8, dy: i8, buttons: u8) -> [u8; 3] {
    MouseReport {
        buttons,
        x: dx,
        y: dy,
    }
    .to_bytes()
}
