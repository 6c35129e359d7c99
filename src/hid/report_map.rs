//! Composite HID Report Map served from the HID Service (0x2A4B).
//!
//! Three top-level Application Collections, multiplexed by Report ID.
//! Each collection's input fields add up to exactly the byte layout the
//! matching encoder produces:
//!
//! | ID | Collection        | Bytes | Encoder            |
//! |----|-------------------|-------|--------------------|
//! | 1  | Consumer Control  | 2     | `ConsumerReport`   |
//! | 2  | Mouse             | 3     | `MouseReport`      |
//! | 3  | Keyboard          | 8     | `KeyboardReport`   |
//!
//! There is no keyboard LED output report: host-to-device feedback is
//! not supported.

use super::consumer::CONSUMER_REPORT_SIZE;
use super::keyboard::KEYBOARD_REPORT_SIZE;
use super::mouse::MOUSE_REPORT_SIZE;
use super::report_protocol::{DescriptorError, ReportMapLayout};
use super::ReportId;

#[rustfmt::skip]
pub const REPORT_MAP: &[u8] = &[
    // - Consumer Control (Report ID 1) -
    0x05, 0x0C,         // Usage Page (Consumer)
    0x09, 0x01,         // Usage (Consumer Control)
    0xA1, 0x01,         // Collection (Application)
    0x85, 0x01,         //   Report ID (1)
    0x15, 0x00,         //   Logical Minimum (0)
    0x26, 0xFF, 0x03,   //   Logical Maximum (1023)
    0x19, 0x00,         //   Usage Minimum (0)
    0x2A, 0xFF, 0x03,   //   Usage Maximum (1023)
    0x75, 0x10,         //   Report Size (16)
    0x95, 0x01,         //   Report Count (1)
    0x81, 0x00,         //   Input (Data, Array, Absolute)
    0xC0,               // End Collection
    //
    // - Mouse (Report ID 2) -
    0x05, 0x01,         // Usage Page (Generic Desktop)
    0x09, 0x02,         // Usage (Mouse)
    0xA1, 0x01,         // Collection (Application)
    0x85, 0x02,         //   Report ID (2)
    0x09, 0x01,         //   Usage (Pointer)
    0xA1, 0x00,         //   Collection (Physical)
    0x05, 0x09,         //     Usage Page (Buttons)
    0x19, 0x01,         //     Usage Minimum (Button 1)
    0x29, 0x03,         //     Usage Maximum (Button 3)
    0x15, 0x00,         //     Logical Minimum (0)
    0x25, 0x01,         //     Logical Maximum (1)
    0x95, 0x03,         //     Report Count (3)
    0x75, 0x01,         //     Report Size (1)
    0x81, 0x02,         //     Input (Data, Variable, Absolute)
    0x95, 0x01,         //     Report Count (1)
    0x75, 0x05,         //     Report Size (5)
    0x81, 0x01,         //     Input (Constant) - padding
    0x05, 0x01,         //     Usage Page (Generic Desktop)
    0x09, 0x30,         //     Usage (X)
    0x09, 0x31,         //     Usage (Y)
    0x15, 0x81,         //     Logical Minimum (-127)
    0x25, 0x7F,         //     Logical Maximum (127)
    0x75, 0x08,         //     Report Size (8)
    0x95, 0x02,         //     Report Count (2)
    0x81, 0x06,         //     Input (Data, Variable, Relative)
    0xC0,               //   End Collection (Physical)
    0xC0,               // End Collection (Application)
    //
    // - Keyboard (Report ID 3) -
    0x05, 0x01,         // Usage Page (Generic Desktop)
    0x09, 0x06,         // Usage (Keyboard)
    0xA1, 0x01,         // Collection (Application)
    0x85, 0x03,         //   Report ID (3)
    0x05, 0x07,         //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0,         //   Usage Minimum (Left Control)
    0x29, 0xE7,         //   Usage Maximum (Right GUI)
    0x15, 0x00,         //   Logical Minimum (0)
    0x25, 0x01,         //   Logical Maximum (1)
    0x75, 0x01,         //   Report Size (1)
    0x95, 0x08,         //   Report Count (8)
    0x81, 0x02,         //   Input (Data, Variable, Absolute)
    0x95, 0x01,         //   Report Count (1)
    0x75, 0x08,         //   Report Size (8)
    0x81, 0x01,         //   Input (Constant) - reserved byte
    0x19, 0x00,         //   Usage Minimum (0)
    0x29, 0xFF,         //   Usage Maximum (255)
    0x15, 0x00,         //   Logical Minimum (0)
    0x26, 0xFF, 0x00,   //   Logical Maximum (255)
    0x95, 0x06,         //   Report Count (6)
    0x75, 0x08,         //   Report Size (8)
    0x81, 0x00,         //   Input (Data, Array)
    0xC0,               // End Collection
];

/// Input payload length the report map declares for `id`.
pub const fn declared_len(id: ReportId) -> usize {
    match id {
        ReportId::ConsumerControl => CONSUMER_REPORT_SIZE,
        ReportId::Mouse => MOUSE_REPORT_SIZE,
        ReportId::Keyboard => KEYBOARD_REPORT_SIZE,
    }
}

/// Parse `map` and check that every report ID declares exactly what its
/// encoder writes.
pub fn validate(map: &[u8]) -> Result<ReportMapLayout, DescriptorError> {
    let layout = ReportMapLayout::parse(map)?;
    for id in ReportId::ALL {
        if layout.input_bytes(id) != Some(declared_len(id)) {
            return Err(DescriptorError::LengthMismatch(id));
        }
    }
    Ok(layout)
}
