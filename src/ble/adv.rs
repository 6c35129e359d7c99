//! Advertising and scan-response payloads (AD structures, max 31 bytes each).
//!
//! The advertisement carries what a host filters on: flags, appearance,
//! the HID and Battery service UUIDs and the device name. The 128-bit
//! command service UUID goes in the scan response.

use heapless::Vec;

/// Legacy advertising payload limit.
pub const MAX_AD_LEN: usize = 31;

// AD types
const AD_FLAGS: u8 = 0x01;
const AD_UUID16_COMPLETE: u8 = 0x03;
const AD_UUID128_COMPLETE: u8 = 0x07;
const AD_NAME_SHORT: u8 = 0x08;
const AD_NAME_COMPLETE: u8 = 0x09;
const AD_APPEARANCE: u8 = 0x19;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISC_NO_BREDR: u8 = 0x06;

pub const HID_SERVICE_UUID16: u16 = 0x1812;
pub const BATTERY_SERVICE_UUID16: u16 = 0x180F;

pub type AdPayload = Vec<u8, MAX_AD_LEN>;

fn push_structure(buf: &mut AdPayload, ad_type: u8, data: &[u8]) -> bool {
    if buf.len() + 2 + data.len() > MAX_AD_LEN {
        return false;
    }
    // Capacity checked above.
    let _ = buf.push(data.len() as u8 + 1);
    let _ = buf.push(ad_type);
    let _ = buf.extend_from_slice(data);
    true
}

/// Advertisement: flags, appearance, 16-bit service list, local name.
///
/// A name that does not fit is cut and sent as a Shortened Local Name.
pub fn advertisement(name: &str, appearance: u16) -> AdPayload {
    let mut buf = AdPayload::new();
    push_structure(&mut buf, AD_FLAGS, &[FLAGS_GENERAL_DISC_NO_BREDR]);
    push_structure(&mut buf, AD_APPEARANCE, &appearance.to_le_bytes());

    let hid = HID_SERVICE_UUID16.to_le_bytes();
    let bas = BATTERY_SERVICE_UUID16.to_le_bytes();
    push_structure(&mut buf, AD_UUID16_COMPLETE, &[hid[0], hid[1], bas[0], bas[1]]);

    let room = MAX_AD_LEN.saturating_sub(buf.len() + 2);
    let name = name.as_bytes();
    if name.len() <= room {
        push_structure(&mut buf, AD_NAME_COMPLETE, name);
    } else if room > 0 {
        push_structure(&mut buf, AD_NAME_SHORT, &name[..room]);
    }
    buf
}

/// Scan response: the command service UUID.
pub fn scan_response(command_service: u128) -> AdPayload {
    let mut buf = AdPayload::new();
    push_structure(&mut buf, AD_UUID128_COMPLETE, &command_service.to_le_bytes());
    buf
}
