//! Consumer Control HID support - media keys and volume (Report ID 1).
//!
//! Consumer Control is a separate HID usage page (0x0C). The report is a
//! single 16-bit usage code, little-endian; all-zero means released.

/// Consumer control report size (2 bytes for usage ID).
pub const CONSUMER_REPORT_SIZE: usize = 2;

/// Consumer control actions reachable from the command line (Usage Page 0x0C).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ConsumerAction {
    /// Volume up.
    VolumeUp = 0x00E9,
    /// Volume down.
    VolumeDown = 0x00EA,
    /// Mute toggle.
    Mute = 0x00E2,
    /// Play/Pause toggle.
    PlayPause = 0x00CD,
    /// Scan next track.
    Next = 0x00B5,
    /// Scan previous track.
    Previous = 0x00B6,
    /// Stop.
    Stop = 0x00B7,
}

impl ConsumerAction {
    pub const fn usage(self) -> u16 {
        self as u16
    }
}

/// Consumer Control HID report.
///
/// Simple 2-byte report containing a single usage code.
/// Multiple simultaneous keys are not supported in this implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    /// Active consumer control usage (little-endian u16 on the wire).
    pub usage: u16,
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    /// Create a report with a single usage.
    pub const fn new(action: ConsumerAction) -> Self {
        Self {
            usage: action.usage(),
        }
    }

    /// Serialize to HID report bytes.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        buf[..CONSUMER_REPORT_SIZE].copy_from_slice(&self.usage.to_le_bytes());
        CONSUMER_REPORT_SIZE
    }

    pub fn to_bytes(&self) -> [u8; CONSUMER_REPORT_SIZE] {
        self.usage.to_le_bytes()
    }

    /// Parse a report back from its wire bytes.
    #[cfg(test)]
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < CONSUMER_REPORT_SIZE {
            return None;
        }
        Some(Self {
            usage: u16::from_le_bytes([data[0], data[1]]),
        })
    }

    /// Returns `true` for the release report (no usage active).
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumer_report_empty() {
        let report = ConsumerReport::empty();
        assert!(report.is_empty());
        assert_eq!(report.to_bytes(), [0x00, 0x00]);
    }

    #[test]
    fn consumer_usage_codes() {
        assert_eq!(ConsumerAction::VolumeUp.usage(), 0x00E9);
        assert_eq!(ConsumerAction::VolumeDown.usage(), 0x00EA);
        assert_eq!(ConsumerAction::Mute.usage(), 0x00E2);
        assert_eq!(ConsumerAction::PlayPause.usage(), 0x00CD);
        assert_eq!(ConsumerAction::Next.usage(), 0x00B5);
        assert_eq!(ConsumerAction::Previous.usage(), 0x00B6);
        assert_eq!(ConsumerAction::Stop.usage(), 0x00B7);
    }

    #[test]
    fn consumer_report_serialize() {
        let report = ConsumerReport::new(ConsumerAction::PlayPause);
        let mut buf = [0u8; 2];
        let len = report.serialize(&mut buf);
        assert_eq!(len, 2);
        assert_eq!(buf, [0xCD, 0x00]); // Little-endian 0x00CD
    }

    #[test]
    fn consumer_report_serialize_buffer_too_small() {
        let report = ConsumerReport::new(ConsumerAction::VolumeUp);
        let mut buf = [0u8; 1];
        assert_eq!(report.serialize(&mut buf), 0);
    }

    #[test]
    fn consumer_report_from_bytes() {
        let report = ConsumerReport::from_bytes(&[0xE9, 0x00]).unwrap();
        assert_eq!(report, ConsumerReport::new(ConsumerAction::VolumeUp));
        assert!(ConsumerReport::from_bytes(&[0xE9]).is_none());
    }
}
