//! HID mouse report (Report ID 2).
//!
//! Layout (3 bytes):
//! ```text
//! Byte 0: Button bitfield
//!         Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle, Bits 3-7 = padding
//! Byte 1: X displacement (signed, two's complement)
//! Byte 2: Y displacement (signed, two's complement)
//! ```

/// Mouse report size in bytes.
pub const MOUSE_REPORT_SIZE: usize = 3;

/// Largest displacement a single report carries on one axis.
pub const MOUSE_MAX_STEP: i16 = 127;

/// Mouse buttons exposed by the report descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Bit in the button byte.
    pub const fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
        }
    }
}

/// HID mouse input report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement (signed).
    pub x: i8,
    /// Relative Y movement (signed).
    pub y: i8,
}

impl MouseReport {
    /// Create an idle (no movement, no buttons) report.
    pub const fn empty() -> Self {
        Self {
            buttons: 0,
            x: 0,
            y: 0,
        }
    }

    /// Relative motion with no buttons held.
    pub const fn motion(x: i8, y: i8) -> Self {
        Self { buttons: 0, x, y }
    }

    /// Button held, no motion.
    pub const fn button(button: MouseButton) -> Self {
        Self {
            buttons: button.mask(),
            x: 0,
            y: 0,
        }
    }

    /// Serialise into a byte slice for the HID input report.
    /// Returns the number of bytes written (always 3), or 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOUSE_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1] = self.x as u8;
        buf[2] = self.y as u8;
        MOUSE_REPORT_SIZE
    }

    pub fn to_bytes(&self) -> [u8; MOUSE_REPORT_SIZE] {
        [self.buttons, self.x as u8, self.y as u8]
    }

    /// Parse a report back from its wire bytes.
    #[cfg(test)]
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < MOUSE_REPORT_SIZE {
            return None;
        }
        Some(Self {
            buttons: data[0],
            x: data[1] as i8,
            y: data[2] as i8,
        })
    }
}

/// Split a relative move into per-report steps of at most
/// [`MOUSE_MAX_STEP`] per axis. A zero move still yields one report.
pub fn motion_steps(dx: i16, dy: i16) -> MotionSteps {
    MotionSteps {
        dx,
        dy,
        first: true,
    }
}

/// Iterator returned by [`motion_steps`].
#[derive(Clone, Debug)]
pub struct MotionSteps {
    dx: i16,
    dy: i16,
    first: bool,
}

impl Iterator for MotionSteps {
    type Item = MouseReport;

    fn next(&mut self) -> Option<MouseReport> {
        if self.dx == 0 && self.dy == 0 && !self.first {
            return None;
        }
        self.first = false;
        let sx = self.dx.clamp(-MOUSE_MAX_STEP, MOUSE_MAX_STEP);
        let sy = self.dy.clamp(-MOUSE_MAX_STEP, MOUSE_MAX_STEP);
        self.dx -= sx;
        self.dy -= sy;
        Some(MouseReport::motion(sx as i8, sy as i8))
    }
}
