//! HID Report Descriptor parser.
//!
//! Walks a Report Descriptor item by item and recovers the layout a host
//! would build from it: one entry per top-level Application Collection,
//! with its usage, Report ID and the number of input bits it declares.
//! The firmware runs it over its own report map at boot; a map that does
//! not parse would make hosts silently drop reports.
//!
//! ## HID Report Descriptor Structure
//!
//! A Report Descriptor is a sequence of short items `[prefix, data...]`:
//! - prefix bits 0-1: data size (0, 1, 2 or 4 bytes)
//! - prefix bits 2-3: item type (Main, Global, Local)
//! - prefix bits 4-7: tag
//!
//! ## Limitations
//!
//! - Push/Pop state is not supported
//! - Delimiter tags are ignored
//! - One Report ID per Application Collection (the first one seen)

use heapless::Vec;

use super::ReportId;

/// Most top-level collections we track.
pub const MAX_COLLECTIONS: usize = 8;

/// Usage page codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsagePage {
    /// Generic Desktop (mouse, keyboard, joystick).
    GenericDesktop,
    /// Keyboard/Keypad.
    Keyboard,
    /// LEDs.
    Led,
    /// Button.
    Button,
    /// Consumer Control.
    Consumer,
    /// Unknown/unsupported.
    Unknown(u16),
}

impl From<u16> for UsagePage {
    fn from(code: u16) -> Self {
        match code {
            0x01 => UsagePage::GenericDesktop,
            0x07 => UsagePage::Keyboard,
            0x08 => UsagePage::Led,
            0x09 => UsagePage::Button,
            0x0C => UsagePage::Consumer,
            other => UsagePage::Unknown(other),
        }
    }
}

/// Why a descriptor was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescriptorError {
    /// An item's data runs past the end of the buffer.
    Truncated,
    /// Long items (prefix 0xFE) are not used by any HID device class we serve.
    LongItem,
    /// End Collection without a matching Collection, or a Collection left open.
    UnbalancedCollection,
    /// More than [`MAX_COLLECTIONS`] top-level collections.
    TooManyCollections,
    /// Several collections are present but one of them has no Report ID.
    MissingReportId,
    /// A report is missing, or declares a size its encoder does not write.
    LengthMismatch(ReportId),
}

/// One top-level Application Collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApplicationCollection {
    pub usage_page: UsagePage,
    pub usage: u16,
    /// 0 when the descriptor does not use Report IDs.
    pub report_id: u8,
    /// Sum of `Report Size * Report Count` over every Input item inside.
    pub input_bits: u16,
}

impl ApplicationCollection {
    /// Input payload size in whole bytes (Report ID prefix excluded).
    pub fn input_bytes(&self) -> usize {
        (self.input_bits as usize).div_ceil(8)
    }
}

/// Parsed descriptor layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportMapLayout {
    pub collections: Vec<ApplicationCollection, MAX_COLLECTIONS>,
}

impl ReportMapLayout {
    /// Parse a HID Report Descriptor.
    pub fn parse(data: &[u8]) -> Result<Self, DescriptorError> {
        let mut layout = ReportMapLayout {
            collections: Vec::new(),
        };

        // Parser state.
        let mut usage_page: u16 = 0;
        let mut usage: Option<u16> = None;
        let mut report_size: u16 = 0;
        let mut report_count: u16 = 0;
        let mut depth: usize = 0;

        let mut i = 0;
        while i < data.len() {
            let prefix = data[i];
            if prefix == 0xFE {
                return Err(DescriptorError::LongItem);
            }

            let tag = (prefix >> 4) & 0x0F;
            let item_type = (prefix >> 2) & 0x03;
            let size = match prefix & 0x03 {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 4,
            };

            if i + 1 + size > data.len() {
                return Err(DescriptorError::Truncated);
            }

            let value: u32 = match size {
                0 => 0,
                1 => data[i + 1] as u32,
                2 => u16::from_le_bytes([data[i + 1], data[i + 2]]) as u32,
                _ => u32::from_le_bytes([data[i + 1], data[i + 2], data[i + 3], data[i + 4]]),
            };

            match item_type {
                // Main items
                0 => {
                    match tag {
                        // Input
                        0x08 => {
                            if depth > 0 {
                                if let Some(current) = layout.collections.last_mut() {
                                    current.input_bits = current
                                        .input_bits
                                        .saturating_add(report_size.saturating_mul(report_count));
                                }
                            }
                        }
                        // Collection
                        0x0A => {
                            // Only top-level Application collections open a new entry.
                            if depth == 0 && value == 0x01 {
                                layout
                                    .collections
                                    .push(ApplicationCollection {
                                        usage_page: UsagePage::from(usage_page),
                                        usage: usage.unwrap_or(0),
                                        report_id: 0,
                                        input_bits: 0,
                                    })
                                    .map_err(|_| DescriptorError::TooManyCollections)?;
                            }
                            depth += 1;
                        }
                        // End Collection
                        0x0C => {
                            depth = depth
                                .checked_sub(1)
                                .ok_or(DescriptorError::UnbalancedCollection)?;
                        }
                        _ => {}
                    }
                    // Local state does not survive a main item.
                    usage = None;
                }
                // Global items
                1 => match tag {
                    // Usage Page
                    0x00 => usage_page = value as u16,
                    // Report Size
                    0x07 => report_size = value as u16,
                    // Report ID
                    0x08 => {
                        if depth > 0 {
                            if let Some(current) = layout.collections.last_mut() {
                                if current.report_id == 0 {
                                    current.report_id = value as u8;
                                }
                            }
                        }
                    }
                    // Report Count
                    0x09 => report_count = value as u16,
                    _ => {}
                },
                // Local items
                2 => {
                    if tag == 0x00 && usage.is_none() {
                        usage = Some(value as u16);
                    }
                }
                _ => {}
            }

            i += 1 + size;
        }

        if depth != 0 {
            return Err(DescriptorError::UnbalancedCollection);
        }

        if layout.collections.len() > 1 && layout.collections.iter().any(|c| c.report_id == 0) {
            return Err(DescriptorError::MissingReportId);
        }

        Ok(layout)
    }

    /// Collection that carries `report_id`.
    pub fn collection(&self, report_id: u8) -> Option<&ApplicationCollection> {
        self.collections.iter().find(|c| c.report_id == report_id)
    }

    /// Input payload size declared for one of our report IDs.
    pub fn input_bytes(&self, id: ReportId) -> Option<usize> {
        self.collection(id as u8).map(ApplicationCollection::input_bytes)
    }
}
