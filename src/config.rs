//! Application-wide constants and compile-time configuration.
//!
//! Device identity, GATT UUIDs, timing parameters and protocol limits
//! live here so they can be tuned in one place.

// Identity

/// GAP device name (also the complete local name in the advertisement).
pub const DEVICE_NAME: &str = "Azmuth";

/// Device Information strings.
pub const MANUFACTURER_NAME: &str = "BitForge";
pub const SERIAL_NUMBER: &str = "123456";

/// PnP identity - the "pid.codes"-style V-USB shared VID/PID.
/// Replace with your own allocated VID/PID for production.
pub const VENDOR_ID: u16 = 0x16C0;
pub const PRODUCT_ID: u16 = 0x05DF;
pub const PRODUCT_VERSION: u16 = 0x0100;

/// GAP appearance: Generic HID.
pub const APPEARANCE_GENERIC_HID: u16 = 0x03C0;

// Command service

/// 128-bit UUID of the vendor command service.
pub const COMMAND_SERVICE_UUID: u128 = 0x0403_0201_fceb_dac9_b8a7_f6e5_d4c3_b2a0;

/// 128-bit UUID of the write-only command characteristic.
pub const COMMAND_CHAR_UUID: u128 = 0x0403_0201_fceb_dac9_b8a7_f6e5_d4c3_b2a1;

/// Longest command accepted in a single GATT write (bytes).
pub const MAX_COMMAND_LEN: usize = 64;

/// Parsed commands waiting for the command task.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

// Report timing

/// Consumer-control press-to-release hold (ms).
pub const CONSUMER_HOLD_MS: u32 = 30;

/// Keyboard press-to-release hold (ms).
pub const KEY_HOLD_MS: u32 = 20;

/// Pause between two typed characters (ms).
pub const CHAR_INTERVAL_MS: u32 = 100;

/// Mouse button hold for `click` / `rightclick` (ms).
pub const CLICK_HOLD_MS: u32 = 20;

/// Pause between the reports of a split mouse move (ms).
/// 8 ms is slightly above a 7.5 ms connection interval.
pub const MOUSE_STEP_INTERVAL_MS: u32 = 8;

// Heartbeat

/// Period of the background battery/demo loop (ms).
pub const HEARTBEAT_PERIOD_MS: u32 = 2000;

/// Battery level reported by the heartbeat (percent). No gauge is wired
/// up yet, so this is a fixed value.
pub const BATTERY_LEVEL_PERCENT: u8 = 10;

/// Demo input on every heartbeat: Volume Down after the battery update,
/// Volume Up once the period has elapsed.
pub const DEMO_INPUT_ENABLED: bool = false;

// BLE link

/// BLE connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms (lowest latency for HID).
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// ATT MTU requested from the SoftDevice.
pub const BLE_ATT_MTU: u16 = 128;

/// Number of bonds kept in RAM.
pub const MAX_BONDED_PEERS: usize = 4;
