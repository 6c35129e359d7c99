//! SoftDevice-side glue: GATT services, the HID link and bonding.
//!
//! Only built for the target (`embedded` feature). Everything here is
//! a thin adapter between nrf-softdevice and the host-testable library.

pub mod link;
pub mod security;
pub mod server;
