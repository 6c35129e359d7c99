//! Unified error type for azmuth.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for on-target logging.

/// Top-level error type used across the command pipeline.
///
/// None of these are fatal: the GATT write that caused them is acknowledged
/// anyway and the error only ends up in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The write was empty, too long, or not valid UTF-8.
    MalformedInput,

    /// A keyword command carried missing or unparsable arguments.
    InvalidArguments,

    /// A character has no keystroke on the US layout. Skipped, not fatal.
    UnsupportedCharacter(char),
}

/// Why a report did not reach the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// No central is connected.
    NotConnected,
    /// The stack refused the notification (CCCD off, queue full, ...).
    Rejected,
}
