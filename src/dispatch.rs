//! Timed dispatcher - turns a [`Command`] into paced HID reports.
//!
//! Every report goes through one [`ReportSink`] owned by a mutex. A
//! press/release pair is sent under a single lock so the heartbeat can
//! never slip a report between them. Hosts coalesce reports that arrive
//! faster than their own polling, so every press is held before release
//! and typed characters are spaced out:
//!
//! ```text
//! consumer  press ─30ms─ release
//! key       press ─20ms─ release ─100ms─ next character
//! click     down  ─20ms─ up
//! ```

use core::ops::AddAssign;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use crate::command::Command;
use crate::config;
use crate::error::SinkError;
use crate::hid::{
    mouse, ConsumerReport, HidReport, KeyPress, KeyboardReport, MouseButton, MouseReport,
    ReportId, MAX_REPORT_SIZE,
};

/// The HID transport: the only way reports leave the device.
pub trait ReportSink {
    /// Send one input report. Best-effort: failures are not retried.
    fn input_report(&mut self, id: ReportId, payload: &[u8]) -> Result<(), SinkError>;

    /// Publish the battery level (percent).
    fn battery_level(&mut self, percent: u8) -> Result<(), SinkError>;
}

/// What happened while dispatching one command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchSummary {
    /// Reports accepted by the sink.
    pub sent: usize,
    /// Reports the sink refused.
    pub dropped: usize,
    /// The command was cut short by a cancel.
    pub aborted: bool,
}

impl DispatchSummary {
    fn record(&mut self, result: Result<(), SinkError>) {
        match result {
            Ok(()) => self.sent += 1,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HID report dropped: {}", _e);
                self.dropped += 1;
            }
        }
    }
}

impl AddAssign for DispatchSummary {
    fn add_assign(&mut self, other: Self) {
        self.sent += other.sent;
        self.dropped += other.dropped;
        self.aborted |= other.aborted;
    }
}

/// Serialise `report` and hand it to the sink.
pub fn send_report<S: ReportSink>(sink: &mut S, report: &HidReport) -> Result<(), SinkError> {
    let mut buf = [0u8; MAX_REPORT_SIZE];
    let n = report.serialize(&mut buf);
    sink.input_report(report.report_id(), &buf[..n])
}

pub struct Dispatcher<'a, M: RawMutex, S: ReportSink, D: DelayNs> {
    sink: &'a Mutex<M, S>,
    delay: D,
    abort: Option<&'a AtomicBool>,
}

impl<'a, M: RawMutex, S: ReportSink, D: DelayNs> Dispatcher<'a, M, S, D> {
    pub fn new(sink: &'a Mutex<M, S>, delay: D) -> Self {
        Self {
            sink,
            delay,
            abort: None,
        }
    }

    /// Check `flag` between characters and mouse steps; a raised flag
    /// stops the running command.
    pub fn with_abort(mut self, flag: &'a AtomicBool) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Run one command to completion (or until aborted).
    pub async fn dispatch(&mut self, command: &Command) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        // A cancel raised while idle must not eat the next command.
        if let Some(flag) = self.abort {
            flag.store(false, Ordering::Relaxed);
        }

        match command {
            // Raised from the write path while a command runs; nothing is
            // in flight by the time it would get here.
            Command::Cancel => {}
            Command::Consumer(action) => {
                let press = HidReport::Consumer(ConsumerReport::new(*action));
                self.tap(press, config::CONSUMER_HOLD_MS, &mut summary).await;
            }
            Command::KeyPress(key) => {
                self.tap_key(*key, &mut summary).await;
            }
            Command::MouseMove { dx, dy } => {
                self.move_pointer(*dx, *dy, &mut summary).await;
            }
            Command::MouseClick(button) => {
                self.click(*button, &mut summary).await;
            }
            Command::TypeText(text) => {
                self.type_keys(&text.keys, &mut summary).await;
            }
        }

        summary
    }

    /// Wait without holding the sink.
    pub async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    fn aborted(&self) -> bool {
        self.abort.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Press, hold, release - all under one lock.
    async fn tap(&mut self, press: HidReport, hold_ms: u32, summary: &mut DispatchSummary) {
        let sink = self.sink;
        let mut sink = sink.lock().await;
        summary.record(send_report(&mut *sink, &press));
        self.delay.delay_ms(hold_ms).await;
        summary.record(send_report(&mut *sink, &press.released()));
    }

    async fn tap_key(&mut self, key: KeyPress, summary: &mut DispatchSummary) {
        let press = HidReport::Keyboard(KeyboardReport::press(key));
        self.tap(press, config::KEY_HOLD_MS, summary).await;
    }

    async fn type_keys(&mut self, keys: &[KeyPress], summary: &mut DispatchSummary) {
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                self.delay.delay_ms(config::CHAR_INTERVAL_MS).await;
            }
            if self.aborted() {
                #[cfg(feature = "defmt")]
                defmt::info!("Typing cancelled after {} of {} keys", i, keys.len());
                summary.aborted = true;
                return;
            }
            self.tap_key(*key, summary).await;
        }
    }

    async fn move_pointer(&mut self, dx: i16, dy: i16, summary: &mut DispatchSummary) {
        for (i, step) in mouse::motion_steps(dx, dy).enumerate() {
            if i > 0 {
                self.delay.delay_ms(config::MOUSE_STEP_INTERVAL_MS).await;
                if self.aborted() {
                    summary.aborted = true;
                    return;
                }
            }
            let mut sink = self.sink.lock().await;
            summary.record(send_report(&mut *sink, &HidReport::Mouse(step)));
        }
    }

    async fn click(&mut self, button: MouseButton, summary: &mut DispatchSummary) {
        let press = HidReport::Mouse(MouseReport::button(button));
        self.tap(press, config::CLICK_HOLD_MS, summary).await;
    }
}
