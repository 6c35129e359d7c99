//! Background heartbeat: battery level every period, optional demo input.
//!
//! Runs beside command dispatch and shares the same locked sink. It is
//! started at most once per boot, on the first connection, through
//! [`StartGuard`].

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use crate::command::Command;
use crate::config;
use crate::dispatch::{DispatchSummary, Dispatcher, ReportSink};
use crate::error::SinkError;
use crate::hid::ConsumerAction;

/// One-shot start flag: `NotStarted -> Running`, never back.
pub struct StartGuard {
    started: AtomicBool,
}

impl StartGuard {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
        }
    }

    /// `true` for exactly one caller.
    pub fn try_start(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl Default for StartGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one heartbeat period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Beat {
    pub battery: Result<(), SinkError>,
    /// Both demo taps, when enabled.
    pub demo: Option<DispatchSummary>,
}

pub struct Heartbeat<'a, M: RawMutex, S: ReportSink, D: DelayNs> {
    dispatcher: Dispatcher<'a, M, S, D>,
    sink: &'a Mutex<M, S>,
    battery_percent: u8,
    demo: bool,
}

impl<'a, M: RawMutex, S: ReportSink, D: DelayNs> Heartbeat<'a, M, S, D> {
    /// Full battery, no demo input.
    pub fn new(sink: &'a Mutex<M, S>, delay: D) -> Self {
        Self {
            dispatcher: Dispatcher::new(sink, delay),
            sink,
            battery_percent: 100,
            demo: false,
        }
    }

    pub fn with_battery_percent(mut self, percent: u8) -> Self {
        self.battery_percent = percent.min(100);
        self
    }

    /// Volume Down right after the battery update, Volume Up at the end of
    /// the period.
    pub fn with_demo_input(mut self, enabled: bool) -> Self {
        self.demo = enabled;
        self
    }

    /// One period: battery level, then the wait (bracketed by the demo taps).
    pub async fn beat(&mut self) -> Beat {
        let battery = {
            let mut sink = self.sink.lock().await;
            sink.battery_level(self.battery_percent)
        };

        let mut demo = None;
        if self.demo {
            demo = Some(self.tap(ConsumerAction::VolumeDown).await);
        }
        self.dispatcher.pause(config::HEARTBEAT_PERIOD_MS).await;
        if let Some(summary) = demo.as_mut() {
            *summary += self.tap(ConsumerAction::VolumeUp).await;
        }

        Beat { battery, demo }
    }

    async fn tap(&mut self, action: ConsumerAction) -> DispatchSummary {
        self.dispatcher.dispatch(&Command::Consumer(action)).await
    }

    pub async fn run(mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!("Heartbeat started (battery {}%)", self.battery_percent);
        loop {
            let _beat = self.beat().await;
            #[cfg(feature = "defmt")]
            if let Err(e) = _beat.battery {
                defmt::debug!("Battery level not delivered: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::ReportId;
    use crate::testing::{RecordingDelay, RecordingSink};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn start_guard_is_one_shot() {
        let guard = StartGuard::new();
        assert!(!guard.is_running());
        assert!(guard.try_start());
        assert!(!guard.try_start());
        assert!(guard.is_running());
    }

    #[test]
    fn beat_reports_battery_then_waits() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        let delay = RecordingDelay::new();
        let beat = {
            let mut hb = Heartbeat::new(&sink, delay.clone());
            block_on(hb.beat())
        };
        assert_eq!(beat, Beat { battery: Ok(()), demo: None });
        assert_eq!(delay.delays(), vec![config::HEARTBEAT_PERIOD_MS]);
        let sink = sink.into_inner();
        assert_eq!(sink.battery, vec![100]);
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn battery_percent_is_clamped() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        {
            let mut hb = Heartbeat::new(&sink, RecordingDelay::new()).with_battery_percent(250);
            block_on(hb.beat());
        }
        assert_eq!(sink.into_inner().battery, vec![100]);
    }

    #[test]
    fn configured_battery_level_is_reported() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        {
            let mut hb = Heartbeat::new(&sink, RecordingDelay::new())
                .with_battery_percent(config::BATTERY_LEVEL_PERCENT);
            block_on(hb.beat());
        }
        assert_eq!(sink.into_inner().battery, vec![config::BATTERY_LEVEL_PERCENT]);
    }

    #[test]
    fn demo_brackets_the_period_with_volume_down_and_up() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        let delay = RecordingDelay::new();
        {
            let mut hb = Heartbeat::new(&sink, delay.clone()).with_demo_input(true);
            let first = block_on(hb.beat());
            assert_eq!(first.demo.map(|d| d.sent), Some(4));
            block_on(hb.beat());
        }
        assert_eq!(delay.delays(), vec![30, 2000, 30, 30, 2000, 30]);
        let sink = sink.into_inner();
        assert_eq!(sink.battery, vec![100, 100]);
        assert_eq!(
            sink.payloads(ReportId::ConsumerControl),
            vec![
                vec![0xEA, 0x00],
                vec![0x00, 0x00],
                vec![0xE9, 0x00],
                vec![0x00, 0x00],
                vec![0xEA, 0x00],
                vec![0x00, 0x00],
                vec![0xE9, 0x00],
                vec![0x00, 0x00],
            ]
        );
    }

    #[test]
    fn disconnected_sink_is_reported() {
        let sink: Mutex<NoopRawMutex, _> =
            Mutex::new(RecordingSink::failing(SinkError::NotConnected));
        let mut hb = Heartbeat::new(&sink, RecordingDelay::new());
        let beat = block_on(hb.beat());
        assert_eq!(beat.battery, Err(SinkError::NotConnected));
    }
}
