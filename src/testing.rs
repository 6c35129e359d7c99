//! Host-side doubles for the report sink and the delay provider.

use std::cell::RefCell;
use std::rc::Rc;

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::yield_now;
use embedded_hal_async::delay::DelayNs;

use crate::dispatch::ReportSink;
use crate::error::SinkError;
use crate::hid::ReportId;

/// Sink that keeps every report it is handed.
#[derive(Default)]
pub struct RecordingSink {
    pub reports: Vec<(ReportId, Vec<u8>)>,
    pub battery: Vec<u8>,
    /// Refuse everything with this error.
    pub fail_with: Option<SinkError>,
}

impl RecordingSink {
    pub fn failing(err: SinkError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn payloads(&self, id: ReportId) -> Vec<Vec<u8>> {
        self.reports
            .iter()
            .filter(|(rid, _)| *rid == id)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn input_report(&mut self, id: ReportId, payload: &[u8]) -> Result<(), SinkError> {
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        self.reports.push((id, payload.to_vec()));
        Ok(())
    }

    fn battery_level(&mut self, percent: u8) -> Result<(), SinkError> {
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        self.battery.push(percent);
        Ok(())
    }
}

/// Delay that returns at once and logs the requested milliseconds.
///
/// Optionally raises an abort flag once a given number of delays ran, or
/// yields to the executor once per delay so joined tasks really interleave.
#[derive(Clone, Default)]
pub struct RecordingDelay<'a> {
    pub log: Rc<RefCell<Vec<u32>>>,
    trip: Option<(usize, &'a AtomicBool)>,
    yielding: bool,
}

impl<'a> RecordingDelay<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tripping(after: usize, flag: &'a AtomicBool) -> Self {
        Self {
            log: Rc::default(),
            trip: Some((after, flag)),
            yielding: false,
        }
    }

    /// Every delay returns `Pending` once before completing.
    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Self::default()
        }
    }

    pub fn delays(&self) -> Vec<u32> {
        self.log.borrow().clone()
    }

    fn record(&mut self, ms: u32) {
        let mut log = self.log.borrow_mut();
        log.push(ms);
        if let Some((after, flag)) = self.trip {
            if log.len() == after {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }
}

impl RecordingDelay<'_> {
    async fn wait(&mut self, ms: u32) {
        self.record(ms);
        if self.yielding {
            yield_now().await;
        }
    }
}

impl DelayNs for RecordingDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.wait(ns / 1_000_000).await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.wait(us / 1_000).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.wait(ms).await;
    }
}
