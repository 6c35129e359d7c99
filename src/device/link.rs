//! The one handle that can put HID reports on the air.

use azmuth::dispatch::ReportSink;
use azmuth::error::SinkError;
use azmuth::hid::ReportId;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use nrf_softdevice::ble::{gatt_server, Connection};
use nrf_softdevice::Softdevice;

use super::server::ReportHandles;

/// Shared between the command task and the heartbeat.
pub type SharedLink = Mutex<CriticalSectionRawMutex, HidLink>;

pub struct HidLink {
    sd: &'static Softdevice,
    handles: ReportHandles,
    conn: Option<Connection>,
}

impl HidLink {
    pub fn new(sd: &'static Softdevice, handles: ReportHandles) -> Self {
        Self {
            sd,
            handles,
            conn: None,
        }
    }

    pub fn attach(&mut self, conn: Connection) {
        self.conn = Some(conn);
    }

    pub fn detach(&mut self) {
        self.conn = None;
    }

    fn notify(&self, handle: u16, payload: &[u8]) -> Result<(), SinkError> {
        let conn = self.conn.as_ref().ok_or(SinkError::NotConnected)?;
        gatt_server::notify_value(conn, handle, payload).map_err(|e| match e {
            gatt_server::NotifyValueError::Disconnected => SinkError::NotConnected,
            _ => SinkError::Rejected,
        })
    }
}

impl ReportSink for HidLink {
    fn input_report(&mut self, id: ReportId, payload: &[u8]) -> Result<(), SinkError> {
        self.notify(self.handles.input(id), payload)
    }

    fn battery_level(&mut self, percent: u8) -> Result<(), SinkError> {
        // Keep the readable value current even while nobody listens.
        gatt_server::set_value(self.sd, self.handles.battery, &[percent])
            .map_err(|_| SinkError::Rejected)?;
        self.notify(self.handles.battery, &[percent])
    }
}
