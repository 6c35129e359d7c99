//! Host-testable core of the azmuth BLE HID peripheral.
//!
//! Everything between "a GATT write arrived" and "these HID reports go to
//! the host" lives here and builds for both the target and the host:
//! the report encoders and report map, the command interpreter, the
//! character table, the paced dispatcher and the heartbeat.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary (main.rs, feature `embedded`) owns the
//! SoftDevice, the GATT server and the tasks, and drives this library
//! through the [`dispatch::ReportSink`] seam.

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod heartbeat;
pub mod hid;
pub mod keymap;

pub mod ble {
    pub mod adv;
    pub mod events;
}

#[cfg(test)]
mod testing;

pub use command::Command;
pub use dispatch::{DispatchSummary, Dispatcher, ReportSink};
pub use error::{Error, SinkError};

// ═══════════════════════════════════════════════════════════════════════════
// End-to-end Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicBool;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::mutex::Mutex;

    use crate::ble::events::{on_event, DeviceAction, DeviceEvent};
    use crate::heartbeat::{Heartbeat, StartGuard};
    use crate::hid::ReportId;
    use crate::testing::{RecordingDelay, RecordingSink};
    use crate::{Command, Dispatcher, Error};

    // ═══════════════════════════════════════════════════════════════════════
    // Write → Reports
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn rejected_write_sends_nothing() {
        let payloads: [&[u8]; 5] = [b"", b"move abc", b"move 1", b"key nope+x", &[0xFF, 0xFE]];
        for payload in payloads {
            match Command::from_payload(payload) {
                Ok(cmd) => panic!("{:?} parsed as {:?}", payload, cmd),
                Err(e) => assert!(matches!(e, Error::MalformedInput | Error::InvalidArguments)),
            }
        }
    }

    #[test]
    fn commands_share_one_sink_in_order() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        {
            let mut dispatcher = Dispatcher::new(&sink, RecordingDelay::new());
            for line in ["volup", "click", "a"] {
                let cmd = Command::from_payload(line.as_bytes()).unwrap();
                block_on(dispatcher.dispatch(&cmd));
            }
        }
        let ids: Vec<ReportId> = sink.into_inner().reports.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                ReportId::ConsumerControl,
                ReportId::ConsumerControl,
                ReportId::Mouse,
                ReportId::Mouse,
                ReportId::Keyboard,
                ReportId::Keyboard,
            ]
        );
    }

    #[test]
    fn heartbeat_and_commands_interleave_on_report_boundaries() {
        let sink: Mutex<NoopRawMutex, _> = Mutex::new(RecordingSink::default());
        let flag = AtomicBool::new(false);
        {
            // Yielding delays hand control to the other task on every hold.
            let mut dispatcher =
                Dispatcher::new(&sink, RecordingDelay::yielding()).with_abort(&flag);
            let mut heartbeat = Heartbeat::new(&sink, RecordingDelay::yielding())
                .with_battery_percent(10)
                .with_demo_input(true);
            let cmd = Command::from_payload(b"next").unwrap();
            block_on(async {
                embassy_futures::join::join(dispatcher.dispatch(&cmd), heartbeat.beat()).await
            });
        }
        let sink = sink.into_inner();
        assert_eq!(sink.battery, vec![10]);
        // Each press is directly followed by its own release.
        for pair in sink.reports.chunks(2) {
            assert_eq!(pair[0].0, pair[1].0);
            assert_ne!(pair[0].1, vec![0, 0]);
            assert_eq!(pair[1].1, vec![0, 0]);
        }
        let presses: Vec<Vec<u8>> = sink.reports.iter().step_by(2).map(|(_, p)| p.clone()).collect();
        assert_eq!(presses, vec![vec![0xB5, 0x00], vec![0xEA, 0x00], vec![0xE9, 0x00]]);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Device Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn reconnect_does_not_restart_heartbeat() {
        let guard = StartGuard::new();
        let actions: Vec<DeviceAction> = [
            DeviceEvent::Start,
            DeviceEvent::Connect,
            DeviceEvent::Disconnect,
            DeviceEvent::Connect,
        ]
        .into_iter()
        .map(|e| on_event(e, &guard))
        .collect();
        assert_eq!(
            actions,
            vec![
                DeviceAction::Advertise,
                DeviceAction::StartHeartbeat,
                DeviceAction::Advertise,
                DeviceAction::None,
            ]
        );
    }
}
