//! HID device lifecycle: what to do on Start / Connect / Disconnect.

use crate::heartbeat::StartGuard;

/// Events reported by the BLE HID device layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// Stack is up.
    Start,
    /// A central connected.
    Connect,
    /// The central went away.
    Disconnect,
}

/// Follow-up the runtime performs for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceAction {
    /// (Re)start advertising.
    Advertise,
    /// Spawn the heartbeat task. Returned once per boot.
    StartHeartbeat,
    /// Nothing to do.
    None,
}

pub fn on_event(event: DeviceEvent, heartbeat: &StartGuard) -> DeviceAction {
    match event {
        DeviceEvent::Start | DeviceEvent::Disconnect => DeviceAction::Advertise,
        DeviceEvent::Connect => {
            if heartbeat.try_start() {
                DeviceAction::StartHeartbeat
            } else {
                DeviceAction::None
            }
        }
    }
}
