//! GATT services: Device Information, Battery, HID and the command service.
//!
//! Built with the nrf-softdevice builder API so the report map and the
//! Report Reference descriptors can come from the library constants.

use azmuth::command::Command;
use azmuth::config;
use azmuth::error::Error;
use azmuth::hid::report_map::{declared_len, REPORT_MAP};
use azmuth::hid::ReportId;
use defmt::{debug, info};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{self, RegisterError, WriteOp};
use nrf_softdevice::ble::{Connection, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;

const DEVICE_INFORMATION: Uuid = Uuid::new_16(0x180a);
const BATTERY_SERVICE: Uuid = Uuid::new_16(0x180f);
const HID_SERVICE: Uuid = Uuid::new_16(0x1812);

const MANUFACTURER_NAME: Uuid = Uuid::new_16(0x2a29);
const SERIAL_NUMBER: Uuid = Uuid::new_16(0x2a25);
const PNP_ID: Uuid = Uuid::new_16(0x2a50);
const BATTERY_LEVEL: Uuid = Uuid::new_16(0x2a19);
const HID_INFO: Uuid = Uuid::new_16(0x2a4a);
const REPORT_MAP_CHAR: Uuid = Uuid::new_16(0x2a4b);
const HID_CONTROL_POINT: Uuid = Uuid::new_16(0x2a4c);
const HID_REPORT: Uuid = Uuid::new_16(0x2a4d);
const PROTOCOL_MODE: Uuid = Uuid::new_16(0x2a4e);
const REPORT_REFERENCE: Uuid = Uuid::new_16(0x2908);

/// Report Reference type: Input.
const REPORT_TYPE_INPUT: u8 = 0x01;

/// HID Information: bcdHID 1.11, country 0, flags RemoteWake | NormallyConnectable.
const HID_INFO_VALUE: [u8; 4] = [0x11, 0x01, 0x00, 0x03];

/// Report Protocol mode.
const PROTOCOL_MODE_REPORT: u8 = 0x01;

/// Value handles the link needs to notify on.
#[derive(Clone, Copy)]
pub struct ReportHandles {
    pub consumer: u16,
    pub mouse: u16,
    pub keyboard: u16,
    pub battery: u16,
}

impl ReportHandles {
    pub fn input(&self, id: ReportId) -> u16 {
        match id {
            ReportId::ConsumerControl => self.consumer,
            ReportId::Mouse => self.mouse,
            ReportId::Keyboard => self.keyboard,
        }
    }
}

/// What a GATT write turned into.
pub enum ServerEvent {
    /// Queue for the command task.
    Command(Command),
    /// Stop the command in progress.
    Cancel,
    /// The write was dropped.
    Rejected(Error),
}

struct HidService {
    consumer: u16,
    mouse: u16,
    keyboard: u16,
    control_point: u16,
    protocol_mode: u16,
    cccds: [u16; 3],
}

pub struct Server {
    battery: u16,
    battery_cccd: u16,
    hid: HidService,
    command: u16,
}

impl Server {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        register_device_information(sd)?;
        let (battery, battery_cccd) = register_battery(sd)?;
        let hid = register_hid(sd)?;
        let command = register_command(sd)?;
        Ok(Self {
            battery,
            battery_cccd,
            hid,
            command,
        })
    }

    pub fn report_handles(&self) -> ReportHandles {
        ReportHandles {
            consumer: self.hid.consumer,
            mouse: self.hid.mouse,
            keyboard: self.hid.keyboard,
            battery: self.battery,
        }
    }
}

fn register_device_information(sd: &mut Softdevice) -> Result<(), RegisterError> {
    let mut sb = ServiceBuilder::new(sd, DEVICE_INFORMATION)?;

    let read_only = || Metadata::new(Properties::new().read());
    sb.add_characteristic(
        MANUFACTURER_NAME,
        Attribute::new(config::MANUFACTURER_NAME.as_bytes()),
        read_only(),
    )?
    .build();
    sb.add_characteristic(
        SERIAL_NUMBER,
        Attribute::new(config::SERIAL_NUMBER.as_bytes()),
        read_only(),
    )?
    .build();

    // Vendor ID source 0x02 = USB Implementer's Forum.
    let vid = config::VENDOR_ID.to_le_bytes();
    let pid = config::PRODUCT_ID.to_le_bytes();
    let ver = config::PRODUCT_VERSION.to_le_bytes();
    let pnp = [0x02, vid[0], vid[1], pid[0], pid[1], ver[0], ver[1]];
    sb.add_characteristic(PNP_ID, Attribute::new(pnp), read_only())?
        .build();

    sb.build();
    Ok(())
}

fn register_battery(sd: &mut Softdevice) -> Result<(u16, u16), RegisterError> {
    let mut sb = ServiceBuilder::new(sd, BATTERY_SERVICE)?;
    let handles = sb
        .add_characteristic(
            BATTERY_LEVEL,
            Attribute::new([config::BATTERY_LEVEL_PERCENT]),
            Metadata::new(Properties::new().read().notify()),
        )?
        .build();
    sb.build();
    Ok((handles.value_handle, handles.cccd_handle))
}

fn register_hid(sd: &mut Softdevice) -> Result<HidService, RegisterError> {
    let mut sb = ServiceBuilder::new(sd, HID_SERVICE)?;

    sb.add_characteristic(
        HID_INFO,
        Attribute::new(HID_INFO_VALUE).security(SecurityMode::JustWorks),
        Metadata::new(Properties::new().read()),
    )?
    .build();

    sb.add_characteristic(
        REPORT_MAP_CHAR,
        Attribute::new(REPORT_MAP).security(SecurityMode::JustWorks),
        Metadata::new(Properties::new().read()),
    )?
    .build();

    let control_point = sb
        .add_characteristic(
            HID_CONTROL_POINT,
            Attribute::new([0u8]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().write_without_response()),
        )?
        .build();

    let protocol_mode = sb
        .add_characteristic(
            PROTOCOL_MODE,
            Attribute::new([PROTOCOL_MODE_REPORT]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().write_without_response()),
        )?
        .build();

    let mut input = |id: ReportId| -> Result<(u16, u16), RegisterError> {
        let zeros = [0u8; azmuth::hid::MAX_REPORT_SIZE];
        let mut cb = sb.add_characteristic(
            HID_REPORT,
            Attribute::new(&zeros[..declared_len(id)]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        cb.add_descriptor(
            REPORT_REFERENCE,
            Attribute::new([id as u8, REPORT_TYPE_INPUT]).security(SecurityMode::JustWorks),
        )?;
        let handles = cb.build();
        Ok((handles.value_handle, handles.cccd_handle))
    };

    let (consumer, consumer_cccd) = input(ReportId::ConsumerControl)?;
    let (mouse, mouse_cccd) = input(ReportId::Mouse)?;
    let (keyboard, keyboard_cccd) = input(ReportId::Keyboard)?;

    sb.build();

    Ok(HidService {
        consumer,
        mouse,
        keyboard,
        control_point: control_point.value_handle,
        protocol_mode: protocol_mode.value_handle,
        cccds: [consumer_cccd, mouse_cccd, keyboard_cccd],
    })
}

fn register_command(sd: &mut Softdevice) -> Result<u16, RegisterError> {
    let mut sb = ServiceBuilder::new(sd, Uuid::new_128(&config::COMMAND_SERVICE_UUID.to_le_bytes()))?;
    let handles = sb
        .add_characteristic(
            Uuid::new_128(&config::COMMAND_CHAR_UUID.to_le_bytes()),
            Attribute::new([0u8; config::MAX_COMMAND_LEN])
                .variable_len(config::MAX_COMMAND_LEN as u16),
            Metadata::new(Properties::new().write().write_without_response()),
        )?
        .build();
    sb.build();
    Ok(handles.value_handle)
}

impl gatt_server::Server for Server {
    type Event = ServerEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if handle == self.command {
            return Some(match Command::from_write(offset, data) {
                Ok(Command::Cancel) => ServerEvent::Cancel,
                Ok(cmd) => ServerEvent::Command(cmd),
                Err(e) => ServerEvent::Rejected(e),
            });
        }

        let enabled = data.first().is_some_and(|b| b & 0x01 != 0);
        if handle == self.battery_cccd {
            debug!("Battery notifications: {}", enabled);
        } else if let Some(i) = self.hid.cccds.iter().position(|&h| h == handle) {
            info!("Input report {} notifications: {}", ReportId::ALL[i], enabled);
        } else if handle == self.hid.control_point {
            // 0 = Suspend, 1 = Exit Suspend
            debug!("HID control point: {=[u8]}", data);
        } else if handle == self.hid.protocol_mode {
            debug!("Protocol mode write: {=[u8]}", data);
        }
        None
    }
}
