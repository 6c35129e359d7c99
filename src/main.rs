//! azmuth - BLE HID peripheral firmware for the nRF52840.
//!
//! Advertises as a composite keyboard / mouse / media-key device and
//! exposes a vendor command characteristic. Text written to that
//! characteristic is parsed and replayed as HID input reports.
//!
//! # Architecture
//!
//! ```text
//!   GATT write ──▶ on_write (parse) ──▶ Channel<Command> ──▶ command_task ─┐
//!                      │                                                  ├─▶ Mutex<HidLink> ──▶ notify
//!                      └── cancel ──▶ ABORT flag          heartbeat_task ─┘
//! ```
//!
//! Tasks:
//! - **softdevice_task** - runs the SoftDevice event loop.
//! - **command_task** - dispatches commands one at a time, paced.
//! - **heartbeat_task** - battery level every period (started on first connect).
//! - **main** - advertising / connection loop.

#![no_std]
#![no_main]

mod device;

use core::mem;
use core::sync::atomic::{AtomicBool, Ordering};

use azmuth::ble::adv;
use azmuth::ble::events::{on_event, DeviceAction, DeviceEvent};
use azmuth::command::Command;
use azmuth::config;
use azmuth::dispatch::Dispatcher;
use azmuth::heartbeat::{Heartbeat, StartGuard};
use azmuth::hid::report_map::{self, REPORT_MAP};
use azmuth::hid::ReportId;
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Timer};
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

use device::link::{HidLink, SharedLink};
use device::security::bonder;
use device::server::{Server, ServerEvent};

// ═══════════════════════════════════════════════════════════════════════════
// Inter-task communication
// ═══════════════════════════════════════════════════════════════════════════

/// Parsed commands from the GATT write path to the command task.
static COMMANDS: Channel<CriticalSectionRawMutex, Command, { config::COMMAND_QUEUE_DEPTH }> =
    Channel::new();

/// Raised by `cancel`, checked by the dispatcher between keystrokes.
static ABORT: AtomicBool = AtomicBool::new(false);

/// Heartbeat runs at most once per boot.
static HEARTBEAT: StartGuard = StartGuard::new();

static SERVER: StaticCell<Server> = StaticCell::new();
static LINK: StaticCell<SharedLink> = StaticCell::new();

// ═══════════════════════════════════════════════════════════════════════════
// Tasks
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn command_task(
    link: &'static SharedLink,
    commands: Receiver<'static, CriticalSectionRawMutex, Command, { config::COMMAND_QUEUE_DEPTH }>,
) -> ! {
    let mut dispatcher = Dispatcher::new(link, Delay).with_abort(&ABORT);
    loop {
        let command = commands.receive().await;
        let summary = dispatcher.dispatch(&command).await;
        info!("{} -> {}", command, summary);
    }
}

#[embassy_executor::task]
async fn heartbeat_task(link: &'static SharedLink) -> ! {
    Heartbeat::new(link, Delay)
        .with_battery_percent(config::BATTERY_LEVEL_PERCENT)
        .with_demo_input(config::DEMO_INPUT_ENABLED)
        .run()
        .await
}

// ═══════════════════════════════════════════════════════════════════════════
// Setup
// ═══════════════════════════════════════════════════════════════════════════

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no access", the name is read-only.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// A report map the host cannot parse makes it drop reports silently, so
/// refuse to boot with one.
fn check_report_map() {
    let layout = unwrap!(report_map::validate(REPORT_MAP));
    for id in ReportId::ALL {
        info!("Report {}: {} bytes", id, layout.input_bytes(id));
    }
}

fn connection_params() -> raw::ble_gap_conn_params_t {
    raw::ble_gap_conn_params_t {
        min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
        max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
        slave_latency: config::BLE_SLAVE_LATENCY,
        conn_sup_timeout: config::BLE_SUP_TIMEOUT,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("azmuth starting...");

    // Leave P0/P1 to the SoftDevice.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let _p = embassy_nrf::init(nrf_config);

    check_report_map();

    let sd = Softdevice::enable(&softdevice_config());
    let server: &'static Server = SERVER.init(unwrap!(Server::new(sd)));
    // SAFETY: plain SoftDevice call, valid after enable.
    let ret = unsafe { raw::sd_ble_gap_appearance_set(config::APPEARANCE_GENERIC_HID) };
    if ret != raw::NRF_SUCCESS {
        warn!("Could not set appearance: {}", ret);
    }
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    let link: &'static SharedLink = LINK.init(Mutex::new(HidLink::new(sd, server.report_handles())));
    unwrap!(spawner.spawn(command_task(link, COMMANDS.receiver())));

    let adv_data = adv::advertisement(config::DEVICE_NAME, config::APPEARANCE_GENERIC_HID);
    let scan_data = adv::scan_response(config::COMMAND_SERVICE_UUID);
    let adv_config = peripheral::Config::default();
    let bonder = bonder();

    let mut action = on_event(DeviceEvent::Start, &HEARTBEAT);
    loop {
        if action != DeviceAction::Advertise {
            warn!("Unexpected device action {}", action);
        }

        info!("Advertising as {}", config::DEVICE_NAME);
        let advertisement = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data,
            scan_data: &scan_data,
        };
        let conn = match peripheral::advertise_pairable(sd, advertisement, &adv_config, bonder).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {}", e);
                Timer::after_millis(500).await;
                continue;
            }
        };
        info!("Connected");

        if let Err(e) = conn.set_conn_params(connection_params()) {
            warn!("Connection parameter request failed: {}", e);
        }

        link.lock().await.attach(conn.clone());
        if on_event(DeviceEvent::Connect, &HEARTBEAT) == DeviceAction::StartHeartbeat {
            unwrap!(spawner.spawn(heartbeat_task(link)));
        }

        let reason = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Command(command) => {
                if COMMANDS.try_send(command).is_err() {
                    warn!("Command queue full, dropping write");
                }
            }
            ServerEvent::Cancel => {
                ABORT.store(true, Ordering::Relaxed);
                info!("Cancel requested");
            }
            ServerEvent::Rejected(e) => warn!("Write dropped: {}", e),
        })
        .await;
        info!("Disconnected: {}", reason);

        link.lock().await.detach();
        action = on_event(DeviceEvent::Disconnect, &HEARTBEAT);
    }
}
