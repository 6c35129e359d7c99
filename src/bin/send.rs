//! `azmuth-send` - type commands on this machine, replay them over BLE.
//!
//! Commands come from the argument list, or one per line from stdin when
//! no arguments are given (`exit` / `quit` leave).
//!
//! ```text
//! azmuth-send volup "Hello, World!" "move 40 -10"
//! echo "key ctrl+alt+t" | azmuth-send
//! ```

use std::time::Duration;

use anyhow::{anyhow, Result};
use azmuth::config;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

const SCAN_TIME: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    let adapter = match adapters.first() {
        Some(ad) => ad.to_owned(),
        None => {
            eprintln!("No Bluetooth adapter found");
            return Ok(());
        }
    };

    let peripheral = find_device(&adapter).await?;
    if !peripheral.is_connected().await? {
        peripheral.connect().await?;
    }
    peripheral.discover_services().await?;

    let Some(command_char) = find_command_characteristic(&peripheral) else {
        peripheral.disconnect().await?;
        return Err(anyhow!("{} has no command characteristic", config::DEVICE_NAME));
    };
    println!("Connected to {}", config::DEVICE_NAME);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = if args.is_empty() {
        send_stdin(&peripheral, &command_char).await
    } else {
        send_all(&peripheral, &command_char, &args).await
    };

    peripheral.disconnect().await?;
    result
}

async fn find_device(adapter: &Adapter) -> Result<Peripheral> {
    println!("Scanning for {}...", config::DEVICE_NAME);
    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;

    let found = tokio::time::timeout(SCAN_TIME, async {
        while let Some(event) = events.next().await {
            let (CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id)) = event else {
                continue;
            };
            let peripheral = adapter.peripheral(&id).await?;
            if let Some(props) = peripheral.properties().await? {
                if props.local_name.as_deref() == Some(config::DEVICE_NAME) {
                    println!("Found {} ({})", config::DEVICE_NAME, props.address);
                    return Ok(Some(peripheral));
                }
            }
        }
        Ok::<_, anyhow::Error>(None)
    })
    .await;
    adapter.stop_scan().await?;

    match found {
        Ok(Ok(Some(peripheral))) => Ok(peripheral),
        Ok(Err(e)) => Err(e),
        Ok(Ok(None)) | Err(_) => Err(anyhow!("No device named {} found", config::DEVICE_NAME)),
    }
}

fn find_command_characteristic(peripheral: &Peripheral) -> Option<Characteristic> {
    let uuid = Uuid::from_u128(config::COMMAND_CHAR_UUID);
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
}

async fn send(peripheral: &Peripheral, command_char: &Characteristic, line: &str) -> Result<()> {
    if line.len() > config::MAX_COMMAND_LEN {
        eprintln!(
            "Skipping command longer than {} bytes: {}",
            config::MAX_COMMAND_LEN,
            line
        );
        return Ok(());
    }
    peripheral
        .write(command_char, line.as_bytes(), WriteType::WithoutResponse)
        .await?;
    Ok(())
}

async fn send_all(peripheral: &Peripheral, command_char: &Characteristic, lines: &[String]) -> Result<()> {
    for line in lines {
        send(peripheral, command_char, line).await?;
    }
    Ok(())
}

async fn send_stdin(peripheral: &Peripheral, command_char: &Characteristic) -> Result<()> {
    println!("Enter commands (exit or quit to leave):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        send(peripheral, command_char, line).await?;
    }
    Ok(())
}
