//! Just Works bonding with keys and CCCD state kept in RAM.
//!
//! Bonds are lost on reset; the host simply pairs again.

use core::cell::RefCell;

use azmuth::config::MAX_BONDED_PEERS;
use defmt::{info, warn};
use heapless::Vec;
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use static_cell::StaticCell;

/// Room for the system attributes (CCCD values) of one peer.
const SYS_ATTRS_LEN: usize = 64;

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
    sys_attrs: Vec<u8, SYS_ATTRS_LEN>,
}

pub struct Bonder {
    peers: RefCell<Vec<PeerBond, MAX_BONDED_PEERS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            peers: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("Bonded with new peer");
        let mut peers = self.peers.borrow_mut();
        if let Some(existing) = peers.iter_mut().find(|p| p.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        // Oldest bond goes first.
        if peers.is_full() {
            peers.remove(0);
        }

        let _ = peers.push(PeerBond {
            master_id,
            key,
            peer_id,
            sys_attrs: Vec::new(),
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .iter()
            .find_map(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }

    fn save_sys_attrs(&self, conn: &Connection) {
        let mut peers = self.peers.borrow_mut();
        let Some(peer) = peers
            .iter_mut()
            .find(|p| p.peer_id.is_match(conn.peer_address()))
        else {
            return;
        };

        let mut buf = [0u8; SYS_ATTRS_LEN];
        match gatt_server::get_sys_attrs(conn, &mut buf) {
            Ok(len) => {
                peer.sys_attrs.clear();
                let _ = peer.sys_attrs.extend_from_slice(&buf[..len.min(SYS_ATTRS_LEN)]);
            }
            Err(e) => warn!("Could not read sys attrs: {}", e),
        }
    }

    fn load_sys_attrs(&self, conn: &Connection) {
        let peers = self.peers.borrow();
        let attrs = peers
            .iter()
            .find(|p| p.peer_id.is_match(conn.peer_address()))
            .map(|p| p.sys_attrs.as_slice())
            .filter(|a| !a.is_empty());

        if let Err(e) = gatt_server::set_sys_attrs(conn, attrs) {
            warn!("Could not restore sys attrs: {}", e);
        }
    }
}

/// The process-wide bond store. Call once.
pub fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}
