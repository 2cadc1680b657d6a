// Pulsebeat - Console Transport
//
// Announces measurements on the log output.  Stands in for the radio link;
// the connection flag is shared so another context can simulate a peer
// coming and going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{DeviceInfo, ADVERTISING_INTERVAL_MS};
use crate::events::Bpm;
use crate::publisher::Transport;

pub struct LogTransport {
    info: DeviceInfo,
    connected: Arc<AtomicBool>,
    advertising: bool,
}

impl LogTransport {
    pub fn new(info: DeviceInfo) -> Self {
        log::info!(
            "{} ({} {} sn {}, hw {} fw {} sw {}), sensor location {:?}",
            info.name,
            info.manufacturer,
            info.model,
            info.serial,
            info.hardware_rev,
            info.firmware_rev,
            info.software_rev,
            info.location
        );
        let mut transport = Self {
            info,
            connected: Arc::new(AtomicBool::new(false)),
            advertising: false,
        };
        transport.start_advertising();
        transport
    }

    /// Handle for flipping the simulated peer connection.
    pub fn connection(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising
    }

    fn start_advertising(&mut self) {
        log::info!(
            "Advertising as \"{}\" every {} ms",
            self.info.name,
            ADVERTISING_INTERVAL_MS
        );
        self.advertising = true;
    }
}

impl Transport for LogTransport {
    fn update_measurement(&mut self, value: Bpm) -> anyhow::Result<()> {
        if !self.is_peer_connected() {
            anyhow::bail!("no peer connected");
        }
        self.advertising = false;
        log::info!("Heart rate: {} bpm", value);
        Ok(())
    }

    fn is_peer_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn resume_advertising(&mut self) -> anyhow::Result<()> {
        self.start_advertising();
        Ok(())
    }
}
