// Pulsebeat - Publisher
//
// Forwards closed-window BPM values to the connected peer.  When nothing new
// is pending the configured idle value goes out instead, so a peer that
// expects periodic notifications keeps receiving them.

use crate::config::PublisherConfig;
use crate::events::{Bpm, PublishEvent};
use crate::handoff::MeasurementSlot;

/// Connection to the peer that receives measurements.
pub trait Transport {
    /// Announce a heart-rate value to the connected peer.
    fn update_measurement(&mut self, value: Bpm) -> anyhow::Result<()>;

    fn is_peer_connected(&self) -> bool;

    /// Called after the peer goes away; must make the device discoverable
    /// again.
    fn resume_advertising(&mut self) -> anyhow::Result<()>;
}

pub struct Publisher<T: Transport> {
    transport: T,
    config: PublisherConfig,
    was_connected: bool,
}

impl<T: Transport> Publisher<T> {
    pub fn new(transport: T, config: PublisherConfig) -> Self {
        Self {
            transport,
            config,
            was_connected: false,
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// One publish attempt. Without a peer the slot is left untouched so the
    /// pending value goes out on a later poll.
    pub fn poll(&mut self, slot: &MeasurementSlot) -> PublishEvent {
        let connected = self.transport.is_peer_connected();
        self.track_connection(connected);
        if !connected {
            return PublishEvent::PeerAbsent;
        }

        let event = match slot.take() {
            Some(bpm) => PublishEvent::Measurement(bpm),
            None => PublishEvent::Idle(self.config.idle_value),
        };
        if let Some(value) = event.sent_value() {
            if let Err(e) = self.transport.update_measurement(value) {
                log::warn!("Measurement update failed ({:?}): {}", event, e);
            }
        }
        event
    }

    fn track_connection(&mut self, connected: bool) {
        if connected == self.was_connected {
            return;
        }
        self.was_connected = connected;
        if connected {
            log::info!("Peer connected");
            return;
        }
        log::info!("Peer disconnected, resuming advertising");
        if let Err(e) = self.transport.resume_advertising() {
            log::warn!("Could not resume advertising: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeTransport {
        connected: bool,
        fail_updates: bool,
        sent: Vec<Bpm>,
        advertising_restarts: usize,
    }

    impl Transport for FakeTransport {
        fn update_measurement(&mut self, value: Bpm) -> anyhow::Result<()> {
            if self.fail_updates {
                anyhow::bail!("link dropped");
            }
            self.sent.push(value);
            Ok(())
        }

        fn is_peer_connected(&self) -> bool {
            self.connected
        }

        fn resume_advertising(&mut self) -> anyhow::Result<()> {
            self.advertising_restarts += 1;
            Ok(())
        }
    }

    fn connected_publisher() -> Publisher<FakeTransport> {
        let transport = FakeTransport {
            connected: true,
            ..Default::default()
        };
        Publisher::new(transport, PublisherConfig::default())
    }

    #[test]
    fn forwards_pending_measurement_once() {
        let slot = MeasurementSlot::new();
        let mut publisher = connected_publisher();
        slot.publish(68);

        assert_eq!(publisher.poll(&slot), PublishEvent::Measurement(68));
        assert_eq!(publisher.poll(&slot), PublishEvent::Idle(7));
        assert_eq!(publisher.transport().sent, vec![68, 7]);
    }

    #[test]
    fn idle_value_is_configurable() {
        let slot = MeasurementSlot::new();
        let config = PublisherConfig {
            idle_value: 0,
            ..Default::default()
        };
        let transport = FakeTransport {
            connected: true,
            ..Default::default()
        };
        let mut publisher = Publisher::new(transport, config);
        assert_eq!(publisher.poll(&slot), PublishEvent::Idle(0));
    }

    #[test]
    fn holds_measurement_while_peer_absent() {
        let slot = MeasurementSlot::new();
        let mut publisher = Publisher::new(FakeTransport::default(), PublisherConfig::default());
        slot.publish(92);

        assert_eq!(publisher.poll(&slot), PublishEvent::PeerAbsent);
        assert_eq!(slot.peek(), Some(92));
        assert!(publisher.transport().sent.is_empty());

        publisher.transport_mut().connected = true;
        assert_eq!(publisher.poll(&slot), PublishEvent::Measurement(92));
    }

    #[test]
    fn failed_update_is_not_retried() {
        let slot = MeasurementSlot::new();
        let mut publisher = connected_publisher();
        publisher.transport_mut().fail_updates = true;
        slot.publish(80);

        assert_eq!(publisher.poll(&slot), PublishEvent::Measurement(80));
        publisher.transport_mut().fail_updates = false;
        assert_eq!(publisher.poll(&slot), PublishEvent::Idle(7));
    }

    #[test]
    fn restarts_advertising_on_each_disconnect() {
        let slot = MeasurementSlot::new();
        let mut publisher = connected_publisher();
        publisher.poll(&slot);
        assert_eq!(publisher.transport().advertising_restarts, 0);

        publisher.transport_mut().connected = false;
        publisher.poll(&slot);
        publisher.poll(&slot);
        assert_eq!(publisher.transport().advertising_restarts, 1);

        publisher.transport_mut().connected = true;
        publisher.poll(&slot);
        publisher.transport_mut().connected = false;
        publisher.poll(&slot);
        assert_eq!(publisher.transport().advertising_restarts, 2);
    }
}
