//! Per-session state of the hub connection.
//!
//! [`HubState`] owns the [`Registry`] and the radio budget. Decoded messages
//! are applied here; the resulting notifications go through an
//! [`EventPublisher`].

use std::sync::Arc;

use maxcube_domain::event::CubeEvent;
use maxcube_domain::message::{CubeStatus, Message, SendAck};
use maxcube_domain::registry::{Registry, Upsert};

use crate::ports::EventPublisher;

/// Registry plus the hub's last reported duty cycle and memory slots.
#[derive(Debug, Default)]
pub struct HubState {
    registry: Registry,
    status: CubeStatus,
}

impl HubState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn status(&self) -> CubeStatus {
        self.status
    }

    /// Cloned registry for an `update` notification.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Registry> {
        Arc::new(self.registry.clone())
    }

    /// Drop everything learned during the session.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.status = CubeStatus::default();
    }

    /// Apply a decoded message.
    ///
    /// Hello and ack messages publish a `status` event; acks also publish a
    /// `response` event and are returned so the caller can resolve a
    /// pending command.
    pub fn apply(&mut self, message: Message, events: &impl EventPublisher) -> Option<SendAck> {
        match message {
            Message::Hello(hello) => {
                tracing::info!(
                    serial = %hello.serial,
                    firmware = %hello.firmware,
                    duty_cycle = hello.duty_cycle,
                    memory_slots = hello.free_memory_slots,
                    "cube said hello"
                );
                self.update_status(hello.status(), events);
                None
            }
            Message::Metadata(metadata) => {
                let room_count = metadata.rooms.len();
                let device_count = metadata.devices.len();
                for room in metadata.rooms {
                    self.registry.add_room(room);
                }
                for device in metadata.devices {
                    let address = device.address();
                    if let Upsert::TypeMismatch { kept, announced } =
                        self.registry.upsert_device(device)
                    {
                        tracing::warn!(
                            %address,
                            %kept,
                            %announced,
                            "device announced with another type, keeping the first one"
                        );
                    }
                }
                tracing::debug!(rooms = room_count, devices = device_count, "metadata applied");
                None
            }
            Message::DeviceConfig(config) => {
                if !self.registry.apply_config(&config) {
                    tracing::trace!(address = %config.address, "configuration ignored");
                }
                None
            }
            Message::DeviceList(records) => {
                let applied = records
                    .iter()
                    .filter(|status| self.registry.apply_status(status))
                    .count();
                tracing::debug!(records = records.len(), applied, "device list applied");
                None
            }
            Message::SendAck(ack) => {
                self.update_status(ack.status(), events);
                events.publish(CubeEvent::Response(ack));
                Some(ack)
            }
        }
    }

    fn update_status(&mut self, status: CubeStatus, events: &impl EventPublisher) {
        self.status = status;
        events.publish(CubeEvent::Status(status));
    }
}
