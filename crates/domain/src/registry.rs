//! Registry — in-memory store of the rooms and devices seen this session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::RfAddress;
use crate::device::{Device, DeviceType, WindowState};
use crate::message::{DeviceConfig, DeviceStatus};
use crate::room::Room;

/// Result of inserting device metadata into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The address was new.
    Inserted,
    /// The address was known; descriptive fields were refreshed.
    Updated,
    /// The address was known under another type. The original type is kept.
    TypeMismatch {
        kept: DeviceType,
        announced: DeviceType,
    },
}

/// Rooms in discovery order plus devices keyed by radio address.
///
/// Status and configuration updates only touch devices that are already
/// present; records for unknown addresses are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    rooms: Vec<Room>,
    devices: HashMap<RfAddress, Device>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms in the order they were announced.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn room(&self, id: u8) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    #[must_use]
    pub fn device(&self, address: &RfAddress) -> Option<&Device> {
        self.devices.get(address)
    }

    #[must_use]
    pub fn device_type(&self, address: &RfAddress) -> Option<DeviceType> {
        self.devices.get(address).map(Device::device_type)
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.devices.is_empty()
    }

    /// Append a room. A room id announced again keeps its position and
    /// takes the new name and group address.
    pub fn add_room(&mut self, room: Room) {
        match self.rooms.iter_mut().find(|known| known.id == room.id) {
            Some(known) => *known = room,
            None => self.rooms.push(room),
        }
    }

    /// Insert a device, or refresh the descriptive fields of a known one.
    pub fn upsert_device(&mut self, device: Device) -> Upsert {
        let Some(known) = self.devices.get_mut(&device.address()) else {
            self.devices.insert(device.address(), device);
            return Upsert::Inserted;
        };

        let outcome = if known.device_type() == device.device_type() {
            Upsert::Updated
        } else {
            Upsert::TypeMismatch {
                kept: known.device_type(),
                announced: device.device_type(),
            }
        };
        known.merge_info(device);
        outcome
    }

    /// Devices whose `room_id` points at `room_id`.
    pub fn devices_in_room(&self, room_id: u8) -> impl Iterator<Item = &Device> {
        self.devices
            .values()
            .filter(move |device| device.room_id == room_id)
    }

    /// Whether any shutter contact in the room is not known to be closed.
    #[must_use]
    pub fn window_open_in_room(&self, room_id: u8) -> bool {
        self.devices_in_room(room_id).any(|device| {
            device.device_type() == DeviceType::ShutterContact
                && device.state != Some(WindowState::Closed)
        })
    }

    /// Store thermostat configuration. Returns `false` when the record was
    /// ignored (unknown address or not a radiator thermostat).
    pub fn apply_config(&mut self, config: &DeviceConfig) -> bool {
        let Some(thermostat) = config.thermostat else {
            return false;
        };
        match self.devices.get_mut(&config.address) {
            Some(device) if device.device_type().is_heating_thermostat() => {
                device.config = Some(thermostat);
                true
            }
            _ => false,
        }
    }

    /// Apply one status record. Returns `false` for unknown addresses.
    pub fn apply_status(&mut self, status: &DeviceStatus) -> bool {
        match self.devices.get_mut(&status.address) {
            Some(device) => {
                device.apply_status(&status.report);
                true
            }
            None => false,
        }
    }

    /// Forget everything, as when the connection is torn down.
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.devices.clear();
    }
}
