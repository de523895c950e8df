//! Device — a physical unit paired with the cube.
//!
//! Identity (`address`) and kind (`device_type`) are fixed when the device
//! is built; everything else is refreshed by status and configuration
//! messages while the session runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::RfAddress;
use crate::error::{MaxCubeError, ValidationError};
use crate::message::StatusReport;

/// Kind of device, as reported by the hub's one-byte type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Cube,
    HeatingThermostat,
    HeatingThermostatPlus,
    WallThermostat,
    ShutterContact,
    PushButton,
    Unknown,
}

impl DeviceType {
    /// Map the wire type code to a device type. Unassigned codes map to
    /// [`DeviceType::Unknown`].
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Cube,
            1 => Self::HeatingThermostat,
            2 => Self::HeatingThermostatPlus,
            3 => Self::WallThermostat,
            4 => Self::ShutterContact,
            5 => Self::PushButton,
            _ => Self::Unknown,
        }
    }

    /// Radiator thermostats (plain or plus) carry valve and configuration data.
    #[must_use]
    pub const fn is_heating_thermostat(self) -> bool {
        matches!(self, Self::HeatingThermostat | Self::HeatingThermostatPlus)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cube => "Cube",
            Self::HeatingThermostat => "Heating Thermostat",
            Self::HeatingThermostatPlus => "Heating Thermostat Plus",
            Self::WallThermostat => "Wall mounted Thermostat",
            Self::ShutterContact => "Shutter Contact",
            Self::PushButton => "Push Button",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Operating mode of a thermostat, stored in two bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Auto,
    Manual,
    Vacation,
    Boost,
}

impl Mode {
    /// Decode the two low bits of a status byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Auto,
            0b01 => Self::Manual,
            0b10 => Self::Vacation,
            _ => Self::Boost,
        }
    }

    /// Two-bit wire code of the mode.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Auto => 0b00,
            Self::Manual => 0b01,
            Self::Vacation => 0b10,
            Self::Boost => 0b11,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Vacation => "vacation",
            Self::Boost => "boost",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            // "manu" is the spelling used by older hub tooling.
            "manual" | "manu" => Ok(Self::Manual),
            "vacation" => Ok(Self::Vacation),
            "boost" => Ok(Self::Boost),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Battery condition reported in the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Battery {
    Ok,
    Low,
}

impl Battery {
    #[must_use]
    pub const fn from_low_flag(low: bool) -> Self {
        if low { Self::Low } else { Self::Ok }
    }
}

/// Window state as seen by a shutter contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Open,
    Closed,
}

/// Status bits carried by radiator thermostat records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub initialized: bool,
    pub from_command: bool,
    pub error: bool,
    pub valid: bool,
    pub dst_active: bool,
    pub gateway_known: bool,
    pub panel_locked: bool,
    pub link_error: bool,
}

/// Temperature configuration of a radiator thermostat, all in °C.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermostatConfig {
    pub comfort_temperature: f64,
    pub eco_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub temperature_offset: f64,
    pub window_open_temperature: f64,
}

/// A device paired with the cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    address: RfAddress,
    device_type: DeviceType,
    pub serial: String,
    pub name: String,
    pub room_id: u8,
    /// Valve opening in percent (radiator thermostats).
    pub valve: Option<u8>,
    /// Target temperature in °C.
    pub setpoint: Option<f64>,
    /// Measured temperature in °C, absent when the hub has no reading.
    pub actual_temperature: Option<f64>,
    pub mode: Option<Mode>,
    pub battery: Option<Battery>,
    /// Shutter contacts only.
    pub state: Option<WindowState>,
    pub flags: StatusFlags,
    /// Radiator thermostats only, once a configuration message was seen.
    pub config: Option<ThermostatConfig>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    #[must_use]
    pub const fn address(&self) -> RfAddress {
        self.address
    }

    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Copy the descriptive fields of `other` (serial, name, room) while
    /// keeping identity, type and runtime state.
    pub fn merge_info(&mut self, other: Device) {
        self.serial = other.serial;
        self.name = other.name;
        self.room_id = other.room_id;
    }

    /// Update runtime fields from a decoded status record.
    pub fn apply_status(&mut self, report: &StatusReport) {
        match *report {
            StatusReport::HeatingThermostat {
                valve,
                setpoint,
                actual_temperature,
                mode,
                battery,
                flags,
            } => {
                self.valve = Some(valve);
                self.setpoint = Some(setpoint);
                self.actual_temperature = actual_temperature;
                self.mode = Some(mode);
                self.battery = Some(battery);
                self.flags = flags;
            }
            StatusReport::WallThermostat {
                actual_temperature,
                battery,
            } => {
                self.actual_temperature = Some(actual_temperature);
                self.battery = Some(battery);
            }
            StatusReport::ShutterContact { state, battery } => {
                self.state = Some(state);
                self.battery = Some(battery);
            }
        }
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    address: Option<RfAddress>,
    device_type: Option<DeviceType>,
    serial: Option<String>,
    name: Option<String>,
    room_id: u8,
}

impl DeviceBuilder {
    #[must_use]
    pub fn address(mut self, address: RfAddress) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = Some(device_type);
        self
    }

    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: u8) -> Self {
        self.room_id = room_id;
        self
    }

    /// Consume the builder and return a [`Device`] with empty runtime state.
    ///
    /// # Errors
    ///
    /// Returns [`MaxCubeError::Validation`] if no address was given.
    pub fn build(self) -> Result<Device, MaxCubeError> {
        let address = self.address.ok_or(ValidationError::MissingAddress)?;
        Ok(Device {
            address,
            device_type: self.device_type.unwrap_or(DeviceType::Unknown),
            serial: self.serial.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            room_id: self.room_id,
            valve: None,
            setpoint: None,
            actual_temperature: None,
            mode: None,
            battery: None,
            state: None,
            flags: StatusFlags::default(),
            config: None,
        })
    }
}
