//! Decoded cube messages.
//!
//! These records are what the wire codec produces; applying them to the
//! session state is the job of the application layer.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::address::RfAddress;
use crate::device::{Battery, Device, DeviceType, Mode, StatusFlags, ThermostatConfig, WindowState};
use crate::room::Room;

/// Radio budget reported by the hub after a hello or a command ack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeStatus {
    /// Radio duty cycle in percent.
    pub duty_cycle: u8,
    /// Free command memory slots.
    pub memory_slots: u8,
}

/// Handshake (`H:`) sent by the hub right after a connection is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub serial: String,
    pub address: String,
    pub firmware: String,
    pub connection_id: String,
    pub duty_cycle: u8,
    pub free_memory_slots: u8,
    /// Hub clock date; absent when the hub clock was never set.
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub state_time: Option<String>,
    pub ntp_counter: Option<String>,
}

impl Hello {
    #[must_use]
    pub const fn status(&self) -> CubeStatus {
        CubeStatus {
            duty_cycle: self.duty_cycle,
            memory_slots: self.free_memory_slots,
        }
    }
}

/// Topology (`M:`): every room followed by every paired device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub rooms: Vec<Room>,
    pub devices: Vec<Device>,
}

/// Configuration (`C:`) of a single device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub address: RfAddress,
    pub device_type: DeviceType,
    /// Present for radiator thermostats only.
    pub thermostat: Option<ThermostatConfig>,
}

/// Runtime readings of one device, shaped by its type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusReport {
    HeatingThermostat {
        valve: u8,
        setpoint: f64,
        actual_temperature: Option<f64>,
        mode: Mode,
        battery: Battery,
        flags: StatusFlags,
    },
    WallThermostat {
        actual_temperature: f64,
        battery: Battery,
    },
    ShutterContact {
        state: WindowState,
        battery: Battery,
    },
}

/// One record of a device list (`L:`) message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStatus {
    pub address: RfAddress,
    pub report: StatusReport,
}

/// Acknowledgment (`S:`) of an outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAck {
    pub accepted: bool,
    pub duty_cycle: u8,
    pub free_memory_slots: u8,
}

impl SendAck {
    #[must_use]
    pub const fn status(&self) -> CubeStatus {
        CubeStatus {
            duty_cycle: self.duty_cycle,
            memory_slots: self.free_memory_slots,
        }
    }
}

/// A single decoded protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello(Hello),
    Metadata(Metadata),
    DeviceConfig(DeviceConfig),
    DeviceList(Vec<DeviceStatus>),
    SendAck(SendAck),
}
