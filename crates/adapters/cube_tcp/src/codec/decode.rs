//! Decoders for the cube's inbound message payloads.
//!
//! Pure functions from the text after `<tag>:` to domain records. Binary
//! payloads are base64 blobs read at fixed offsets.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveTime};

use maxcube_domain::address::RfAddress;
use maxcube_domain::device::{
    Battery, Device, DeviceType, Mode, StatusFlags, ThermostatConfig, WindowState,
};
use maxcube_domain::message::{
    DeviceConfig, DeviceStatus, Hello, Metadata, SendAck, StatusReport,
};
use maxcube_domain::room::Room;

use crate::error::DecodeError;

/// Battery-low bit of the second status byte.
const BATTERY_LOW: u8 = 0x80;
/// Window-open bit of a shutter contact's second status byte.
const WINDOW_OPEN: u8 = 0x02;

fn field<'a>(
    fields: &[&'a str],
    index: usize,
    name: &'static str,
) -> Result<&'a str, DecodeError> {
    fields
        .get(index)
        .map(|value| value.trim())
        .ok_or(DecodeError::MissingField { index, name })
}

fn hex_field(fields: &[&str], index: usize, name: &'static str) -> Result<u8, DecodeError> {
    let value = field(fields, index, name)?;
    u8::from_str_radix(value, 16).map_err(|_| DecodeError::InvalidHex {
        name,
        value: value.to_string(),
    })
}

fn base64_field(
    fields: &[&str],
    index: usize,
    name: &'static str,
) -> Result<Vec<u8>, DecodeError> {
    let value = field(fields, index, name)?;
    Ok(STANDARD.decode(value)?)
}

fn byte(blob: &[u8], index: usize) -> Result<u8, DecodeError> {
    blob.get(index).copied().ok_or(DecodeError::Truncated {
        needed: index + 1,
        actual: blob.len(),
    })
}

fn bytes(blob: &[u8], start: usize, len: usize) -> Result<&[u8], DecodeError> {
    blob.get(start..start + len).ok_or(DecodeError::Truncated {
        needed: start + len,
        actual: blob.len(),
    })
}

fn address(blob: &[u8], start: usize) -> Result<RfAddress, DecodeError> {
    let raw = bytes(blob, start, 3)?;
    Ok(RfAddress::new([raw[0], raw[1], raw[2]]))
}

fn half_degrees(raw: u8) -> f64 {
    f64::from(raw) / 2.0
}

fn hex_pairs<const N: usize>(text: Option<&&str>) -> Option<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(text?.trim(), &mut out).ok()?;
    Some(out)
}

/// Decode a hello (`H:`) payload.
///
/// Comma-separated text: serial, address, firmware, _, connection id,
/// duty cycle (hex), free memory slots (hex), date (`YYMMDD` hex),
/// time (`HHMM` hex), state time, NTP counter.
///
/// # Errors
///
/// Returns [`DecodeError`] when one of the first seven fields is missing or
/// the duty cycle / memory slots are not hex.
pub fn parse_hello(payload: &str) -> Result<Hello, DecodeError> {
    let fields: Vec<&str> = payload.split(',').collect();

    let date = hex_pairs::<3>(fields.get(7)).and_then(|[year, month, day]| {
        NaiveDate::from_ymd_opt(2000 + i32::from(year), u32::from(month), u32::from(day))
    });
    let time = hex_pairs::<2>(fields.get(8))
        .and_then(|[hour, minute]| NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0));

    Ok(Hello {
        serial: field(&fields, 0, "serial")?.to_string(),
        address: field(&fields, 1, "address")?.to_string(),
        firmware: field(&fields, 2, "firmware")?.to_string(),
        connection_id: field(&fields, 4, "connection id")?.to_string(),
        duty_cycle: hex_field(&fields, 5, "duty cycle")?,
        free_memory_slots: hex_field(&fields, 6, "free memory slots")?,
        date,
        time,
        state_time: fields.get(9).map(|value| value.trim().to_string()),
        ntp_counter: fields.get(10).map(|value| value.trim().to_string()),
    })
}

/// Decode a metadata (`M:`) payload: rooms then devices.
///
/// Blob layout (field 2):
///
/// | Offset | Field |
/// |--------|-------|
/// | 2 | Room count |
/// | 3… | Rooms: id, name length, name, 3-byte group address |
/// | next | Device count |
/// | next… | Devices: type, address, serial, 2 reserved, name length, name, room id |
///
/// # Errors
///
/// Returns [`DecodeError`] when field 2 is missing, not base64, or shorter
/// than the records it announces.
pub fn parse_metadata(payload: &str) -> Result<Metadata, DecodeError> {
    let fields: Vec<&str> = payload.split(',').collect();
    let blob = base64_field(&fields, 2, "metadata")?;

    let (metadata, consumed) = metadata_records(&blob)?;
    if consumed < blob.len() {
        tracing::debug!(
            consumed,
            residual = blob.len() - consumed,
            "metadata blob has trailing bytes"
        );
    }
    Ok(metadata)
}

/// Rooms and devices of a metadata blob, with the number of bytes they took.
fn metadata_records(blob: &[u8]) -> Result<(Metadata, usize), DecodeError> {
    let room_count = byte(blob, 2)?;
    let mut cursor = 3;
    let mut rooms = Vec::with_capacity(usize::from(room_count));
    for _ in 0..room_count {
        let id = byte(blob, cursor)?;
        let name_len = usize::from(byte(blob, cursor + 1)?);
        let name = String::from_utf8_lossy(bytes(blob, cursor + 2, name_len)?).into_owned();
        let group_address = address(blob, cursor + 2 + name_len)?;
        rooms.push(Room::new(id, name, group_address));
        cursor += name_len + 5;
    }

    let mut devices = Vec::new();
    if cursor < blob.len() {
        let device_count = byte(blob, cursor)?;
        devices.reserve(usize::from(device_count));
        for _ in 0..device_count {
            let device_type = DeviceType::from_code(byte(blob, cursor + 1)?);
            let device_address = address(blob, cursor + 2)?;
            let serial = String::from_utf8_lossy(bytes(blob, cursor + 5, 8)?).into_owned();
            let name_len = usize::from(byte(blob, cursor + 15)?);
            let name = String::from_utf8_lossy(bytes(blob, cursor + 16, name_len)?).into_owned();
            let room_id = byte(blob, cursor + 16 + name_len)?;

            let device = Device::builder()
                .address(device_address)
                .device_type(device_type)
                .serial(serial)
                .name(name)
                .room_id(room_id)
                .build()
                .map_err(DecodeError::Domain)?;
            devices.push(device);
            cursor += 16 + name_len;
        }
        // past the device count, or the last device's room id
        cursor += 1;
    }

    Ok((Metadata { rooms, devices }, cursor))
}

/// Decode a device configuration (`C:`) payload.
///
/// Temperatures are only read for radiator thermostats; other device types
/// decode with `thermostat: None`.
///
/// # Errors
///
/// Returns [`DecodeError`] when field 1 is missing, not base64, or too short.
pub fn parse_device_config(payload: &str) -> Result<DeviceConfig, DecodeError> {
    let fields: Vec<&str> = payload.split(',').collect();
    let blob = base64_field(&fields, 1, "configuration")?;

    let device_address = address(&blob, 1)?;
    let device_type = DeviceType::from_code(byte(&blob, 4)?);

    let thermostat = if device_type.is_heating_thermostat() {
        let raw = bytes(&blob, 18, 6)?;
        Some(ThermostatConfig {
            comfort_temperature: half_degrees(raw[0]),
            eco_temperature: half_degrees(raw[1]),
            max_temperature: half_degrees(raw[2]),
            min_temperature: half_degrees(raw[3]),
            temperature_offset: half_degrees(raw[4]),
            window_open_temperature: half_degrees(raw[5]),
        })
    } else {
        None
    };

    Ok(DeviceConfig {
        address: device_address,
        device_type,
        thermostat,
    })
}

/// Decode a device list (`L:`) payload.
///
/// Each record is prefixed by its length byte. How a record is read depends
/// on the type the registry already knows for its address, supplied by
/// `known_type`; records for unknown addresses or types without runtime
/// data are skipped. A record too short for its type is logged and skipped
/// without losing the records around it. The walk stops once fewer than
/// three address bytes remain.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload is not base64.
pub fn parse_device_list<F>(
    payload: &str,
    known_type: F,
) -> Result<Vec<DeviceStatus>, DecodeError>
where
    F: Fn(&RfAddress) -> Option<DeviceType>,
{
    let blob = STANDARD.decode(payload.trim())?;

    let mut records = Vec::new();
    let mut cursor = 1;
    while cursor < blob.len() {
        let len = usize::from(blob[cursor - 1]);
        let Ok(device_address) = address(&blob, cursor) else {
            tracing::debug!(offset = cursor, "device list ends with a partial record");
            break;
        };
        let record = &blob[cursor..(cursor + len).min(blob.len())];

        let report = match known_type(&device_address) {
            Some(DeviceType::HeatingThermostat | DeviceType::HeatingThermostatPlus) => {
                Some(heating_thermostat_report(record))
            }
            Some(DeviceType::WallThermostat) => Some(wall_thermostat_report(record)),
            Some(DeviceType::ShutterContact) => Some(shutter_contact_report(record)),
            _ => None,
        };
        match report {
            Some(Ok(report)) => records.push(DeviceStatus {
                address: device_address,
                report,
            }),
            Some(Err(err)) => {
                tracing::warn!(
                    address = %device_address,
                    error = %err,
                    "skipping malformed device record"
                );
            }
            None => {}
        }

        cursor += len + 1;
    }

    Ok(records)
}

fn heating_thermostat_report(record: &[u8]) -> Result<StatusReport, DecodeError> {
    let raw = bytes(record, 4, 6)?;
    let (first, second) = (raw[0], raw[1]);

    let flags = StatusFlags {
        initialized: first & 0x02 != 0,
        from_command: first & 0x04 != 0,
        error: first & 0x08 != 0,
        valid: first & 0x10 != 0,
        dst_active: second & 0x08 != 0,
        gateway_known: second & 0x10 != 0,
        panel_locked: second & 0x20 != 0,
        link_error: second & 0x40 != 0,
    };
    let actual_temperature = match (raw[4], raw[5]) {
        (0, 0) => None,
        (high, low) => Some(f64::from(u16::from_be_bytes([high, low])) / 10.0),
    };

    Ok(StatusReport::HeatingThermostat {
        valve: raw[2],
        setpoint: half_degrees(raw[3]),
        actual_temperature,
        mode: Mode::from_bits(second),
        battery: Battery::from_low_flag(second & BATTERY_LOW != 0),
        flags,
    })
}

fn wall_thermostat_report(record: &[u8]) -> Result<StatusReport, DecodeError> {
    let raw = bytes(record, 5, 7)?;
    // Bit 7 of the setpoint byte is the ninth bit of the temperature.
    let tenths = u16::from(raw[6]) + u16::from(raw[2] & 0x80) * 2;

    Ok(StatusReport::WallThermostat {
        actual_temperature: f64::from(tenths) / 10.0,
        battery: Battery::from_low_flag(raw[0] & BATTERY_LOW != 0),
    })
}

fn shutter_contact_report(record: &[u8]) -> Result<StatusReport, DecodeError> {
    let status = byte(record, 5)?;
    let state = if status & WINDOW_OPEN == 0 {
        WindowState::Closed
    } else {
        WindowState::Open
    };

    Ok(StatusReport::ShutterContact {
        state,
        battery: Battery::from_low_flag(status & BATTERY_LOW != 0),
    })
}

/// Decode a command acknowledgment (`S:`) payload: duty cycle (hex),
/// accepted flag (`0` means accepted), free memory slots (hex).
///
/// # Errors
///
/// Returns [`DecodeError`] when a field is missing or not hex.
pub fn parse_send_ack(payload: &str) -> Result<SendAck, DecodeError> {
    let fields: Vec<&str> = payload.split(',').collect();
    Ok(SendAck {
        duty_cycle: hex_field(&fields, 0, "duty cycle")?,
        accepted: field(&fields, 1, "accepted")? == "0",
        free_memory_slots: hex_field(&fields, 2, "free memory slots")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn metadata_blob() -> Vec<u8> {
        let mut blob = vec![0x56, 0x02, 2];
        // room 1 "Bad", room 2 "Küche"
        blob.extend([1, 3]);
        blob.extend(b"Bad");
        blob.extend([0x0a, 0x0b, 0x0c]);
        let kitchen = "Küche".as_bytes();
        blob.extend([2, u8::try_from(kitchen.len()).unwrap()]);
        blob.extend(kitchen);
        blob.extend([0x0d, 0x0e, 0x0f]);
        // two devices
        blob.push(2);
        blob.push(1);
        blob.extend([0x01, 0x02, 0x03]);
        blob.extend(b"KEQ01234");
        blob.extend([0x00, 0x00]);
        blob.push(4);
        blob.extend(b"Heiz");
        blob.push(1);
        blob.push(4);
        blob.extend([0x04, 0x05, 0x06]);
        blob.extend(b"LEQ98765");
        blob.extend([0x00, 0x00]);
        blob.push(7);
        blob.extend(b"Fenster");
        blob.push(2);
        blob
    }

    fn heating(_: &RfAddress) -> Option<DeviceType> {
        Some(DeviceType::HeatingThermostat)
    }

    fn thermostat_record(
        addr: [u8; 3],
        first: u8,
        second: u8,
        valve: u8,
        setpoint: u8,
        temp: [u8; 2],
    ) -> Vec<u8> {
        let mut record = vec![11];
        record.extend(addr);
        record.push(0x00);
        record.extend([first, second, valve, setpoint, temp[0], temp[1]]);
        record.push(0x00);
        record
    }

    // ── Hello ───────────────────────────────────────────────────────────

    #[test]
    fn should_parse_hello_fields() {
        let payload = "KEQ0523864,097f2c,0113,00000000,477719c0,32,3c,100a0d,0b2a,03,0000";
        let hello = parse_hello(payload).unwrap();
        assert_eq!(hello.serial, "KEQ0523864");
        assert_eq!(hello.address, "097f2c");
        assert_eq!(hello.firmware, "0113");
        assert_eq!(hello.connection_id, "477719c0");
        assert_eq!(hello.duty_cycle, 0x32);
        assert_eq!(hello.free_memory_slots, 0x3c);
        assert_eq!(hello.date, NaiveDate::from_ymd_opt(2016, 10, 13));
        assert_eq!(hello.time, NaiveTime::from_hms_opt(11, 42, 0));
        assert_eq!(hello.state_time.as_deref(), Some("03"));
        assert_eq!(hello.ntp_counter.as_deref(), Some("0000"));
    }

    #[test]
    fn should_leave_unset_clock_absent() {
        let hello = parse_hello("S,A,F,X,C,00,10,000000,0000").unwrap();
        assert!(hello.date.is_none());
        assert_eq!(hello.time, NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(hello.free_memory_slots, 0x10);
    }

    #[test]
    fn should_reject_hello_with_non_hex_duty_cycle() {
        let err = parse_hello("S,A,F,X,C,zz,10").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex { name: "duty cycle", .. }));
    }

    #[test]
    fn should_reject_short_hello() {
        let err = parse_hello("S,A,F").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { index: 4, .. }));
    }

    // ── Metadata ────────────────────────────────────────────────────────

    #[test]
    fn should_parse_rooms_and_devices() {
        let payload = format!("00,01,{}", b64(&metadata_blob()));
        let metadata = parse_metadata(&payload).unwrap();

        assert_eq!(metadata.rooms.len(), 2);
        assert_eq!(metadata.rooms[0].id, 1);
        assert_eq!(metadata.rooms[0].name, "Bad");
        assert_eq!(metadata.rooms[0].group_address.to_string(), "0a0b0c");
        assert_eq!(metadata.rooms[1].name, "Küche");

        assert_eq!(metadata.devices.len(), 2);
        let heater = &metadata.devices[0];
        assert_eq!(heater.address().to_string(), "010203");
        assert_eq!(heater.device_type(), DeviceType::HeatingThermostat);
        assert_eq!(heater.serial, "KEQ01234");
        assert_eq!(heater.name, "Heiz");
        assert_eq!(heater.room_id, 1);
        let window = &metadata.devices[1];
        assert_eq!(window.device_type(), DeviceType::ShutterContact);
        assert_eq!(window.name, "Fenster");
        assert_eq!(window.room_id, 2);
    }

    #[test]
    fn should_parse_metadata_without_devices() {
        let mut blob = vec![0x56, 0x02, 1, 5, 1];
        blob.extend(b"X");
        blob.extend([1, 2, 3]);
        let metadata = parse_metadata(&format!("00,01,{}", b64(&blob))).unwrap();
        assert_eq!(metadata.rooms.len(), 1);
        assert!(metadata.devices.is_empty());
    }

    #[test]
    fn should_consume_whole_metadata_blob() {
        let blob = metadata_blob();
        let (metadata, consumed) = metadata_records(&blob).unwrap();
        assert_eq!(metadata.rooms.len(), 2);
        assert_eq!(metadata.devices.len(), 2);
        assert_eq!(consumed, blob.len());

        let mut rooms_only = vec![0x56, 0x02, 1, 5, 1];
        rooms_only.extend(b"X");
        rooms_only.extend([1, 2, 3]);
        let (_, consumed) = metadata_records(&rooms_only).unwrap();
        assert_eq!(consumed, rooms_only.len());
    }

    #[test]
    fn should_tolerate_trailing_metadata_bytes() {
        let mut blob = metadata_blob();
        let expected = blob.len();
        blob.push(0x00);
        let (metadata, consumed) = metadata_records(&blob).unwrap();
        assert_eq!(consumed, expected);
        assert_eq!(metadata.devices.len(), 2);
        assert!(parse_metadata(&format!("00,01,{}", b64(&blob))).is_ok());
    }

    #[test]
    fn should_reject_truncated_metadata() {
        let mut blob = metadata_blob();
        blob.truncate(blob.len() - 3);
        let err = parse_metadata(&format!("00,01,{}", b64(&blob))).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn should_reject_metadata_that_is_not_base64() {
        let err = parse_metadata("00,01,@@@").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    // ── Configuration ───────────────────────────────────────────────────

    #[test]
    fn should_parse_thermostat_configuration() {
        let mut blob = vec![0u8; 24];
        blob[0] = 0xd2;
        blob[1..4].copy_from_slice(&[0x01, 0x02, 0x03]);
        blob[4] = 1;
        blob[18..24].copy_from_slice(&[42, 34, 61, 9, 7, 24]);
        let config = parse_device_config(&format!("010203,{}", b64(&blob))).unwrap();

        assert_eq!(config.address.to_string(), "010203");
        assert_eq!(config.device_type, DeviceType::HeatingThermostat);
        let thermostat = config.thermostat.unwrap();
        assert!((thermostat.comfort_temperature - 21.0).abs() < f64::EPSILON);
        assert!((thermostat.eco_temperature - 17.0).abs() < f64::EPSILON);
        assert!((thermostat.max_temperature - 30.5).abs() < f64::EPSILON);
        assert!((thermostat.min_temperature - 4.5).abs() < f64::EPSILON);
        assert!((thermostat.temperature_offset - 3.5).abs() < f64::EPSILON);
        assert!((thermostat.window_open_temperature - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_skip_temperatures_for_other_types() {
        let mut blob = vec![0u8; 5];
        blob[4] = 4;
        let config = parse_device_config(&format!("000000,{}", b64(&blob))).unwrap();
        assert_eq!(config.device_type, DeviceType::ShutterContact);
        assert!(config.thermostat.is_none());
    }

    // ── Device list ─────────────────────────────────────────────────────

    #[test]
    fn should_parse_heating_thermostat_record() {
        let blob = thermostat_record([1, 2, 3], 0x12, 0x99, 64, 43, [0x00, 0xd7]);
        let records = parse_device_list(&b64(&blob), heating).unwrap();

        assert_eq!(records.len(), 1);
        let StatusReport::HeatingThermostat {
            valve,
            setpoint,
            actual_temperature,
            mode,
            battery,
            flags,
        } = records[0].report
        else {
            panic!("expected a heating thermostat report");
        };
        assert_eq!(valve, 64);
        assert!((setpoint - 21.5).abs() < f64::EPSILON);
        assert_eq!(actual_temperature, Some(21.5));
        assert_eq!(mode, Mode::Manual);
        assert_eq!(battery, Battery::Low);
        assert!(flags.initialized);
        assert!(flags.valid);
        assert!(!flags.error);
        assert!(!flags.from_command);
        assert!(flags.gateway_known);
        assert!(flags.dst_active);
        assert!(!flags.panel_locked);
        assert!(!flags.link_error);
    }

    #[test]
    fn should_leave_zero_temperature_absent() {
        let blob = thermostat_record([1, 2, 3], 0x10, 0x03, 0, 40, [0, 0]);
        let records =
            parse_device_list(&b64(&blob), |_| Some(DeviceType::HeatingThermostatPlus)).unwrap();
        let StatusReport::HeatingThermostat {
            actual_temperature,
            mode,
            battery,
            ..
        } = records[0].report
        else {
            panic!("expected a heating thermostat report");
        };
        assert!(actual_temperature.is_none());
        assert_eq!(mode, Mode::Boost);
        assert_eq!(battery, Battery::Ok);
    }

    #[test]
    fn should_parse_wall_thermostat_temperature_with_ninth_bit() {
        let mut blob = vec![
            12, 0x0a, 0x0b, 0x0c, 0x00, 0x12, 0x80, 0x00, 0xaa, 0x00, 0x00, 0x00, 0x04,
        ];
        let records = parse_device_list(&b64(&blob), |_| Some(DeviceType::WallThermostat)).unwrap();
        assert_eq!(
            records[0].report,
            StatusReport::WallThermostat {
                actual_temperature: 26.0,
                battery: Battery::Low,
            }
        );

        blob[8] = 0x2a;
        let records = parse_device_list(&b64(&blob), |_| Some(DeviceType::WallThermostat)).unwrap();
        assert_eq!(
            records[0].report,
            StatusReport::WallThermostat {
                actual_temperature: 0.4,
                battery: Battery::Low,
            }
        );
    }

    #[test]
    fn should_decode_shutter_contact_state() {
        let open = [6, 0x04, 0x05, 0x06, 0x00, 0x12, 0x02];
        let closed = [6, 0x04, 0x05, 0x06, 0x00, 0x12, 0x00];
        let shutter = |_: &RfAddress| Some(DeviceType::ShutterContact);

        let records = parse_device_list(&b64(&open), shutter).unwrap();
        assert_eq!(
            records[0].report,
            StatusReport::ShutterContact {
                state: WindowState::Open,
                battery: Battery::Ok,
            }
        );
        let records = parse_device_list(&b64(&closed), shutter).unwrap();
        assert_eq!(
            records[0].report,
            StatusReport::ShutterContact {
                state: WindowState::Closed,
                battery: Battery::Ok,
            }
        );
    }

    #[test]
    fn should_skip_unknown_addresses_and_keep_walking() {
        let mut blob = thermostat_record([9, 9, 9], 0x12, 0x00, 10, 40, [0, 0]);
        blob.extend([6, 0x04, 0x05, 0x06, 0x00, 0x12, 0x82]);
        let records = parse_device_list(&b64(&blob), |addr| {
            (addr == &RfAddress::new([4, 5, 6])).then_some(DeviceType::ShutterContact)
        })
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, RfAddress::new([4, 5, 6]));
        assert_eq!(
            records[0].report,
            StatusReport::ShutterContact {
                state: WindowState::Open,
                battery: Battery::Low,
            }
        );
    }

    #[test]
    fn should_skip_truncated_thermostat_record() {
        let blob = [6, 0x01, 0x02, 0x03, 0x00, 0x12, 0x00];
        let records = parse_device_list(&b64(&blob), heating).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn should_keep_good_records_around_a_malformed_one() {
        let mut blob = vec![6, 0x07, 0x08, 0x09, 0x00, 0x12, 0x00];
        blob.extend(thermostat_record([1, 2, 3], 0x12, 0x19, 0x1e, 0x2a, [0x00, 0xd2]));
        let records = parse_device_list(&b64(&blob), heating).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, RfAddress::new([1, 2, 3]));
    }

    #[test]
    fn should_stop_at_trailing_partial_record() {
        let mut blob = thermostat_record([1, 2, 3], 0x12, 0x19, 0x1e, 0x2a, [0x00, 0xd2]);
        blob.extend([2, 0x09]);
        let records = parse_device_list(&b64(&blob), heating).unwrap();

        assert_eq!(records.len(), 1);
        let StatusReport::HeatingThermostat {
            valve,
            setpoint,
            actual_temperature,
            ..
        } = records[0].report
        else {
            panic!("expected a heating thermostat report");
        };
        assert_eq!(valve, 0x1e);
        assert!((setpoint - 21.0).abs() < f64::EPSILON);
        assert_eq!(actual_temperature, Some(21.0));
    }

    // ── Ack ─────────────────────────────────────────────────────────────

    #[test]
    fn should_parse_accepted_ack() {
        let ack = parse_send_ack("0c,0,31").unwrap();
        assert!(ack.accepted);
        assert_eq!(ack.duty_cycle, 0x0c);
        assert_eq!(ack.free_memory_slots, 0x31);
    }

    #[test]
    fn should_parse_rejected_ack() {
        let ack = parse_send_ack("64,1,0").unwrap();
        assert!(!ack.accepted);
        assert_eq!(ack.duty_cycle, 100);
        assert_eq!(ack.free_memory_slots, 0);
    }

    #[test]
    fn should_reject_incomplete_ack() {
        let err = parse_send_ack("00,0").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { index: 2, .. }));
    }
}
