//! Encoders for outbound command lines.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use maxcube_domain::address::RfAddress;
use maxcube_domain::device::Mode;
use maxcube_domain::error::ValidationError;

/// Heartbeat: ask the cube for a fresh device list.
pub const LIST_REQUEST: &str = "l:\r\n";

/// Fixed prefix of a set-temperature command: unknown byte, command
/// `0x40`, no flags, then three zero bytes of the sender address.
const SET_TEMPERATURE_PREFIX: [u8; 6] = [0x00, 0x04, 0x40, 0x00, 0x00, 0x00];

/// Highest temperature the six-bit field can carry.
const MAX_TEMPERATURE: f64 = 31.5;

/// Pack `mode` and `temperature` into one byte: mode in the top two bits,
/// half-degrees in the low six.
///
/// Auto mode may omit the temperature, leaving the low bits at zero so the
/// device follows its weekly program.
///
/// # Errors
///
/// Returns [`ValidationError`] when vacation mode is requested, when a
/// non-auto mode has no temperature, or when the temperature is outside
/// `0.0..=31.5`.
pub fn encode_temperature(mode: Mode, temperature: Option<f64>) -> Result<u8, ValidationError> {
    if mode == Mode::Vacation {
        return Err(ValidationError::UnsupportedMode(mode));
    }
    let half_degrees = match temperature {
        None if mode == Mode::Auto => 0,
        None => return Err(ValidationError::MissingTemperature),
        Some(value) if !(0.0..=MAX_TEMPERATURE).contains(&value) => {
            return Err(ValidationError::TemperatureOutOfRange(value));
        }
        // bounded to 0..=63 by the range check above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(value) => (value * 2.0).round() as u8,
    };
    Ok((mode.bits() << 6) | half_degrees)
}

/// Build the `s:` line setting `address` in `room_id` to `mode`/`temperature`.
///
/// # Errors
///
/// Propagates [`encode_temperature`] validation errors.
pub fn set_temperature_line(
    address: RfAddress,
    room_id: u8,
    mode: Mode,
    temperature: Option<f64>,
) -> Result<String, ValidationError> {
    let encoded = encode_temperature(mode, temperature)?;

    let mut payload = Vec::with_capacity(14);
    payload.extend_from_slice(&SET_TEMPERATURE_PREFIX);
    payload.extend_from_slice(address.as_bytes());
    payload.push(room_id);
    payload.push(encoded);
    // "valid until" date and time, unused outside vacation mode
    payload.extend_from_slice(&[0x00, 0x00, 0x00]);

    Ok(format!("s:{}\r\n", STANDARD.encode(payload)))
}

/// Build the `r:` line clearing the error flag of `address`.
#[must_use]
pub fn reset_error_line(address: RfAddress) -> String {
    format!("r:01,{}\r\n", STANDARD.encode(address.as_bytes()))
}
