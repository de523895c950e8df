//! Radio address newtype.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// 3-byte radio address of a device, room group or cube.
///
/// Rendered as six lowercase hex digits (e.g. `"0a1b2c"`); this string form
/// is also the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RfAddress([u8; 3]);

impl RfAddress {
    /// Wrap raw address bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Build an address from the first three bytes of `bytes`.
    ///
    /// Returns `None` when fewer than three bytes are available.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 3] = bytes.get(..3)?.try_into().ok()?;
        Some(Self(raw))
    }

    /// Access the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Display for RfAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for RfAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut raw = [0u8; 3];
        hex::decode_to_slice(s, &mut raw)
            .map_err(|_| ValidationError::InvalidAddress(s.to_string()))?;
        Ok(Self(raw))
    }
}

impl Serialize for RfAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RfAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_as_lowercase_hex() {
        let addr = RfAddress::new([0x0A, 0xBC, 0x01]);
        assert_eq!(addr.to_string(), "0abc01");
    }

    #[test]
    fn should_parse_mixed_case_hex() {
        let addr: RfAddress = "0ABc01".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0x0A, 0xBC, 0x01]);
    }

    #[test]
    fn should_reject_wrong_length() {
        let result = RfAddress::from_str("0abc");
        assert!(matches!(result, Err(ValidationError::InvalidAddress(_))));
    }

    #[test]
    fn should_reject_non_hex_characters() {
        let result = RfAddress::from_str("zz0000");
        assert!(matches!(result, Err(ValidationError::InvalidAddress(_))));
    }

    #[test]
    fn should_build_from_slice_prefix() {
        let addr = RfAddress::from_slice(&[1, 2, 3, 4]).unwrap();
        assert_eq!(addr, RfAddress::new([1, 2, 3]));
        assert!(RfAddress::from_slice(&[1, 2]).is_none());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let addr = RfAddress::new([0x12, 0x34, 0x56]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"123456\"");
        let parsed: RfAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }
}
