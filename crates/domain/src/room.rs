//! Room — a named grouping of devices sharing a radio group address.

use serde::{Deserialize, Serialize};

use crate::address::RfAddress;

/// A room as announced by the hub's metadata message.
///
/// Membership is not stored here; devices point at their room through
/// [`Device::room_id`](crate::device::Device::room_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u8,
    pub name: String,
    pub group_address: RfAddress,
}

impl Room {
    #[must_use]
    pub fn new(id: u8, name: impl Into<String>, group_address: RfAddress) -> Self {
        Self {
            id,
            name: name.into(),
            group_address,
        }
    }
}
