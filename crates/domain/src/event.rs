//! Events observable by callers of the cube client.

use std::sync::Arc;

use crate::message::{CubeStatus, SendAck};
use crate::registry::Registry;

/// Something that happened on the cube connection.
///
/// Events are broadcast; every subscriber sees every event published after
/// it subscribed.
#[derive(Debug, Clone)]
pub enum CubeEvent {
    /// The TCP connection was established.
    Connected,
    /// The connection dropped back to the disconnected state.
    Disconnected,
    /// A socket-level failure. The heartbeat timer will reconnect.
    Error(Arc<std::io::Error>),
    /// Snapshot of the registry after a received chunk was processed.
    Update(Arc<Registry>),
    /// Duty cycle and memory slots changed.
    Status(CubeStatus),
    /// A command acknowledgment arrived.
    Response(SendAck),
}

impl CubeEvent {
    /// Short name of the event kind, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error(_) => "error",
            Self::Update(_) => "update",
            Self::Status(_) => "status",
            Self::Response(_) => "response",
        }
    }
}
