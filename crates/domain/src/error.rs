//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MaxCubeError`] via `#[from]`.

use std::fmt;

use crate::device::Mode;

/// Base error for domain-level failures.
#[derive(Debug, thiserror::Error)]
pub enum MaxCubeError {
    /// A domain invariant was violated by the caller's input.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced device or room is not known to the registry.
    #[error("not found")]
    NotFound(#[from] NotFoundError),
}

/// Invalid caller input, detected before any IO is performed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The mode name is not one the hub understands.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// The mode exists but cannot be requested by a set-temperature command.
    #[error("mode {0} cannot be set")]
    UnsupportedMode(Mode),

    /// Manual and boost commands need an explicit temperature.
    #[error("a temperature is required for this mode")]
    MissingTemperature,

    /// The temperature does not fit the 6-bit half-degree encoding.
    #[error("temperature {0} is outside the supported range")]
    TemperatureOutOfRange(f64),

    /// The text is not a 6-digit hex radio address.
    #[error("invalid radio address: {0}")]
    InvalidAddress(String),

    /// A device was built without its radio address.
    #[error("missing radio address")]
    MissingAddress,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing that was looked up (e.g. `"Device"`).
    pub entity: &'static str,
    /// Identifier used for the lookup.
    pub id: String,
}

/// Why the hub refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The hub has no free memory slots left to queue radio commands.
    NoMemory,
    /// A shutter contact in the target room reports an open window.
    WindowOpen,
    /// No known cause.
    Unknown,
}

impl RejectionReason {
    /// Stable upper-case code for the reason.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoMemory => "NO_MEMORY",
            Self::WindowOpen => "WINDOW_OPEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
