//! Cube adapter error types.

use std::sync::Arc;
use std::time::Duration;

use maxcube_domain::error::{MaxCubeError, NotFoundError, RejectionReason, ValidationError};

/// Why a received protocol line could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A comma-separated field the decoder needs is absent.
    #[error("missing field {index} ({name})")]
    MissingField {
        /// Position in the comma-separated payload.
        index: usize,
        /// What the field holds.
        name: &'static str,
    },

    /// A field that must be a hex number is not.
    #[error("field {name} is not hex: {value:?}")]
    InvalidHex {
        /// What the field holds.
        name: &'static str,
        /// The raw text.
        value: String,
    },

    /// The binary part of the payload is not valid base64.
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),

    /// The binary blob ends before a field the decoder needs.
    #[error("payload truncated: needed {needed} bytes, got {actual}")]
    Truncated {
        /// Bytes required to read the field.
        needed: usize,
        /// Bytes available.
        actual: usize,
    },

    /// A domain-level error while building records.
    #[error("domain error")]
    Domain(#[source] MaxCubeError),
}

/// Outcome of a failed `set_temperature` or `reset_error` call.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Another write or command is still outstanding.
    #[error("the cube is busy")]
    Busy,

    /// The supervisor is not in the connected state.
    #[error("not connected to the cube")]
    NotConnected,

    /// The request was refused before anything was written.
    #[error("invalid command")]
    Invalid(#[from] MaxCubeError),

    /// No acknowledgment arrived in time.
    #[error("no answer from cube after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The cube acknowledged the command but refused it.
    #[error("command was rejected: {0}")]
    Rejected(RejectionReason),

    /// The socket failed while the command was being sent or awaited.
    #[error("transport error")]
    Transport(#[source] Arc<std::io::Error>),

    /// The session task is gone.
    #[error("cube session closed")]
    Closed,
}

impl CommandError {
    /// Rejection reason, when the cube refused the command.
    #[must_use]
    pub const fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err.into())
    }
}

impl From<NotFoundError> for CommandError {
    fn from(err: NotFoundError) -> Self {
        Self::Invalid(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_busy_error() {
        assert_eq!(CommandError::Busy.to_string(), "the cube is busy");
    }

    #[test]
    fn should_display_timeout_in_millis() {
        let err = CommandError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "no answer from cube after 10000ms");
    }

    #[test]
    fn should_display_rejection_code() {
        let err = CommandError::Rejected(RejectionReason::WindowOpen);
        assert_eq!(err.to_string(), "command was rejected: WINDOW_OPEN");
        assert_eq!(err.rejection(), Some(RejectionReason::WindowOpen));
        assert_eq!(CommandError::Busy.rejection(), None);
    }

    #[test]
    fn should_convert_not_found_into_invalid_command() {
        let err: CommandError = NotFoundError {
            entity: "Device",
            id: "010203".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CommandError::Invalid(MaxCubeError::NotFound(_))
        ));
    }

    #[test]
    fn should_expose_truncation_details() {
        let err = DecodeError::Truncated {
            needed: 12,
            actual: 4,
        };
        assert_eq!(err.to_string(), "payload truncated: needed 12 bytes, got 4");
    }
}
