//! One-shot command given through `MAXCUBE_COMMAND`.
//!
//! Syntax: `set:<address>,<mode>[,<temperature>]` or `reset:<address>`.

use std::str::FromStr;

use maxcube_adapter_tcp::{CommandError, CubeClient};
use maxcube_domain::address::RfAddress;
use maxcube_domain::device::Mode;
use maxcube_domain::error::ValidationError;
use maxcube_domain::registry::Registry;

/// A command to run once the target device is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OneShot {
    SetTemperature {
        address: RfAddress,
        mode: Mode,
        temperature: Option<f64>,
    },
    ResetError {
        address: RfAddress,
    },
}

/// Why `MAXCUBE_COMMAND` could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum ParseCommandError {
    #[error("expected `set:` or `reset:`, got {0:?}")]
    UnknownVerb(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid temperature {0:?}")]
    InvalidTemperature(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl OneShot {
    /// Read the command from the environment, if one was given.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCommandError`] when `MAXCUBE_COMMAND` is set but
    /// malformed.
    pub fn from_env() -> Result<Option<Self>, ParseCommandError> {
        std::env::var("MAXCUBE_COMMAND")
            .ok()
            .map(|value| value.parse())
            .transpose()
    }

    #[must_use]
    pub const fn address(&self) -> RfAddress {
        match self {
            Self::SetTemperature { address, .. } | Self::ResetError { address } => *address,
        }
    }

    /// Whether `registry` knows enough to run the command.
    #[must_use]
    pub fn is_ready(&self, registry: &Registry) -> bool {
        registry.device(&self.address()).is_some()
    }

    /// Send the command through `client`.
    ///
    /// # Errors
    ///
    /// Forwards the [`CommandError`] of the underlying call.
    pub async fn run(self, client: &CubeClient) -> Result<(), CommandError> {
        match self {
            Self::SetTemperature {
                address,
                mode,
                temperature,
            } => client.set_temperature(address, mode, temperature).await,
            Self::ResetError { address } => client.reset_error(address).await,
        }
    }
}

impl FromStr for OneShot {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, args) = s
            .split_once(':')
            .ok_or_else(|| ParseCommandError::UnknownVerb(s.to_string()))?;
        let mut args = args.split(',').map(str::trim);
        let address = args
            .next()
            .filter(|value| !value.is_empty())
            .ok_or(ParseCommandError::Missing("address"))?
            .parse()?;

        match verb {
            "set" => {
                let mode = args
                    .next()
                    .ok_or(ParseCommandError::Missing("mode"))?
                    .parse()?;
                let temperature = args
                    .next()
                    .map(|value| {
                        value
                            .parse::<f64>()
                            .map_err(|_| ParseCommandError::InvalidTemperature(value.to_string()))
                    })
                    .transpose()?;
                Ok(Self::SetTemperature {
                    address,
                    mode,
                    temperature,
                })
            }
            "reset" => Ok(Self::ResetError { address }),
            other => Err(ParseCommandError::UnknownVerb(other.to_string())),
        }
    }
}
