//! # maxcube-adapter-tcp
//!
//! TCP adapter for the cube's line protocol.
//!
//! ## How it works
//!
//! [`CubeClient::connect`] spawns one session task that owns the socket. A
//! heartbeat timer connects when disconnected and sends a list request when
//! connected; there is no backoff, the timer is the only retry mechanism.
//! Received chunks are split into lines, decoded and applied to the device
//! registry; every chunk ends with an `update` event carrying a registry
//! snapshot.
//!
//! Commands go through the same task. At most one is outstanding: a second
//! command while the first waits for its acknowledgment fails with
//! [`CommandError::Busy`] instead of queuing.
//!
//! ## Events
//!
//! | Event | When |
//! |-------|------|
//! | `Connected` | the TCP connection is up |
//! | `Disconnected` | the connection dropped; the registry was cleared |
//! | `Error` | a socket error occurred |
//! | `Update` | a chunk was processed |
//! | `Status` | duty cycle / memory slots were reported |
//! | `Response` | an acknowledgment arrived |
//!
//! ## Dependency rule
//!
//! Depends on `maxcube-app` and `maxcube-domain`.

pub mod codec;
mod config;
mod error;
pub mod frame;
mod session;

pub use config::{CubeConfig, DEFAULT_PORT};
pub use error::{CommandError, DecodeError};
pub use session::ConnectionState;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use maxcube_app::event_bus::InProcessEventBus;
use maxcube_domain::address::RfAddress;
use maxcube_domain::device::Mode;
use maxcube_domain::event::CubeEvent;

use crate::session::{Request, Session};

/// Handle to a running cube session.
///
/// Dropping the handle stops the session once the in-flight request, if
/// any, is handled; [`CubeClient::shutdown`] does the same and waits for it.
pub struct CubeClient {
    requests: mpsc::Sender<Request>,
    events: InProcessEventBus,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl CubeClient {
    /// Start supervising the cube at `config.host:config.port`.
    ///
    /// The first connect attempt is made right away; events from it are
    /// only seen by receivers obtained through [`CubeClient::subscribe`],
    /// so subscribe before awaiting anything.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn connect(config: CubeConfig) -> Self {
        let events = InProcessEventBus::new(config.event_capacity.max(1));
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let (requests, request_rx) = mpsc::channel(8);

        let session = Session::new(config, events.clone(), state_tx, request_rx);
        let task = tokio::spawn(session.run());

        Self {
            requests,
            events,
            state,
            task,
        }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CubeEvent> {
        self.events.subscribe()
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Set the target temperature and mode of a thermostat.
    ///
    /// Resolves once the cube acknowledges the command.
    ///
    /// # Errors
    ///
    /// - [`CommandError::NotConnected`] when the session is not connected
    /// - [`CommandError::Invalid`] for vacation mode, a missing or out of
    ///   range temperature, or an address missing from the registry
    /// - [`CommandError::Busy`] when another command is outstanding
    /// - [`CommandError::Rejected`] when the cube refused the command
    /// - [`CommandError::Timeout`] when no acknowledgment arrived in time
    /// - [`CommandError::Transport`] when the socket failed meanwhile
    pub async fn set_temperature(
        &self,
        address: RfAddress,
        mode: Mode,
        temperature: Option<f64>,
    ) -> Result<(), CommandError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Request::SetTemperature {
            address,
            mode,
            temperature,
            reply,
        })
        .await?;
        outcome.await.map_err(|_| CommandError::Closed)?
    }

    /// Clear the error flag of a device.
    ///
    /// # Errors
    ///
    /// Same as [`CubeClient::set_temperature`], without the validation
    /// errors.
    pub async fn reset_error(&self, address: RfAddress) -> Result<(), CommandError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Request::ResetError { address, reply }).await?;
        outcome.await.map_err(|_| CommandError::Closed)?
    }

    async fn send(&self, request: Request) -> Result<(), CommandError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| CommandError::Closed)
    }

    /// Stop the session and wait for it to close the socket.
    pub async fn shutdown(self) {
        let Self { requests, task, .. } = self;
        drop(requests);
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "cube session ended abnormally");
        }
    }
}
