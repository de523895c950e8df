//! Connection supervisor: the single task that owns the socket.
//!
//! Everything that touches the connection runs in [`Session::run`]: the
//! heartbeat/reconnect timer, the pending connect, socket reads, the
//! command deadline and caller requests are branches of one `select!`
//! loop, so the hub state, the busy flag and the pending command are never
//! shared.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use maxcube_app::correlator::{Correlator, Resolution};
use maxcube_app::hub_state::HubState;
use maxcube_app::ports::EventPublisher;
use maxcube_domain::address::RfAddress;
use maxcube_domain::device::Mode;
use maxcube_domain::error::NotFoundError;
use maxcube_domain::event::CubeEvent;

use crate::codec::{LIST_REQUEST, encode};
use crate::config::CubeConfig;
use crate::error::CommandError;
use crate::frame;

const READ_BUFFER_SIZE: usize = 8192;

type ConnectFuture = Pin<Box<dyn Future<Output = io::Result<TcpStream>> + Send>>;

/// Where the supervisor stands with the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

pub(crate) type Reply = oneshot::Sender<Result<(), CommandError>>;

/// A caller command forwarded to the session task.
pub(crate) enum Request {
    SetTemperature {
        address: RfAddress,
        mode: Mode,
        temperature: Option<f64>,
        reply: Reply,
    },
    ResetError {
        address: RfAddress,
        reply: Reply,
    },
}

fn respond(reply: Reply, result: Result<(), CommandError>) {
    if reply.send(result).is_err() {
        tracing::trace!("caller stopped waiting for the command outcome");
    }
}

async fn wait_connect(connecting: &mut Option<ConnectFuture>) -> io::Result<TcpStream> {
    match connecting {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

async fn read_chunk(reader: &mut Option<OwnedReadHalf>, buffer: &mut [u8]) -> io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buffer).await,
        None => std::future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// State owned by the session task.
pub(crate) struct Session<P> {
    config: CubeConfig,
    events: P,
    state: watch::Sender<ConnectionState>,
    requests: mpsc::Receiver<Request>,
    hub: HubState,
    correlator: Correlator<Reply>,
    /// Set when a line is written, cleared by the next received chunk.
    busy: bool,
    reader: Option<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
}

impl<P: EventPublisher + Send + 'static> Session<P> {
    pub(crate) fn new(
        config: CubeConfig,
        events: P,
        state: watch::Sender<ConnectionState>,
        requests: mpsc::Receiver<Request>,
    ) -> Self {
        Self {
            config,
            events,
            state,
            requests,
            hub: HubState::new(),
            correlator: Correlator::new(),
            busy: false,
            reader: None,
            writer: None,
        }
    }

    /// Drive the connection until every client handle is gone.
    pub(crate) async fn run(mut self) {
        let mut heartbeat = tokio::time::interval(self.config.heartbeat_interval());
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut connecting: Option<ConnectFuture> = None;
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let deadline = self.correlator.deadline();
            tokio::select! {
                _ = heartbeat.tick() => self.on_heartbeat(&mut connecting).await,
                result = wait_connect(&mut connecting), if connecting.is_some() => {
                    connecting = None;
                    self.on_connect(result);
                }
                result = read_chunk(&mut self.reader, &mut buffer), if self.reader.is_some() => {
                    match result {
                        Ok(0) => self.disconnect(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "cube closed the connection",
                        )),
                        Ok(read) => self.on_chunk(&buffer[..read]),
                        Err(err) => self.disconnect(err),
                    }
                }
                () = wait_deadline(deadline), if deadline.is_some() => self.on_deadline(),
                request = self.requests.recv() => match request {
                    Some(request) => self.on_request(request).await,
                    None => break,
                },
            }
        }

        if let Some(reply) = self.correlator.abandon() {
            respond(reply, Err(CommandError::Closed));
        }
        self.reader = None;
        self.writer = None;
        self.set_state(ConnectionState::Disconnected);
        tracing::info!("cube session stopped");
    }

    fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "connection state changed");
        }
    }

    async fn on_heartbeat(&mut self, connecting: &mut Option<ConnectFuture>) {
        match self.current_state() {
            ConnectionState::Disconnected => {
                let host = self.config.host.clone();
                let port = self.config.port;
                tracing::info!(%host, port, "connecting to cube");
                self.set_state(ConnectionState::Connecting);
                *connecting = Some(Box::pin(TcpStream::connect((host, port))));
            }
            ConnectionState::Connecting => {
                tracing::debug!("connect attempt still in progress");
            }
            ConnectionState::Connected => {
                if self.correlator.is_pending() {
                    tracing::debug!("command in flight, skipping list request");
                    return;
                }
                if self.busy {
                    tracing::debug!("previous request still unanswered");
                }
                self.busy = true;
                if let Err(err) = self.write(LIST_REQUEST).await {
                    self.disconnect(err);
                }
            }
        }
    }

    fn on_connect(&mut self, result: io::Result<TcpStream>) {
        match result {
            Ok(stream) => {
                if let Err(err) = stream.set_nodelay(true) {
                    tracing::debug!(error = %err, "unable to disable nagle");
                }
                let (reader, writer) = stream.into_split();
                self.reader = Some(reader);
                self.writer = Some(writer);
                self.busy = false;
                self.set_state(ConnectionState::Connected);
                tracing::info!(
                    host = %self.config.host,
                    port = self.config.port,
                    "connected to cube"
                );
                self.events.publish(CubeEvent::Connected);
            }
            Err(err) => self.disconnect(err),
        }
    }

    fn on_chunk(&mut self, chunk: &[u8]) {
        self.busy = false;
        let acks = frame::process_chunk(chunk, &mut self.hub, &self.events);
        for ack in acks {
            let Some((reply, resolution)) = self.correlator.resolve(&ack, self.hub.registry())
            else {
                tracing::debug!("acknowledgment without pending command");
                continue;
            };
            match resolution {
                Resolution::Accepted => {
                    tracing::debug!("command accepted");
                    respond(reply, Ok(()));
                }
                Resolution::Rejected(reason) => {
                    tracing::warn!(
                        %reason,
                        free_memory_slots = ack.free_memory_slots,
                        "command rejected"
                    );
                    respond(reply, Err(CommandError::Rejected(reason)));
                }
            }
        }
    }

    fn on_deadline(&mut self) {
        if let Some((reply, timeout)) = self.correlator.expire(Instant::now()) {
            tracing::warn!(timeout_ms = timeout.as_millis(), "command timed out");
            self.busy = false;
            respond(reply, Err(CommandError::Timeout(timeout)));
        }
    }

    async fn on_request(&mut self, request: Request) {
        match request {
            Request::SetTemperature {
                address,
                mode,
                temperature,
                reply,
            } => match self.set_temperature_line(address, mode, temperature) {
                Ok((line, room_id)) => self.dispatch(&line, Some(room_id), reply).await,
                Err(err) => respond(reply, Err(err)),
            },
            Request::ResetError { address, reply } => {
                if self.current_state() != ConnectionState::Connected {
                    respond(reply, Err(CommandError::NotConnected));
                    return;
                }
                let room_id = self.hub.registry().device(&address).map(|device| device.room_id);
                self.dispatch(&encode::reset_error_line(address), room_id, reply)
                    .await;
            }
        }
    }

    fn set_temperature_line(
        &self,
        address: RfAddress,
        mode: Mode,
        temperature: Option<f64>,
    ) -> Result<(String, u8), CommandError> {
        if self.current_state() != ConnectionState::Connected {
            return Err(CommandError::NotConnected);
        }
        encode::encode_temperature(mode, temperature)?;
        let device = self
            .hub
            .registry()
            .device(&address)
            .ok_or_else(|| NotFoundError {
                entity: "Device",
                id: address.to_string(),
            })?;
        let line = encode::set_temperature_line(address, device.room_id, mode, temperature)?;
        Ok((line, device.room_id))
    }

    /// Write a command line and wait for its acknowledgment.
    async fn dispatch(&mut self, line: &str, room_id: Option<u8>, reply: Reply) {
        if self.busy || self.correlator.is_pending() {
            tracing::debug!("cube busy, refusing command");
            respond(reply, Err(CommandError::Busy));
            return;
        }

        self.busy = true;
        if let Err(err) = self.write(line).await {
            let err = Arc::new(err);
            respond(reply, Err(CommandError::Transport(Arc::clone(&err))));
            self.lose_connection(err);
            return;
        }

        if let Err(reply) = self
            .correlator
            .arm(room_id, self.config.command_timeout(), reply)
        {
            respond(reply, Err(CommandError::Busy));
        }
    }

    async fn write(&mut self, line: &str) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        };
        tracing::debug!(line = line.trim_end(), "sending");
        writer.write_all(line.as_bytes()).await
    }

    fn disconnect(&mut self, err: io::Error) {
        self.lose_connection(Arc::new(err));
    }

    /// Fall back to disconnected; the next heartbeat tick reconnects.
    fn lose_connection(&mut self, err: Arc<io::Error>) {
        tracing::warn!(error = %err, "cube connection lost");
        self.reader = None;
        self.writer = None;
        self.busy = false;
        self.hub.reset();
        self.set_state(ConnectionState::Disconnected);

        if let Some(reply) = self.correlator.abandon() {
            respond(reply, Err(CommandError::Transport(Arc::clone(&err))));
        }
        self.events.publish(CubeEvent::Error(err));
        self.events.publish(CubeEvent::Disconnected);
    }
}
