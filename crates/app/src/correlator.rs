//! Command correlator — pairs one outbound command with the next ack.
//!
//! At most one command is outstanding. Its reply handle `R` is parked here
//! together with a deadline; it comes back out exactly once, either when an
//! acknowledgment arrives ([`Correlator::resolve`]), when the deadline passes
//! ([`Correlator::expire`]) or when the session gives up on it
//! ([`Correlator::abandon`]).

use std::time::Duration;

use tokio::time::Instant;

use maxcube_domain::error::RejectionReason;
use maxcube_domain::message::SendAck;
use maxcube_domain::registry::Registry;

/// How the hub answered a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    Rejected(RejectionReason),
}

/// The single in-flight command.
#[derive(Debug)]
pub struct PendingCommand<R> {
    /// Room of the target device, used to explain a rejection.
    pub room_id: Option<u8>,
    pub deadline: Instant,
    pub timeout: Duration,
    pub reply: R,
}

/// Single-slot gate holding at most one [`PendingCommand`].
#[derive(Debug)]
pub struct Correlator<R> {
    pending: Option<PendingCommand<R>>,
}

impl<R> Default for Correlator<R> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<R> Correlator<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the outstanding command, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Park `reply` until an ack arrives or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Hands `reply` back untouched when a command is already outstanding;
    /// the outstanding command and its deadline are left as they were.
    pub fn arm(&mut self, room_id: Option<u8>, timeout: Duration, reply: R) -> Result<(), R> {
        if self.pending.is_some() {
            return Err(reply);
        }
        self.pending = Some(PendingCommand {
            room_id,
            deadline: Instant::now() + timeout,
            timeout,
            reply,
        });
        Ok(())
    }

    /// Resolve the outstanding command with `ack`.
    ///
    /// Returns `None` when nothing was waiting for an ack.
    pub fn resolve(&mut self, ack: &SendAck, registry: &Registry) -> Option<(R, Resolution)> {
        let pending = self.pending.take()?;
        let resolution = if ack.accepted {
            Resolution::Accepted
        } else {
            Resolution::Rejected(classify_rejection(ack, registry, pending.room_id))
        };
        Some((pending.reply, resolution))
    }

    /// Hand back the outstanding command if its deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Option<(R, Duration)> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        self.pending
            .take()
            .map(|pending| (pending.reply, pending.timeout))
    }

    /// Drop the outstanding command without an answer.
    pub fn abandon(&mut self) -> Option<R> {
        self.pending.take().map(|pending| pending.reply)
    }
}

/// Explain why the hub refused a command.
///
/// An exhausted memory budget wins over an open window; with neither, the
/// reason is unknown.
#[must_use]
pub fn classify_rejection(
    ack: &SendAck,
    registry: &Registry,
    room_id: Option<u8>,
) -> RejectionReason {
    if ack.free_memory_slots == 0 {
        return RejectionReason::NoMemory;
    }
    match room_id {
        Some(room_id) if registry.window_open_in_room(room_id) => RejectionReason::WindowOpen,
        _ => RejectionReason::Unknown,
    }
}
