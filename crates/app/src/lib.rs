//! # maxcube-app
//!
//! Application layer — session state, command correlation and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters use or implement:
//!   - `EventPublisher` — broadcast caller-facing events
//! - Hold the per-session state (`HubState`): registry, duty cycle, memory slots
//! - Correlate an outbound command with the next acknowledgment (`Correlator`)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `maxcube-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod correlator;
pub mod event_bus;
pub mod hub_state;
pub mod ports;
