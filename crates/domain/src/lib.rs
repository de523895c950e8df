//! # maxcube-domain
//!
//! Pure domain model for a client of the cube heating hub.
//!
//! ## Responsibilities
//! - Foundational types: radio addresses, error conventions
//! - Define **Devices** (thermostats, shutter contacts, push buttons, …)
//! - Define **Rooms** (named groupings of devices)
//! - Define the **Registry** holding everything discovered during a session
//! - Define the **decoded messages** produced by the wire codec
//! - Define the **events** observable by callers of the client
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod address;
pub mod error;

pub mod device;
pub mod event;
pub mod message;
pub mod registry;
pub mod room;
