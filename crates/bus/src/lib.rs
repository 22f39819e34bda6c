//! In-process runtime message bus.
//!
//! Each execution context (page, background, popup) talks to the others only
//! through a [`MessageBus`]: tab commands with a single reply, background
//! requests and posts, and popup broadcasts.

pub mod bus;
pub mod error;

pub use {
    bus::{MessageBus, Responder, RuntimeEnvelope, TabEnvelope},
    error::{Error, Result, TransportError},
};
