//! Background coordinator: relays picking commands from the popup to the
//! page context of a tab and forwards selections back to the popup.

pub mod coordinator;
pub mod transport;

pub use {
    coordinator::Coordinator,
    transport::{PopupSink, TabTransport},
};
