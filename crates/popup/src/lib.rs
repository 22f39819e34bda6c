//! Popup surface: start/stop controls and the element info panel.

pub mod client;
pub mod controller;
pub mod panel;

pub use {
    client::{FixedTab, RuntimeClient, TabQuery},
    controller::{ClickOutcome, PopupController, PopupView},
    panel::{escape_html, render_details},
};
