//! Page-resident element inspector.
//!
//! [`PageInspector`] is the picking-mode state machine over a
//! [`picker_page::Document`]; [`PageRuntime`] wires it to a tab endpoint on
//! the message bus and to user input.

pub mod error;
pub mod extract;
pub mod inspector;
pub mod label;
pub mod runtime;

pub use {
    error::{Error, Result},
    extract::{ExtractLimits, extract_details},
    inspector::{INSPECTOR_OWNER, PageInspector, PickingState, Selection},
    label::FloatingLabel,
    runtime::{InputOutcome, PageHandle, PageRuntime, PageSnapshot, UserInput},
};
