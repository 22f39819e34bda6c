//! In-memory model of an inspected page.
//!
//! The host browser owns layout and style resolution; this crate only holds
//! their results (boxes and resolved style values) next to the element tree,
//! plus the document-level listener registry the inspector instruments.

pub mod document;
pub mod error;
pub mod events;
pub mod fixture;
pub mod markup;

pub use {
    document::{Document, Marker, NodeId, Rect, ScrollOffset, Viewport, format_px},
    error::{Error, Result},
    events::{
        DispatchOutcome, EventKind, Listener, ListenerId, PageEvent, Phase, dispatch_event,
    },
    fixture::{FixtureDocument, FixtureListener, FixtureNode, load_fixture},
    markup::truncate_chars,
};
