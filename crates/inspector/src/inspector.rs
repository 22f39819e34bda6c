//! Picking mode state machine.
//!
//! While active the inspector owns three document listeners: pointer-move and
//! pointer-leave in the bubble phase, click in the capture phase so it runs
//! before any page handler. Entering and leaving the mode registers and
//! removes the whole set at once.

use {
    picker_config::InspectorConfig,
    picker_page::{
        Document, EventKind, Listener, ListenerId, Marker, NodeId, PageEvent, Phase,
    },
    picker_protocol::{ElementDetails, Reply},
    tracing::{debug, info, warn},
};

use crate::{
    error::Result,
    extract::{ExtractLimits, extract_details},
    label::FloatingLabel,
};

/// Owner tag on every listener the inspector registers.
pub const INSPECTOR_OWNER: &str = "picker";

const PICKING_CURSOR: &str = "crosshair";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickingState {
    #[default]
    Inactive,
    Active,
}

impl PickingState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// An element chosen by a click while picking.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: Option<NodeId>,
    pub details: Option<ElementDetails>,
}

/// Page-resident inspector for one document.
#[derive(Debug)]
pub struct PageInspector {
    state: PickingState,
    limits: ExtractLimits,
    label: FloatingLabel,
    listeners: Vec<ListenerId>,
    highlighted: Option<NodeId>,
    selected: Option<NodeId>,
    /// Inline body cursor in effect before picking started.
    saved_cursor: Option<String>,
}

impl PageInspector {
    /// Inject the inspector into `doc`. The floating label is created hidden.
    pub fn attach(doc: &mut Document, config: &InspectorConfig) -> Result<Self> {
        let label = FloatingLabel::attach(doc, config.label_offset)?;
        Ok(Self {
            state: PickingState::Inactive,
            limits: ExtractLimits::from(config),
            label,
            listeners: Vec::new(),
            highlighted: None,
            selected: None,
            saved_cursor: None,
        })
    }

    pub fn state(&self) -> PickingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn label(&self) -> &FloatingLabel {
        &self.label
    }

    pub fn limits(&self) -> &ExtractLimits {
        &self.limits
    }

    /// Whether `listener` is one of the inspector's live listeners.
    pub fn owns(&self, listener: &Listener) -> bool {
        listener.owner == INSPECTOR_OWNER && self.listeners.contains(&listener.id)
    }

    /// Enter picking mode. A second call while active changes nothing.
    pub fn start_picking(&mut self, doc: &mut Document) -> Result<Reply> {
        if self.is_active() {
            debug!("picking mode already active");
            return Ok(Reply::PickingStarted);
        }

        self.listeners = vec![
            doc.add_event_listener(EventKind::PointerMove, Phase::Bubble, INSPECTOR_OWNER),
            doc.add_event_listener(EventKind::Click, Phase::Capture, INSPECTOR_OWNER),
            doc.add_event_listener(EventKind::PointerLeave, Phase::Bubble, INSPECTOR_OWNER),
        ];

        let body = doc.body();
        self.saved_cursor = doc.inline_style(body, "cursor").map(str::to_string);
        doc.set_inline_style(body, "cursor", Some(PICKING_CURSOR))?;

        self.state = PickingState::Active;
        info!(title = doc.title(), "entered picking mode");
        Ok(Reply::PickingStarted)
    }

    /// Leave picking mode. Calling it while inactive changes nothing.
    pub fn stop_picking(&mut self, doc: &mut Document) -> Result<Reply> {
        if !self.is_active() {
            debug!("picking mode not active");
            return Ok(Reply::PickingStopped);
        }

        for id in self.listeners.drain(..) {
            doc.remove_event_listener(id);
        }
        self.clear_highlight(doc)?;
        if let Some(selected) = self.selected.take() {
            doc.set_marker(selected, Marker::Selected, false);
        }

        let body = doc.body();
        doc.set_inline_style(body, "cursor", self.saved_cursor.take().as_deref())?;

        self.state = PickingState::Inactive;
        info!(title = doc.title(), "left picking mode");
        Ok(Reply::PickingStopped)
    }

    /// Run the inspector's side of a dispatch. Returns the selection for a
    /// click; every other event yields `None`.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        listener: &Listener,
        event: &mut PageEvent,
    ) -> Option<Selection> {
        if !self.is_active() || !self.owns(listener) {
            return None;
        }

        let outcome = match listener.kind {
            EventKind::PointerMove => self.on_pointer_move(doc, event).map(|()| None),
            EventKind::Click => Ok(Some(self.on_click(doc, event))),
            EventKind::PointerLeave => self.clear_highlight(doc).map(|()| None),
        };

        outcome.unwrap_or_else(|e| {
            warn!(kind = %listener.kind, error = %e, "inspector handler failed");
            None
        })
    }

    fn on_pointer_move(&mut self, doc: &mut Document, event: &PageEvent) -> Result<()> {
        let Some(target) = event.target else {
            return Ok(());
        };

        if self.label.contains(doc, target) {
            return self.clear_highlight(doc);
        }

        if self.highlighted.is_some_and(|current| current != target) {
            self.clear_highlight(doc)?;
        }

        if self.highlighted != Some(target) {
            self.highlighted = Some(target);
            doc.set_marker(target, Marker::Highlighted, true);
            self.label
                .show(doc, target, event.client_x, event.client_y)?;
        }
        Ok(())
    }

    fn on_click(&mut self, doc: &mut Document, event: &mut PageEvent) -> Selection {
        event.prevent_default();
        event.stop_propagation();

        if let Some(previous) = self.selected.take() {
            doc.set_marker(previous, Marker::Selected, false);
        }
        self.selected = event.target;
        if let Some(node) = event.target {
            doc.set_marker(node, Marker::Selected, true);
        }

        let details = extract_details(doc, event.target, &self.limits);
        info!(
            tag = details.as_ref().map_or("", |d| d.tag_name.as_str()),
            "element selected"
        );
        Selection {
            node: event.target,
            details,
        }
    }

    fn clear_highlight(&mut self, doc: &mut Document) -> Result<()> {
        if let Some(node) = self.highlighted.take() {
            doc.set_marker(node, Marker::Highlighted, false);
        }
        self.label.hide(doc)?;
        Ok(())
    }
}
