//! Document-level event listeners and dispatch.
//!
//! Listeners are registered on the document, the way page scripts call
//! `document.addEventListener`. Dispatch runs capture-phase listeners first,
//! then bubble-phase listeners unless propagation was stopped. A click whose
//! default action was not prevented activates the nearest enclosing link.

use std::fmt;

use tracing::trace;

use crate::document::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    Click,
    /// The pointer left the document.
    PointerLeave,
}

impl EventKind {
    /// Parse a DOM event type name (`click`, `mousemove`, `mouseleave`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mousemove" | "pointermove" => Some(Self::PointerMove),
            "click" => Some(Self::Click),
            "mouseleave" | "pointerleave" => Some(Self::PointerLeave),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PointerMove => "mousemove",
            Self::Click => "click",
            Self::PointerLeave => "mouseleave",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A registered document listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub kind: EventKind,
    pub phase: Phase,
    /// Who registered the listener (`"picker"` for the inspector, a script
    /// name for page handlers).
    pub owner: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Listeners {
    entries: Vec<Listener>,
    next_id: u64,
}

impl Listeners {
    pub(crate) fn add(&mut self, kind: EventKind, phase: Phase, owner: String) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(Listener {
            id,
            kind,
            phase,
            owner,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|l| l.id == id)
    }

    pub(crate) fn all(&self) -> &[Listener] {
        &self.entries
    }

    /// Listeners for `kind` in dispatch order: capture, then bubble, each in
    /// registration order.
    pub(crate) fn plan(&self, kind: EventKind) -> Vec<Listener> {
        let of_phase = |phase: Phase| {
            self.entries
                .iter()
                .filter(move |l| l.kind == kind && l.phase == phase)
                .cloned()
        };
        of_phase(Phase::Capture).chain(of_phase(Phase::Bubble)).collect()
    }
}

/// A pointer event travelling through the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEvent {
    pub kind: EventKind,
    pub target: Option<NodeId>,
    pub client_x: f64,
    pub client_y: f64,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PageEvent {
    pub fn new(kind: EventKind, target: Option<NodeId>, client_x: f64, client_y: f64) -> Self {
        Self {
            kind,
            target,
            client_x,
            client_y,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn pointer_move(target: NodeId, client_x: f64, client_y: f64) -> Self {
        Self::new(EventKind::PointerMove, Some(target), client_x, client_y)
    }

    pub fn click(target: NodeId, client_x: f64, client_y: f64) -> Self {
        Self::new(EventKind::Click, Some(target), client_x, client_y)
    }

    pub fn pointer_leave() -> Self {
        Self::new(EventKind::PointerLeave, None, 0.0, 0.0)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// What happened while an event was dispatched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Listeners that ran, in order.
    pub invoked: Vec<ListenerId>,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// Link followed by the click's default action.
    pub navigation: Option<String>,
}

impl DispatchOutcome {
    pub fn ran(&self, id: ListenerId) -> bool {
        self.invoked.contains(&id)
    }
}

/// Dispatch `event` to the document's listeners through `handler`.
///
/// The listener set is snapshotted before dispatch; a listener removed by an
/// earlier handler during the same dispatch is skipped.
pub fn dispatch_event<F>(
    doc: &mut Document,
    mut event: PageEvent,
    mut handler: F,
) -> DispatchOutcome
where
    F: FnMut(&mut Document, &Listener, &mut PageEvent),
{
    let mut outcome = DispatchOutcome::default();
    let plan = doc.listeners_plan(event.kind);

    for listener in &plan {
        if event.propagation_stopped && listener.phase == Phase::Bubble {
            break;
        }
        if !doc.has_listener(listener.id) {
            continue;
        }
        trace!(kind = %event.kind, owner = %listener.owner, "dispatching to listener");
        handler(doc, listener, &mut event);
        outcome.invoked.push(listener.id);
    }

    outcome.default_prevented = event.default_prevented;
    outcome.propagation_stopped = event.propagation_stopped;

    if event.kind == EventKind::Click
        && !event.default_prevented
        && let Some(target) = event.target
    {
        outcome.navigation = doc.link_href(target).map(str::to_string);
    }

    outcome
}

impl Document {
    /// `href` of the nearest `<a href>` enclosing `node`.
    pub fn link_href(&self, node: NodeId) -> Option<&str> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.local_name(current) == Some("a")
                && let Some(href) = self.attribute(current, "href")
            {
                return Some(href);
            }
            cursor = self.parent(current);
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::document::{Rect, Viewport},
    };

    fn page_with_link() -> (Document, NodeId) {
        let mut doc = Document::new("links", Viewport {
            width: 800,
            height: 600,
        });
        let link = doc.create_element("a");
        doc.set_attribute(link, "href", "https://example.com/next").unwrap();
        doc.append_child(doc.body(), link).unwrap();
        let span = doc.create_element("span");
        doc.append_child(link, span).unwrap();
        doc.set_rect(span, Rect::new(0.0, 0.0, 50.0, 10.0)).unwrap();
        (doc, span)
    }

    #[test]
    fn capture_runs_before_bubble() {
        let (mut doc, span) = page_with_link();
        let bubble = doc.add_event_listener(EventKind::Click, Phase::Bubble, "page");
        let capture = doc.add_event_listener(EventKind::Click, Phase::Capture, "picker");

        let outcome = dispatch_event(&mut doc, PageEvent::click(span, 1.0, 1.0), |_, _, _| {});
        assert_eq!(outcome.invoked, [capture, bubble]);
    }

    #[test]
    fn unprevented_click_follows_link() {
        let (mut doc, span) = page_with_link();
        let outcome = dispatch_event(&mut doc, PageEvent::click(span, 1.0, 1.0), |_, _, _| {});
        assert_eq!(outcome.navigation.as_deref(), Some("https://example.com/next"));
    }

    #[test]
    fn stopped_propagation_skips_page_handlers_and_navigation() {
        let (mut doc, span) = page_with_link();
        let page = doc.add_event_listener(EventKind::Click, Phase::Bubble, "page");
        doc.add_event_listener(EventKind::Click, Phase::Capture, "picker");

        let outcome = dispatch_event(
            &mut doc,
            PageEvent::click(span, 1.0, 1.0),
            |_, listener, event| {
                if listener.owner == "picker" {
                    event.prevent_default();
                    event.stop_propagation();
                }
            },
        );
        assert!(!outcome.ran(page));
        assert!(outcome.default_prevented);
        assert_eq!(outcome.navigation, None);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let (mut doc, span) = page_with_link();
        let first = doc.add_event_listener(EventKind::PointerMove, Phase::Bubble, "a");
        let second = doc.add_event_listener(EventKind::PointerMove, Phase::Bubble, "b");

        let outcome = dispatch_event(
            &mut doc,
            PageEvent::pointer_move(span, 1.0, 1.0),
            |doc, listener, _| {
                if listener.id == first {
                    doc.remove_event_listener(second);
                }
            },
        );
        assert_eq!(outcome.invoked, [first]);
    }

    #[test]
    fn other_kinds_are_not_invoked() {
        let (mut doc, _) = page_with_link();
        doc.add_event_listener(EventKind::Click, Phase::Capture, "picker");
        let outcome = dispatch_event(&mut doc, PageEvent::pointer_leave(), |_, _, _| {});
        assert!(outcome.invoked.is_empty());
    }

    #[test]
    fn remove_reports_missing_listener() {
        let (mut doc, _) = page_with_link();
        let id = doc.add_event_listener(EventKind::Click, Phase::Capture, "picker");
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
    }
}
