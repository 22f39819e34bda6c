//! Page context: one document, its inspector, and the tab endpoint.

use {
    picker_bus::{MessageBus, TabEnvelope},
    picker_config::InspectorConfig,
    picker_page::{DispatchOutcome, Document, EventKind, NodeId, PageEvent, dispatch_event},
    picker_protocol::{ElementDetails, Reply, RuntimeMessage, TabCommand, TabId},
    tokio::{
        sync::{mpsc, oneshot},
        task::JoinHandle,
    },
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    inspector::{PageInspector, PickingState, Selection},
};

/// Pointer input from the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserInput {
    PointerMove { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    PointerLeave,
    /// Move onto `node`, at the centre of its box.
    PointerMoveOn { node: NodeId },
    /// Click `node` at the centre of its box.
    ClickOn { node: NodeId },
}

/// What the page did with one input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputOutcome {
    pub target: Option<NodeId>,
    pub dispatch: DispatchOutcome,
    /// Page handlers (by owner) that saw the event.
    pub page_handlers: Vec<String>,
    pub selection: Option<Selection>,
    /// Whether a selection was handed to the background.
    pub reported: bool,
}

/// Point-in-time view of a page context.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub document: Document,
    pub state: PickingState,
    pub highlighted: Option<NodeId>,
    pub selected: Option<NodeId>,
    pub label_lines: Vec<String>,
    pub label_visible: bool,
}

enum PageRequest {
    Input {
        input: UserInput,
        done: oneshot::Sender<InputOutcome>,
    },
    Snapshot {
        done: oneshot::Sender<PageSnapshot>,
    },
}

/// The page-resident half of the picker for one tab.
pub struct PageRuntime {
    tab: TabId,
    doc: Document,
    inspector: PageInspector,
    bus: MessageBus,
}

impl PageRuntime {
    /// Inject the inspector into `doc`, which is shown in `tab`.
    pub fn new(
        tab: TabId,
        mut doc: Document,
        config: &InspectorConfig,
        bus: MessageBus,
    ) -> Result<Self> {
        let inspector = PageInspector::attach(&mut doc, config)?;
        Ok(Self {
            tab,
            doc,
            inspector,
            bus,
        })
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn inspector(&self) -> &PageInspector {
        &self.inspector
    }

    /// Answer a command from the background.
    pub fn handle_command(&mut self, command: TabCommand) -> Reply {
        let result = match command {
            TabCommand::StartPicking => self.inspector.start_picking(&mut self.doc),
            TabCommand::StopPicking => self.inspector.stop_picking(&mut self.doc),
        };
        result.unwrap_or_else(|e| {
            warn!(tab = self.tab, %command, error = %e, "tab command failed");
            Reply::failed(e.to_string())
        })
    }

    /// Feed one pointer input through the page.
    pub async fn handle_input(&mut self, input: UserInput) -> InputOutcome {
        let (kind, target, x, y) = match input {
            UserInput::PointerMove { x, y } => {
                (EventKind::PointerMove, self.doc.hit_test(x, y), x, y)
            },
            UserInput::Click { x, y } => (EventKind::Click, self.doc.hit_test(x, y), x, y),
            UserInput::PointerLeave => (EventKind::PointerLeave, None, 0.0, 0.0),
            UserInput::PointerMoveOn { node } => {
                let (x, y) = self.centre_of(node);
                (EventKind::PointerMove, Some(node), x, y)
            },
            UserInput::ClickOn { node } => {
                let (x, y) = self.centre_of(node);
                (EventKind::Click, Some(node), x, y)
            },
        };

        let mut selection = None;
        let mut page_handlers = Vec::new();
        let inspector = &mut self.inspector;
        let dispatch = dispatch_event(
            &mut self.doc,
            PageEvent::new(kind, target, x, y),
            |doc, listener, event| {
                if inspector.owns(listener) {
                    if let Some(chosen) = inspector.handle_event(doc, listener, event) {
                        selection = Some(chosen);
                    }
                } else {
                    page_handlers.push(listener.owner.clone());
                }
            },
        );

        if let Some(href) = &dispatch.navigation {
            info!(tab = self.tab, href = %href, "link activated");
        }

        let reported = match &selection {
            Some(chosen) => self.report(chosen.details.clone()).await,
            None => false,
        };

        InputOutcome {
            target,
            dispatch,
            page_handlers,
            selection,
            reported,
        }
    }

    fn centre_of(&self, node: NodeId) -> (f64, f64) {
        let rect = self.doc.bounding_rect(node);
        (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }

    /// Hand the selection to the background without waiting for an answer.
    async fn report(&self, info: Option<ElementDetails>) -> bool {
        match self.bus.post(&RuntimeMessage::ElementSelected { info }).await {
            Ok(()) => {
                debug!(tab = self.tab, "reported selection");
                true
            },
            Err(e) => {
                warn!(tab = self.tab, error = %e, "failed to report selection");
                false
            },
        }
    }

    fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            document: self.doc.clone(),
            state: self.inspector.state(),
            highlighted: self.inspector.highlighted(),
            selected: self.inspector.selected(),
            label_lines: self.inspector.label().lines(&self.doc),
            label_visible: self.inspector.label().is_visible(&self.doc),
        }
    }

    /// Register the tab on the bus and run the page context as a task.
    pub async fn spawn(self) -> PageHandle {
        let tab = self.tab;
        let bus = self.bus.clone();
        let commands = bus.register_tab(tab).await;
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(commands, requests_rx));
        info!(tab, "page context started");
        PageHandle {
            tab,
            bus,
            requests: requests_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<TabEnvelope>,
        mut requests: mpsc::UnboundedReceiver<PageRequest>,
    ) -> Document {
        let mut requests_open = true;
        loop {
            tokio::select! {
                envelope = commands.recv() => {
                    let Some(envelope) = envelope else {
                        break;
                    };
                    let command = envelope.command;
                    let reply = self.handle_command(command);
                    debug!(tab = self.tab, %command, %reply, "answered tab command");
                    if !envelope.respond(reply) {
                        debug!(tab = self.tab, %command, "sender stopped waiting");
                    }
                },
                request = requests.recv(), if requests_open => match request {
                    Some(PageRequest::Input { input, done }) => {
                        let outcome = self.handle_input(input).await;
                        let _ = done.send(outcome);
                    },
                    Some(PageRequest::Snapshot { done }) => {
                        let _ = done.send(self.snapshot());
                    },
                    None => requests_open = false,
                },
            }
        }
        info!(tab = self.tab, "page context closed");
        self.doc
    }
}

/// Handle to a running page context.
pub struct PageHandle {
    tab: TabId,
    bus: MessageBus,
    requests: mpsc::UnboundedSender<PageRequest>,
    task: JoinHandle<Document>,
}

impl PageHandle {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> PageRequest) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(make(tx))
            .map_err(|_| Error::PageClosed { tab: self.tab })?;
        rx.await.map_err(|_| Error::PageClosed { tab: self.tab })
    }

    /// Deliver user input and wait until the page has handled it.
    pub async fn input(&self, input: UserInput) -> Result<InputOutcome> {
        self.call(|done| PageRequest::Input { input, done }).await
    }

    pub async fn snapshot(&self) -> Result<PageSnapshot> {
        self.call(|done| PageRequest::Snapshot { done }).await
    }

    /// Close the tab and return the final document.
    pub async fn close(self) -> Result<Document> {
        self.bus.unregister_tab(self.tab).await;
        drop(self.requests);
        self.task
            .await
            .map_err(|e| Error::message(format!("page task for tab {} failed: {e}", self.tab)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        picker_page::{EventKind, Marker, Phase, Rect, Viewport},
    };

    fn checkout_page() -> (Document, NodeId) {
        let mut doc = Document::new("checkout", Viewport {
            width: 800,
            height: 600,
        });
        let button = doc.create_element("button");
        doc.set_attribute(button, "id", "go").unwrap();
        doc.set_attribute(button, "class", "btn primary").unwrap();
        doc.set_rect(button, Rect::new(10.0, 20.0, 80.0, 30.0)).unwrap();
        let text = doc.create_text("Go");
        doc.append_child(button, text).unwrap();
        doc.append_child(doc.body(), button).unwrap();
        doc.add_event_listener(EventKind::Click, Phase::Bubble, "checkout.js");
        (doc, button)
    }

    async fn running_page(bus: &MessageBus) -> (PageHandle, NodeId) {
        let (doc, button) = checkout_page();
        let runtime = PageRuntime::new(7, doc, &InspectorConfig::default(), bus.clone()).unwrap();
        (runtime.spawn().await, button)
    }

    #[tokio::test]
    async fn answers_tab_commands() {
        let bus = MessageBus::default();
        let (page, _) = running_page(&bus).await;

        assert_eq!(
            bus.send_to_tab(7, TabCommand::StartPicking).await.unwrap(),
            Reply::PickingStarted
        );
        let snapshot = page.snapshot().await.unwrap();
        assert_eq!(snapshot.state, PickingState::Active);

        assert_eq!(
            bus.send_to_tab(7, TabCommand::StopPicking).await.unwrap(),
            Reply::PickingStopped
        );
        assert_eq!(page.snapshot().await.unwrap().state, PickingState::Inactive);
        page.close().await.unwrap();
    }

    #[tokio::test]
    async fn click_while_picking_reports_selection() {
        let bus = MessageBus::default();
        let mut background = bus.serve_runtime().await;
        let (page, button) = running_page(&bus).await;
        bus.send_to_tab(7, TabCommand::StartPicking).await.unwrap();

        let outcome = page.input(UserInput::Click { x: 15.0, y: 25.0 }).await.unwrap();
        assert_eq!(outcome.target, Some(button));
        assert!(outcome.reported);
        assert!(outcome.page_handlers.is_empty());
        assert!(outcome.dispatch.default_prevented);

        let envelope = background.recv().await.unwrap();
        assert!(!envelope.wants_reply());
        let RuntimeMessage::ElementSelected { info } = envelope.message else {
            panic!("expected elementSelected");
        };
        let info = info.unwrap();
        assert_eq!(info.tag_name, "button");
        assert_eq!(info.id.as_deref(), Some("go"));
        assert_eq!(info.classes, ["btn", "primary"]);

        let snapshot = page.snapshot().await.unwrap();
        assert!(snapshot.document.has_marker(button, Marker::Selected));
        page.close().await.unwrap();
    }

    #[tokio::test]
    async fn click_while_idle_reaches_page_handlers() {
        let bus = MessageBus::default();
        let (page, _) = running_page(&bus).await;
        let outcome = page.input(UserInput::Click { x: 15.0, y: 25.0 }).await.unwrap();
        assert_eq!(outcome.page_handlers, ["checkout.js"]);
        assert!(outcome.selection.is_none());
        assert!(!outcome.reported);
        page.close().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_background_is_not_fatal() {
        let bus = MessageBus::default();
        let (page, button) = running_page(&bus).await;
        bus.send_to_tab(7, TabCommand::StartPicking).await.unwrap();

        let outcome = page.input(UserInput::ClickOn { node: button }).await.unwrap();
        assert!(outcome.selection.is_some());
        assert!(!outcome.reported);
        assert_eq!(page.snapshot().await.unwrap().state, PickingState::Active);
        page.close().await.unwrap();
    }

    #[tokio::test]
    async fn hover_moves_label() {
        let bus = MessageBus::default();
        let (page, button) = running_page(&bus).await;
        bus.send_to_tab(7, TabCommand::StartPicking).await.unwrap();

        page.input(UserInput::PointerMove { x: 20.0, y: 30.0 }).await.unwrap();
        let snapshot = page.snapshot().await.unwrap();
        assert_eq!(snapshot.highlighted, Some(button));
        assert!(snapshot.label_visible);
        assert_eq!(snapshot.label_lines, [
            "<button#go>",
            "W: 80px, H: 30px",
            "X: 10px, Y: 20px"
        ]);

        page.input(UserInput::PointerLeave).await.unwrap();
        let snapshot = page.snapshot().await.unwrap();
        assert_eq!(snapshot.highlighted, None);
        assert!(!snapshot.label_visible);
        page.close().await.unwrap();
    }

    #[tokio::test]
    async fn closed_tab_has_no_receiver() {
        let bus = MessageBus::default();
        let (page, _) = running_page(&bus).await;
        let doc = page.close().await.unwrap();
        assert_eq!(doc.title(), "checkout");

        let err = bus.send_to_tab(7, TabCommand::StartPicking).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not establish connection. Receiving end does not exist."
        );
    }
}
