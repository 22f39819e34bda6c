//! Popup state and its reactions to clicks and broadcasts.

use std::sync::Arc;

use {
    picker_bus::MessageBus,
    picker_protocol::{ElementDetails, PopupEvent, Reply, RuntimeMessage},
    tokio::{
        sync::{Mutex, broadcast},
        task::JoinHandle,
    },
    tracing::{debug, error, info, warn},
};

use crate::{
    client::{RuntimeClient, TabQuery},
    panel::{
        PICKING_PROMPT, PICKING_STOPPED, START_FAILED, STOP_FAILED, render_details,
        render_error, render_message,
    },
};

/// What the popup currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub active: bool,
    pub start_visible: bool,
    pub stop_visible: bool,
    /// Inner markup of the info panel.
    pub panel: String,
}

impl Default for PopupView {
    fn default() -> Self {
        Self {
            active: false,
            start_visible: true,
            stop_visible: false,
            panel: String::new(),
        }
    }
}

/// Result of pressing the start or stop control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The control does nothing in the current state.
    Ignored,
    /// No tab to act on.
    NoActiveTab,
    Replied(Reply),
    /// The request never got an answer.
    TransportFailed(String),
}

pub struct PopupController {
    runtime: Arc<dyn RuntimeClient>,
    tabs: Arc<dyn TabQuery>,
    view: Arc<Mutex<PopupView>>,
}

impl PopupController {
    pub fn new(runtime: Arc<dyn RuntimeClient>, tabs: Arc<dyn TabQuery>) -> Self {
        Self {
            runtime,
            tabs,
            view: Arc::new(Mutex::new(PopupView::default())),
        }
    }

    pub fn with_bus(bus: &MessageBus, tabs: Arc<dyn TabQuery>) -> Self {
        Self::new(Arc::new(bus.clone()), tabs)
    }

    pub async fn view(&self) -> PopupView {
        self.view.lock().await.clone()
    }

    pub async fn on_start_clicked(&self) -> ClickOutcome {
        if self.view.lock().await.active {
            return ClickOutcome::Ignored;
        }
        let Some(tab) = self.tabs.active_tab().await else {
            debug!("no active tab to start picking on");
            return ClickOutcome::NoActiveTab;
        };
        let tab_id = tab.id;

        let result = self
            .runtime
            .request(&RuntimeMessage::StartPickingMode { tab })
            .await;

        let mut view = self.view.lock().await;
        match result {
            Ok(Reply::PickingStarted) => {
                info!(tab = tab_id, "picking mode started");
                view.active = true;
                view.start_visible = false;
                view.stop_visible = true;
                view.panel = render_message(PICKING_PROMPT);
                ClickOutcome::Replied(Reply::PickingStarted)
            },
            Ok(reply) => {
                warn!(tab = tab_id, %reply, "start request refused");
                view.panel = render_error(&failure_text(START_FAILED, &reply));
                ClickOutcome::Replied(reply)
            },
            Err(e) => {
                error!(tab = tab_id, error = %e, "failed to send start request");
                view.panel = render_error(&format!("Communication error: {e}"));
                ClickOutcome::TransportFailed(e.to_string())
            },
        }
    }

    pub async fn on_stop_clicked(&self) -> ClickOutcome {
        if !self.view.lock().await.active {
            return ClickOutcome::Ignored;
        }
        let Some(tab) = self.tabs.active_tab().await else {
            debug!("no active tab to stop picking on");
            return ClickOutcome::NoActiveTab;
        };
        let tab_id = tab.id;

        let result = self
            .runtime
            .request(&RuntimeMessage::StopPickingMode { tab })
            .await;

        let mut view = self.view.lock().await;
        match result {
            // No session left in the background means there is nothing to stop.
            Ok(reply @ (Reply::PickingStopped | Reply::NoPickingActive)) => {
                info!(tab = tab_id, %reply, "picking mode stopped");
                view.active = false;
                view.start_visible = true;
                view.stop_visible = false;
                view.panel = render_message(PICKING_STOPPED);
                ClickOutcome::Replied(reply)
            },
            Ok(reply) => {
                warn!(tab = tab_id, %reply, "stop request refused");
                view.panel = render_error(&failure_text(STOP_FAILED, &reply));
                ClickOutcome::Replied(reply)
            },
            Err(e) => {
                error!(tab = tab_id, error = %e, "failed to send stop request");
                view.panel = render_error(&format!("Communication error: {e}"));
                ClickOutcome::TransportFailed(e.to_string())
            },
        }
    }

    /// Re-render the panel for a new selection.
    pub async fn on_result_received(&self, info: Option<&ElementDetails>) {
        let panel = render_details(info);
        self.view.lock().await.panel = panel;
        debug!(tag = info.map(|d| d.tag_name.as_str()), "rendered element info");
    }

    pub async fn handle_event(&self, event: PopupEvent) {
        match event {
            PopupEvent::DisplayElementInfo { info } => self.on_result_received(info.as_ref()).await,
        }
    }

    /// Render every broadcast from `events` until the bus goes away.
    pub fn listen(&self, mut events: broadcast::Receiver<PopupEvent>) -> JoinHandle<()> {
        let view = Arc::clone(&self.view);
        let listener = Self {
            runtime: Arc::clone(&self.runtime),
            tabs: Arc::clone(&self.tabs),
            view,
        };
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => listener.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "popup fell behind, dropped element info");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("popup listener stopped");
        })
    }
}

fn failure_text(prefix: &str, reply: &Reply) -> String {
    match reply.error() {
        Some(error) => format!("{prefix} {error}"),
        None => prefix.to_string(),
    }
}
