//! Background relay between the popup and the page contexts.
//!
//! The coordinator owns the session slot: the tab currently in picking mode.
//! Only the start and stop handlers write it, and the lock is never held
//! across a relay.

use std::sync::Arc;

use {
    picker_bus::{MessageBus, RuntimeEnvelope},
    picker_config::{CoordinatorConfig, StopFailurePolicy},
    picker_protocol::{ElementDetails, PopupEvent, Reply, RuntimeMessage, TabCommand, TabId},
    tokio::{
        sync::{Mutex, mpsc},
        task::JoinHandle,
    },
    tracing::{debug, error, info, warn},
};

use crate::transport::{PopupSink, TabTransport};

pub struct Coordinator {
    tabs: Arc<dyn TabTransport>,
    popups: Arc<dyn PopupSink>,
    stop_failure_policy: StopFailurePolicy,
    session: Mutex<Option<TabId>>,
}

impl Coordinator {
    pub fn new(
        tabs: Arc<dyn TabTransport>,
        popups: Arc<dyn PopupSink>,
        config: &CoordinatorConfig,
    ) -> Self {
        Self {
            tabs,
            popups,
            stop_failure_policy: config.stop_failure_policy,
            session: Mutex::new(None),
        }
    }

    /// Relay through `bus` for both tabs and popups.
    pub fn with_bus(bus: &MessageBus, config: &CoordinatorConfig) -> Self {
        let bus = Arc::new(bus.clone());
        Self::new(bus.clone(), bus, config)
    }

    /// Tab currently recorded as owning the picking session.
    pub async fn session_owner(&self) -> Option<TabId> {
        *self.session.lock().await
    }

    pub fn stop_failure_policy(&self) -> StopFailurePolicy {
        self.stop_failure_policy
    }

    /// Start picking on `tab`. The slot is written before the relay, so a
    /// later start request overwrites an earlier one still in flight.
    pub async fn handle_start_request(&self, tab: TabId) -> Reply {
        let previous = self.session.lock().await.replace(tab);
        info!(tab, previous = ?previous, "picking session requested");

        let reply = match self.tabs.send_to_tab(tab, TabCommand::StartPicking).await {
            Ok(Reply::Failed { error }) => {
                warn!(tab, error = %error, "page refused to start picking");
                Reply::Failed { error }
            },
            Ok(ack) => {
                debug!(tab, %ack, "page acknowledged start");
                return Reply::PickingStarted;
            },
            Err(e) => {
                error!(tab, error = %e, "failed to deliver startPicking");
                Reply::failed(e.to_string())
            },
        };

        let mut session = self.session.lock().await;
        if *session == Some(tab) {
            *session = None;
            info!(tab, "picking session rolled back");
        }
        reply
    }

    /// Stop picking on the recorded tab, if any.
    pub async fn handle_stop_request(&self) -> Reply {
        let Some(tab) = *self.session.lock().await else {
            debug!("stop requested with no picking session");
            return Reply::NoPickingActive;
        };

        match self.tabs.send_to_tab(tab, TabCommand::StopPicking).await {
            Ok(Reply::Failed { error }) => {
                warn!(tab, error = %error, "page refused to stop picking");
                self.apply_stop_failure(tab).await;
                Reply::Failed { error }
            },
            Ok(ack) => {
                debug!(tab, %ack, "page acknowledged stop");
                let mut session = self.session.lock().await;
                if *session == Some(tab) {
                    *session = None;
                }
                info!(tab, "picking session ended");
                Reply::PickingStopped
            },
            Err(e) => {
                error!(tab, error = %e, "failed to deliver stopPicking");
                self.apply_stop_failure(tab).await;
                Reply::failed(e.to_string())
            },
        }
    }

    async fn apply_stop_failure(&self, tab: TabId) {
        match self.stop_failure_policy {
            StopFailurePolicy::Retain => {
                debug!(tab, "keeping picking session after failed stop");
            },
            StopFailurePolicy::Clear => {
                let mut session = self.session.lock().await;
                if *session == Some(tab) {
                    *session = None;
                    info!(tab, "picking session cleared after failed stop");
                }
            },
        }
    }

    /// Forward a selection to every open popup. Never touches the session.
    pub async fn handle_result_report(&self, info: Option<ElementDetails>) {
        let tag = info.as_ref().map(|d| d.tag_name.clone());
        let event = PopupEvent::DisplayElementInfo { info };
        match self.popups.broadcast(&event).await {
            Ok(()) => debug!(tag = ?tag, "forwarded element info to popup"),
            Err(e) => warn!(tag = ?tag, error = %e, "failed to forward element info to popup"),
        }
    }

    /// Handle one runtime message, answering it when the sender waits.
    pub async fn dispatch(&self, envelope: RuntimeEnvelope) {
        let (message, responder) = envelope.into_parts();
        debug!(message = %message, "runtime message");
        let reply = match message {
            RuntimeMessage::StartPickingMode { tab } => self.handle_start_request(tab.id).await,
            RuntimeMessage::StopPickingMode { .. } => self.handle_stop_request().await,
            RuntimeMessage::ElementSelected { info } => {
                self.handle_result_report(info).await;
                return;
            },
        };
        if !responder.respond(reply) {
            debug!("requester stopped waiting for reply");
        }
    }

    /// Serve runtime messages until every sender is gone. Each message runs in
    /// its own task, so a relay waiting on a page does not hold up the rest.
    pub async fn run(self: Arc<Self>, mut receiver: mpsc::UnboundedReceiver<RuntimeEnvelope>) {
        info!("coordinator running");
        while let Some(envelope) = receiver.recv().await {
            let coordinator = Arc::clone(&self);
            tokio::spawn(async move {
                coordinator.dispatch(envelope).await;
            });
        }
        info!("coordinator stopped");
    }

    /// Attach to `bus` as the background listener and serve it in a task.
    pub async fn spawn(self: Arc<Self>, bus: &MessageBus) -> JoinHandle<()> {
        let receiver = bus.serve_runtime().await;
        tokio::spawn(self.run(receiver))
    }
}
