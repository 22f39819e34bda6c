//! Seams between the coordinator and the contexts it relays to.

use {
    async_trait::async_trait,
    picker_bus::{MessageBus, TransportError},
    picker_protocol::{PopupEvent, Reply, TabCommand, TabId},
};

/// Delivers commands to a tab's page context and returns its answer.
#[async_trait]
pub trait TabTransport: Send + Sync {
    async fn send_to_tab(&self, tab: TabId, command: TabCommand) -> Result<Reply, TransportError>;
}

/// Broadcasts events to open popups.
#[async_trait]
pub trait PopupSink: Send + Sync {
    async fn broadcast(&self, event: &PopupEvent) -> Result<(), TransportError>;
}

#[async_trait]
impl TabTransport for MessageBus {
    async fn send_to_tab(&self, tab: TabId, command: TabCommand) -> Result<Reply, TransportError> {
        MessageBus::send_to_tab(self, tab, command).await
    }
}

#[async_trait]
impl PopupSink for MessageBus {
    async fn broadcast(&self, event: &PopupEvent) -> Result<(), TransportError> {
        self.broadcast_popup(event).map(|_| ())
    }
}
