//! How the popup reaches the background and finds the active tab.

use {
    async_trait::async_trait,
    picker_bus::{MessageBus, TransportError},
    picker_protocol::{Reply, RuntimeMessage, TabDescriptor},
};

/// Sends requests to the background and waits for the reply.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    async fn request(&self, message: &RuntimeMessage) -> Result<Reply, TransportError>;
}

/// Resolves the tab the popup was opened over.
#[async_trait]
pub trait TabQuery: Send + Sync {
    async fn active_tab(&self) -> Option<TabDescriptor>;
}

#[async_trait]
impl RuntimeClient for MessageBus {
    async fn request(&self, message: &RuntimeMessage) -> Result<Reply, TransportError> {
        MessageBus::request(self, message).await
    }
}

/// A fixed answer to the active-tab query.
#[derive(Debug, Clone, Default)]
pub struct FixedTab(pub Option<TabDescriptor>);

impl FixedTab {
    pub fn new(tab: TabDescriptor) -> Self {
        Self(Some(tab))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TabQuery for FixedTab {
    async fn active_tab(&self) -> Option<TabDescriptor> {
        self.0.clone()
    }
}
