//! Runtime message bus between the page, background and popup contexts.

use std::{collections::HashMap, sync::Arc};

use {
    picker_config::BusConfig,
    picker_protocol::{PopupEvent, Reply, RuntimeMessage, TabCommand, TabId},
    serde::{Serialize, de::DeserializeOwned},
    tokio::sync::{RwLock, broadcast, mpsc, oneshot},
    tracing::{debug, trace},
};

use crate::error::{Error, Result};

/// Popup broadcast buffer. Slow popups lag instead of blocking the sender.
const POPUP_CHANNEL_CAPACITY: usize = 64;

/// A command delivered to a tab, with the channel for its answer.
#[derive(Debug)]
pub struct TabEnvelope {
    pub command: TabCommand,
    reply: oneshot::Sender<Reply>,
}

impl TabEnvelope {
    /// Answer the command. Returns `false` when the sender stopped waiting.
    pub fn respond(self, reply: Reply) -> bool {
        self.reply.send(reply).is_ok()
    }
}

/// A message delivered to the background runtime.
#[derive(Debug)]
pub struct RuntimeEnvelope {
    pub message: RuntimeMessage,
    reply: Option<oneshot::Sender<Reply>>,
}

impl RuntimeEnvelope {
    /// Whether the sender is waiting for a [`Reply`].
    pub fn wants_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Answer the message. Fire-and-forget messages drop the reply.
    pub fn respond(self, reply: Reply) -> bool {
        self.into_parts().1.respond(reply)
    }

    /// Split into the message and a detached responder.
    pub fn into_parts(self) -> (RuntimeMessage, Responder) {
        (self.message, Responder(self.reply))
    }
}

/// The reply half of a [`RuntimeEnvelope`], movable into a spawned task.
#[derive(Debug)]
pub struct Responder(Option<oneshot::Sender<Reply>>);

impl Responder {
    pub fn respond(self, reply: Reply) -> bool {
        match self.0 {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

struct Inner {
    max_message_bytes: usize,
    tabs: RwLock<HashMap<TabId, mpsc::UnboundedSender<TabEnvelope>>>,
    runtime: RwLock<Option<mpsc::UnboundedSender<RuntimeEnvelope>>>,
    popups: broadcast::Sender<PopupEvent>,
}

/// In-process stand-in for the extension messaging runtime.
///
/// Every payload is serialized to JSON and parsed back on the way through, so
/// receivers only ever see structural copies, and anything larger than
/// `max_message_bytes` is rejected before delivery.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<Inner>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

impl MessageBus {
    pub fn new(config: &BusConfig) -> Self {
        let (popups, _) = broadcast::channel(POPUP_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                max_message_bytes: config.max_message_bytes,
                tabs: RwLock::new(HashMap::new()),
                runtime: RwLock::new(None),
                popups,
            }),
        }
    }

    pub fn max_message_bytes(&self) -> usize {
        self.inner.max_message_bytes
    }

    /// Round-trip `value` through its wire form.
    fn copy<T: Serialize + DeserializeOwned>(&self, value: &T) -> Result<T> {
        let bytes = serde_json::to_vec(value)?;
        let limit = self.inner.max_message_bytes;
        if bytes.len() > limit {
            return Err(Error::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
        trace!(bytes = bytes.len(), "copied message");
        Ok(serde_json::from_slice(&bytes)?)
    }

    // ── Tabs ────────────────────────────────────────────────────────────────

    /// Attach a page context to `tab`, replacing any previous one (navigation).
    pub async fn register_tab(&self, tab: TabId) -> mpsc::UnboundedReceiver<TabEnvelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.inner.tabs.write().await.insert(tab, tx).is_some() {
            debug!(tab, "replaced page context");
        } else {
            debug!(tab, "registered page context");
        }
        rx
    }

    /// Detach the page context of `tab` (tab closed).
    pub async fn unregister_tab(&self, tab: TabId) -> bool {
        let removed = self.inner.tabs.write().await.remove(&tab).is_some();
        if removed {
            debug!(tab, "unregistered page context");
        }
        removed
    }

    pub async fn has_tab(&self, tab: TabId) -> bool {
        self.inner
            .tabs
            .read()
            .await
            .get(&tab)
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Deliver `command` to `tab` and wait for the page context's answer.
    ///
    /// There is no timeout: the call resolves when the page answers or when
    /// its context goes away.
    pub async fn send_to_tab(&self, tab: TabId, command: TabCommand) -> Result<Reply> {
        let command = self.copy(&command)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = TabEnvelope {
            command,
            reply: reply_tx,
        };

        {
            let tabs = self.inner.tabs.read().await;
            let sender = tabs.get(&tab).ok_or(Error::NoReceiver)?;
            sender.send(envelope).map_err(|_| Error::NoReceiver)?;
        }
        debug!(tab, %command, "delivered tab command");

        let reply = reply_rx.await.map_err(|_| Error::Closed)?;
        self.copy(&reply)
    }

    // ── Background runtime ──────────────────────────────────────────────────

    /// Attach the background listener. A later call replaces the earlier one.
    pub async fn serve_runtime(&self) -> mpsc::UnboundedReceiver<RuntimeEnvelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.runtime.write().await = Some(tx);
        debug!("background listener attached");
        rx
    }

    async fn deliver_runtime(&self, envelope: RuntimeEnvelope) -> Result<()> {
        let runtime = self.inner.runtime.read().await;
        let sender = runtime.as_ref().ok_or(Error::NoReceiver)?;
        sender.send(envelope).map_err(|_| Error::NoReceiver)
    }

    /// Send a request to the background and wait for its [`Reply`].
    pub async fn request(&self, message: &RuntimeMessage) -> Result<Reply> {
        let message = self.copy(message)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        debug!(kind = message.kind(), "runtime request");
        self.deliver_runtime(RuntimeEnvelope {
            message,
            reply: Some(reply_tx),
        })
        .await?;

        let reply = reply_rx.await.map_err(|_| Error::Closed)?;
        self.copy(&reply)
    }

    /// Send a message to the background without waiting for an answer.
    pub async fn post(&self, message: &RuntimeMessage) -> Result<()> {
        let message = self.copy(message)?;
        debug!(kind = message.kind(), "runtime post");
        self.deliver_runtime(RuntimeEnvelope {
            message,
            reply: None,
        })
        .await
    }

    // ── Popups ──────────────────────────────────────────────────────────────

    /// Listen for popup broadcasts. Dropping the receiver closes the popup.
    pub fn subscribe_popup(&self) -> broadcast::Receiver<PopupEvent> {
        self.inner.popups.subscribe()
    }

    /// Broadcast to every open popup. Returns how many popups received it.
    pub fn broadcast_popup(&self, event: &PopupEvent) -> Result<usize> {
        let event = self.copy(event)?;
        self.inner
            .popups
            .send(event)
            .map_err(|_| Error::NoReceiver)
    }
}
