use picker_common::FromMessage;

/// Failure to deliver a message across a context boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Nobody is listening at the destination (tab closed, inspector not
    /// injected, no popup open).
    #[error("Could not establish connection. Receiving end does not exist.")]
    NoReceiver,

    /// The receiver went away before answering.
    #[error("The message port closed before a response was received.")]
    Closed,

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("message could not be copied: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type TransportError = Error;
pub type Result<T> = std::result::Result<T, Error>;

picker_common::impl_context!();
