//! Chat transport seam between the bot service and a chat backend.

use anyhow::Error;
use async_trait::async_trait;
use guess_moderator::Outbound;

/// A chat line received from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Login of the author, lowercase
    pub author: String,
    pub text: String,
    /// Moderator or broadcaster
    pub is_privileged: bool,
}

impl ChatEvent {
    pub fn new(author: impl Into<String>, text: impl Into<String>, is_privileged: bool) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            is_privileged,
        }
    }
}

/// Receiving half of a chat connection.
#[async_trait]
pub trait ChatSource: Send {
    /// Next chat line, or `None` once the connection has ended.
    ///
    /// Must be cancel safe: the service polls it inside `tokio::select!`.
    async fn recv(&mut self) -> Result<Option<ChatEvent>, Error>;
}

/// Sending half of a chat connection.
#[async_trait]
pub trait ChatSink: Send {
    async fn send(&mut self, message: &Outbound) -> Result<(), Error>;
}
