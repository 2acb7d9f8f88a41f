//! The seam to the chat gateway
//!
//! Herald never talks to the network itself. A gateway adapter (see
//! `herald-discord`) converts its native events into [`GatewayEvent`]s and
//! implements [`Gateway`] for the handful of outbound calls command handlers
//! need.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, embed::Embed};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake!(
    /// Chat channel reference
    ChannelId
);
snowflake!(
    /// User (or bot) reference
    UserId
);
snowflake!(
    /// Message reference
    MessageId
);
snowflake!(
    /// Guild (server) reference
    GuildId
);

/// How the gateway classifies a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// A text channel inside a guild
    Guild,
    /// A one-to-one direct message channel
    Direct,
    /// Anything else (group DMs, threads the adapter can't classify, ...)
    Other,
}

/// Author of an inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
            avatar_url: None,
        }
    }

    pub fn bot(mut self) -> Self {
        self.bot = true;
        self
    }
}

/// A message-created event as seen by the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: Author,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        author: Author,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            guild_id: None,
            author,
            content: content.into(),
            timestamp,
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

/// A reaction added to or removed from a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub user_id: Option<UserId>,
    pub guild_id: Option<GuildId>,
    /// Unicode emoji or the adapter's rendering of a custom emoji
    pub emoji: String,
}

/// The gateway reports the bot's own identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyEvent {
    pub user_id: UserId,
    pub username: String,
}

/// Every inbound event kind the dispatcher understands
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(ReadyEvent),
    MessageCreated(IncomingMessage),
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
}

/// Handle to a message the bot sent, for later edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
}

/// Outbound calls a gateway adapter has to provide
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a plain text message
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<SentMessage>;

    /// Send a message consisting of a single embed
    async fn send_embed(&self, channel_id: ChannelId, embed: &Embed) -> Result<SentMessage>;

    /// Replace the text of a message the bot sent earlier
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<SentMessage>;

    /// Replace the embed of a message the bot sent earlier
    async fn edit_embed(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: &Embed,
    ) -> Result<SentMessage>;

    /// Classify a channel, used to keep commands out of direct messages
    async fn channel_kind(&self, channel_id: ChannelId) -> Result<ChannelKind>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_display() {
        assert_eq!(ChannelId(42).to_string(), "42");
        assert_eq!(UserId::from(7).0, 7);
    }

    #[test]
    fn test_incoming_message_builder() {
        let now = Utc::now();
        let msg = IncomingMessage::new(1, 2, Author::new(3, "ana").bot(), "!ping", now).in_guild(4);

        assert_eq!(msg.channel_id, ChannelId(2));
        assert_eq!(msg.guild_id, Some(GuildId(4)));
        assert!(msg.author.bot);
        assert_eq!(msg.timestamp, now);
    }
}
