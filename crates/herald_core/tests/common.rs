#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{
    Author, BotOptions, ChannelId, ChannelKind, Embed, Gateway, IncomingMessage, MessageId, Result,
    SentMessage,
};
use parking_lot::Mutex;

/// What a handler sent through the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(ChannelId, String),
    Embed(ChannelId, String),
    Edit(MessageId, String),
}

/// Gateway that records outbound calls; channel 500 is a DM channel
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
}

pub const DM_CHANNEL: ChannelId = ChannelId(500);

impl RecordingGateway {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    fn record(&self, sent: Sent, channel_id: ChannelId) -> Result<SentMessage> {
        let mut log = self.sent.lock();
        log.push(sent);
        Ok(SentMessage {
            id: MessageId(log.len() as u64),
            channel_id,
        })
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<SentMessage> {
        self.record(Sent::Text(channel_id, content.to_string()), channel_id)
    }

    async fn send_embed(&self, channel_id: ChannelId, embed: &Embed) -> Result<SentMessage> {
        self.record(Sent::Embed(channel_id, embed.description.clone()), channel_id)
    }

    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<SentMessage> {
        self.record(Sent::Edit(message_id, content.to_string()), channel_id)
    }

    async fn edit_embed(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: &Embed,
    ) -> Result<SentMessage> {
        self.record(Sent::Edit(message_id, embed.description.clone()), channel_id)
    }

    async fn channel_kind(&self, channel_id: ChannelId) -> Result<ChannelKind> {
        Ok(if channel_id == DM_CHANNEL {
            ChannelKind::Direct
        } else {
            ChannelKind::Guild
        })
    }
}

pub fn options(prefixes: &[&str]) -> BotOptions {
    BotOptions {
        token: "test-token".to_string(),
        prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        ..BotOptions::default()
    }
}

pub fn message_at(
    author: u64,
    channel: u64,
    content: &str,
    timestamp: DateTime<Utc>,
) -> IncomingMessage {
    IncomingMessage::new(1, channel, Author::new(author, "ana"), content, timestamp)
}

pub fn shared(message: IncomingMessage) -> Arc<IncomingMessage> {
    Arc::new(message)
}
