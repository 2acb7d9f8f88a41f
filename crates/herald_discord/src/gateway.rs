use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{ChannelId, ChannelKind, Embed, Gateway, MessageId, Result, SentMessage};
use serenity::all::{
    Channel, ChannelType, CreateMessage, EditMessage, Http,
    ChannelId as SerenityChannelId, MessageId as SerenityMessageId,
};

use crate::{
    convert::{create_embed, sent_message},
    error::gateway_error,
};

/// [`Gateway`] backed by serenity's REST client
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

fn channel(id: ChannelId) -> SerenityChannelId {
    SerenityChannelId::new(id.0)
}

fn message(id: MessageId) -> SerenityMessageId {
    SerenityMessageId::new(id.0)
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<SentMessage> {
        channel(channel_id)
            .say(&self.http, content)
            .await
            .map(|msg| sent_message(&msg))
            .map_err(|e| gateway_error("send_message", e))
    }

    async fn send_embed(&self, channel_id: ChannelId, embed: &Embed) -> Result<SentMessage> {
        let builder = CreateMessage::new().embed(create_embed(embed));
        channel(channel_id)
            .send_message(&self.http, builder)
            .await
            .map(|msg| sent_message(&msg))
            .map_err(|e| gateway_error("send_embed", e))
    }

    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<SentMessage> {
        let builder = EditMessage::new().content(content);
        channel(channel_id)
            .edit_message(&self.http, message(message_id), builder)
            .await
            .map(|msg| sent_message(&msg))
            .map_err(|e| gateway_error("edit_message", e))
    }

    async fn edit_embed(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        embed: &Embed,
    ) -> Result<SentMessage> {
        let builder = EditMessage::new().embed(create_embed(embed));
        channel(channel_id)
            .edit_message(&self.http, message(message_id), builder)
            .await
            .map(|msg| sent_message(&msg))
            .map_err(|e| gateway_error("edit_embed", e))
    }

    async fn channel_kind(&self, channel_id: ChannelId) -> Result<ChannelKind> {
        let kind = match channel(channel_id)
            .to_channel(&self.http)
            .await
            .map_err(|e| gateway_error("channel_kind", e))?
        {
            Channel::Guild(_) => ChannelKind::Guild,
            Channel::Private(private) if private.kind == ChannelType::Private => ChannelKind::Direct,
            _ => ChannelKind::Other,
        };
        Ok(kind)
    }
}

impl std::fmt::Debug for DiscordGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordGateway").finish_non_exhaustive()
    }
}
