//! Conversions between serenity models and herald-core types

use chrono::{DateTime, Utc};
use herald_core::{
    Author, ChannelId, Embed, GuildId, IncomingMessage, MessageId, ReactionEvent, ReadyEvent,
    SentMessage, UserId,
};
use serenity::all::{CreateEmbed, CreateEmbedFooter, Message, Reaction, Ready, Timestamp};

pub fn incoming_message(msg: &Message) -> IncomingMessage {
    let author = Author {
        id: UserId(msg.author.id.get()),
        name: msg.author.name.clone(),
        bot: msg.author.bot,
        avatar_url: msg.author.avatar_url(),
    };

    let mut message = IncomingMessage::new(
        MessageId(msg.id.get()),
        ChannelId(msg.channel_id.get()),
        author,
        msg.content.clone(),
        timestamp(&msg.timestamp),
    );
    if let Some(guild_id) = msg.guild_id {
        message = message.in_guild(GuildId(guild_id.get()));
    }
    message
}

pub fn reaction_event(reaction: &Reaction) -> ReactionEvent {
    ReactionEvent {
        channel_id: ChannelId(reaction.channel_id.get()),
        message_id: MessageId(reaction.message_id.get()),
        user_id: reaction.user_id.map(|id| UserId(id.get())),
        guild_id: reaction.guild_id.map(|id| GuildId(id.get())),
        emoji: reaction.emoji.to_string(),
    }
}

pub fn ready_event(ready: &Ready) -> ReadyEvent {
    ReadyEvent {
        user_id: UserId(ready.user.id.get()),
        username: ready.user.name.clone(),
    }
}

pub fn sent_message(msg: &Message) -> SentMessage {
    SentMessage {
        id: MessageId(msg.id.get()),
        channel_id: ChannelId(msg.channel_id.get()),
    }
}

/// Serenity renders timestamps as RFC 3339
pub fn timestamp(ts: &Timestamp) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&ts.to_string())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| DateTime::from_timestamp(ts.unix_timestamp(), 0))
        .unwrap_or_else(Utc::now)
}

pub fn create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .description(&embed.description)
        .colour(embed.colour);

    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }

    if let Some(footer) = &embed.footer {
        let mut create_footer = CreateEmbedFooter::new(&footer.text);
        if let Some(icon_url) = &footer.icon_url {
            create_footer = create_footer.icon_url(icon_url);
        }
        builder = builder.footer(create_footer);
    }

    builder
}
