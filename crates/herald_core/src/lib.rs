//! Herald Core - prefix commands and message collectors
//!
//! This crate turns chat gateway events into matched commands with parsed
//! flags, and lets command handlers wait for follow-up messages. It knows
//! nothing about any particular chat service; adapters implement
//! [`Gateway`] and feed [`GatewayEvent`]s to a [`Dispatcher`].

pub mod args;
pub mod bus;
pub mod collector;
pub mod command;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod embed;
pub mod error;
pub mod gateway;
pub mod parser;
pub mod prefix;
pub mod registry;

// sendf!, embedf!, editf! and edit_embedf! are exported at the crate root

pub use args::{ArgSpec, ParsedArg};
pub use bus::{MessageBus, ReactionBus, ReactionChange};
pub use collector::{CollectorScope, CollectorState, Filter, MessageCollector, Trigger, filters};
pub use command::Command;
pub use config::{BotConfig, BotOptions};
pub use context::Context;
pub use dispatcher::{DispatchOutcome, Dispatcher, Listener};
pub use embed::Embed;
pub use error::{HeraldError, Result};
pub use gateway::{
    Author, ChannelId, ChannelKind, Gateway, GatewayEvent, GuildId, IncomingMessage, MessageId,
    ReactionEvent, ReadyEvent, SentMessage, UserId,
};
pub use parser::ParsedArgs;
pub use prefix::PrefixSet;
pub use registry::CommandRegistry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ArgSpec, BotOptions, CollectorScope, Command, CommandRegistry, Context, Embed, HeraldError,
        Listener, MessageCollector, ParsedArgs, Result, edit_embedf, editf, embedf, filters,
        sendf,
    };
}
