use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;

use crate::{
    Result,
    bus::MessageBus,
    command::Command,
    config::BotOptions,
    embed::Embed,
    gateway::{Author, ChannelId, Gateway, IncomingMessage, SentMessage},
    parser::{self, ParsedArgs},
};

/// Everything a handler gets for one command invocation
///
/// Outbound helpers never fail: errors from the gateway are logged and the
/// helper returns `None`.
#[derive(Clone)]
pub struct Context {
    gateway: Arc<dyn Gateway>,
    message: Arc<IncomingMessage>,
    command: Arc<Command>,
    prefix: String,
    options: Arc<BotOptions>,
    bus: MessageBus,
}

impl Context {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        message: Arc<IncomingMessage>,
        command: Arc<Command>,
        prefix: impl Into<String>,
        options: Arc<BotOptions>,
        bus: MessageBus,
    ) -> Self {
        Self {
            gateway,
            message,
            command,
            prefix: prefix.into(),
            options,
            bus,
        }
    }

    pub fn message(&self) -> &IncomingMessage {
        &self.message
    }

    pub fn author(&self) -> &Author {
        &self.message.author
    }

    pub fn channel_id(&self) -> ChannelId {
        self.message.channel_id
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The prefix this message was matched with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn options(&self) -> &BotOptions {
        &self.options
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Subscribe to prefix-less messages published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<IncomingMessage>> {
        self.bus.subscribe()
    }

    /// The command name or alias the user typed, lowercased
    pub fn invoked_name(&self) -> String {
        parser::invoked_token(&self.prefix, &self.message.content).to_lowercase()
    }

    /// Parse the command's declared flags from the triggering message
    pub fn parse_args(&self) -> Result<ParsedArgs> {
        parser::parse_args(&self.command, &self.prefix, &self.message.content)
    }

    pub async fn send(&self, content: impl AsRef<str>) -> Option<SentMessage> {
        let result = self
            .gateway
            .send_message(self.channel_id(), content.as_ref())
            .await;
        logged("send_message", result)
    }

    /// Send a description-only embed with a random colour
    pub async fn embed(&self, content: impl Into<String>) -> Option<SentMessage> {
        self.send_embed(&Embed::new(content)).await
    }

    pub async fn send_embed(&self, embed: &Embed) -> Option<SentMessage> {
        let result = self.gateway.send_embed(self.channel_id(), embed).await;
        logged("send_embed", result)
    }

    pub async fn edit(&self, message: &SentMessage, content: impl AsRef<str>) -> Option<SentMessage> {
        let result = self
            .gateway
            .edit_message(message.channel_id, message.id, content.as_ref())
            .await;
        logged("edit_message", result)
    }

    /// Replace a sent embed with a new description and colour
    pub async fn edit_embed(
        &self,
        message: &SentMessage,
        content: impl Into<String>,
    ) -> Option<SentMessage> {
        let result = self
            .gateway
            .edit_embed(message.channel_id, message.id, &Embed::new(content))
            .await;
        logged("edit_embed", result)
    }

    /// Report a failure to the invoking channel
    pub async fn err(&self, content: impl Display) -> Option<SentMessage> {
        self.send_embed(&Embed::error(content)).await
    }

    pub async fn send_command_help(&self) -> Option<SentMessage> {
        let prefix = self
            .options
            .prefixes
            .first()
            .map(String::as_str)
            .unwrap_or(&self.prefix);
        let embed = Embed::command_help(
            &self.command,
            prefix,
            self.message.author.avatar_url.clone(),
        );
        self.send_embed(&embed).await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.command.name())
            .field("prefix", &self.prefix)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

fn logged(operation: &str, result: Result<SentMessage>) -> Option<SentMessage> {
    result
        .inspect_err(|e| warn!(operation, error = %e, "Failed to deliver message"))
        .ok()
}

/// Send a formatted message: `sendf!(ctx, "You said {}", content).await`
#[macro_export]
macro_rules! sendf {
    ($ctx:expr, $($arg:tt)*) => {
        $ctx.send(::std::format!($($arg)*))
    };
}

/// Send a formatted description-only embed
#[macro_export]
macro_rules! embedf {
    ($ctx:expr, $($arg:tt)*) => {
        $ctx.embed(::std::format!($($arg)*))
    };
}

/// Edit a sent message with formatted content
#[macro_export]
macro_rules! editf {
    ($ctx:expr, $message:expr, $($arg:tt)*) => {
        $ctx.edit($message, ::std::format!($($arg)*))
    };
}

/// Edit a sent embed with a formatted description
#[macro_export]
macro_rules! edit_embedf {
    ($ctx:expr, $message:expr, $($arg:tt)*) => {
        $ctx.edit_embed($message, ::std::format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HeraldError,
        args::ArgSpec,
        gateway::{MessageId, MockGateway},
    };
    use chrono::Utc;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn context(gateway: MockGateway, content: &str) -> Context {
        let command = Command::new("ping")
            .alias("pong")
            .arg(ArgSpec::value("add"))
            .description("standard ping-pong command")
            .example("-ping");
        let mut author = Author::new(7, "ana");
        author.avatar_url = Some("https://cdn.example/a.png".to_string());
        let message = IncomingMessage::new(1, 10, author, content, Utc::now());
        let options = BotOptions {
            token: "t".to_string(),
            prefixes: vec!["-".to_string(), "!".to_string()],
            ..BotOptions::default()
        };

        Context::new(
            Arc::new(gateway),
            Arc::new(message),
            Arc::new(command),
            "!",
            Arc::new(options),
            MessageBus::new(4),
        )
    }

    fn sent(id: u64) -> SentMessage {
        SentMessage {
            id: MessageId(id),
            channel_id: ChannelId(10),
        }
    }

    #[tokio::test]
    async fn test_send_goes_to_trigger_channel() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .with(eq(ChannelId(10)), eq("You said 42"))
            .times(1)
            .returning(|_, _| Ok(sent(5)));

        let ctx = context(gateway, "!pong");
        let result = sendf!(ctx, "You said {}", 42).await;
        assert_eq!(result, Some(sent(5)));
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Err(HeraldError::gateway("send_message", "boom")));

        let ctx = context(gateway, "!ping");
        assert_eq!(ctx.send("hi").await, None);
    }

    #[tokio::test]
    async fn test_edit_embed_targets_sent_message() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_edit_embed()
            .withf(|channel, message, embed| {
                *channel == ChannelId(10) && *message == MessageId(5) && embed.description == "done"
            })
            .times(1)
            .returning(|_, _, _| Ok(sent(5)));

        let ctx = context(gateway, "!ping");
        assert!(ctx.edit_embed(&sent(5), "done").await.is_some());
    }

    #[tokio::test]
    async fn test_err_embed() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_embed()
            .withf(|_, embed| embed.description.contains("```css\nCollector canceled\n```"))
            .times(1)
            .returning(|_, _| Ok(sent(6)));

        let ctx = context(gateway, "!ping");
        ctx.err(HeraldError::CollectorCancelled).await;
    }

    #[tokio::test]
    async fn test_command_help_uses_primary_prefix() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_embed()
            .withf(|_, embed| {
                embed.description == "`-ping` Command Help"
                    && embed
                        .footer
                        .as_ref()
                        .is_some_and(|f| f.icon_url.as_deref() == Some("https://cdn.example/a.png"))
            })
            .times(1)
            .returning(|_, _| Ok(sent(7)));

        let ctx = context(gateway, "!ping");
        ctx.send_command_help().await;
    }

    #[test]
    fn test_invoked_name_and_args() {
        let ctx = context(MockGateway::new(), "!Pong add 3");
        assert_eq!(ctx.invoked_name(), "pong");
        assert_eq!(ctx.parse_args().unwrap().value("add"), Some("3"));
    }
}
