//! Routes gateway events to commands, listeners and the buses

use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    bus::{MessageBus, ReactionBus, ReactionChange},
    config::BotOptions,
    context::Context,
    gateway::{
        ChannelKind, Gateway, GatewayEvent, IncomingMessage, ReactionEvent, ReadyEvent, UserId,
    },
    prefix::PrefixSet,
    registry::CommandRegistry,
};

type ListenerFn<E> = Arc<dyn Fn(E) -> BoxFuture<'static, ()> + Send + Sync>;

fn boxed<E, F, Fut>(f: F) -> ListenerFn<E>
where
    E: 'static,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |event| f(event).boxed())
}

/// Extra event callback, run alongside command routing
#[derive(Clone)]
pub enum Listener {
    Ready(ListenerFn<ReadyEvent>),
    MessageCreated(ListenerFn<Arc<IncomingMessage>>),
    ReactionAdded(ListenerFn<ReactionEvent>),
    ReactionRemoved(ListenerFn<ReactionEvent>),
}

impl Listener {
    pub fn ready<F, Fut>(f: F) -> Self
    where
        F: Fn(ReadyEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Ready(boxed(f))
    }

    pub fn message_created<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<IncomingMessage>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::MessageCreated(boxed(f))
    }

    pub fn reaction_added<F, Fut>(f: F) -> Self
    where
        F: Fn(ReactionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::ReactionAdded(boxed(f))
    }

    pub fn reaction_removed<F, Fut>(f: F) -> Self
    where
        F: Fn(ReactionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::ReactionRemoved(boxed(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::MessageCreated(_) => "message_created",
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Listener").field(&self.kind()).finish()
    }
}

/// What the dispatcher did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Bot identity recorded and mention prefixes added
    Ready,
    /// Reaction forwarded to listeners and the reaction bus
    Reaction,
    /// Own message, bot message or empty content
    Ignored,
    /// No prefix; handed to collectors
    Published,
    /// Prefix present but no such command
    Unmatched,
    /// Command sent outside a guild
    DirectMessage,
    /// The channel could not be classified
    ChannelUnavailable,
    Handled { command: String },
    HandlerFailed { command: String },
}

pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    registry: Arc<CommandRegistry>,
    prefixes: Arc<PrefixSet>,
    options: Arc<BotOptions>,
    listeners: Vec<Listener>,
    messages: MessageBus,
    reactions: ReactionBus,
    bot_id: RwLock<Option<UserId>>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        registry: Arc<CommandRegistry>,
        options: BotOptions,
    ) -> Self {
        Self {
            gateway,
            registry,
            prefixes: Arc::new(PrefixSet::new(options.prefixes.iter().cloned())),
            messages: MessageBus::new(options.bus_capacity),
            reactions: ReactionBus::new(options.bus_capacity),
            options: Arc::new(options),
            listeners: Vec::new(),
            bot_id: RwLock::new(None),
        }
    }

    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_listeners(mut self, listeners: impl IntoIterator<Item = Listener>) -> Self {
        self.listeners.extend(listeners);
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn prefixes(&self) -> &Arc<PrefixSet> {
        &self.prefixes
    }

    pub fn options(&self) -> &Arc<BotOptions> {
        &self.options
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn message_bus(&self) -> &MessageBus {
        &self.messages
    }

    pub fn reaction_bus(&self) -> &ReactionBus {
        &self.reactions
    }

    pub fn bot_id(&self) -> Option<UserId> {
        *self.bot_id.read()
    }

    pub async fn handle_event(&self, event: GatewayEvent) -> DispatchOutcome {
        match event {
            GatewayEvent::Ready(ready) => {
                self.handle_ready(ready).await;
                DispatchOutcome::Ready
            }
            GatewayEvent::MessageCreated(message) => self.handle_message(message).await,
            GatewayEvent::ReactionAdded(reaction) => {
                self.handle_reaction(ReactionChange::Added(reaction)).await;
                DispatchOutcome::Reaction
            }
            GatewayEvent::ReactionRemoved(reaction) => {
                self.handle_reaction(ReactionChange::Removed(reaction)).await;
                DispatchOutcome::Reaction
            }
        }
    }

    pub async fn handle_ready(&self, ready: ReadyEvent) {
        *self.bot_id.write() = Some(ready.user_id);
        self.prefixes.add_mention_prefixes(ready.user_id);
        info!(
            user = %ready.username,
            id = %ready.user_id,
            prefixes = ?self.prefixes.snapshot(),
            "Gateway ready"
        );

        for listener in &self.listeners {
            if let Listener::Ready(f) = listener {
                f(ready.clone()).await;
            }
        }
    }

    pub async fn handle_message(&self, message: IncomingMessage) -> DispatchOutcome {
        let message = Arc::new(message);

        for listener in &self.listeners {
            if let Listener::MessageCreated(f) = listener {
                f(Arc::clone(&message)).await;
            }
        }

        if self.should_ignore(&message) {
            return DispatchOutcome::Ignored;
        }

        let prefix = match self.prefixes.select(&message.content) {
            Ok(prefix) => prefix,
            Err(_) => {
                let receivers = self.messages.publish(Arc::clone(&message));
                debug!(
                    message = %message.id,
                    receivers, "No prefix, published to collectors"
                );
                return DispatchOutcome::Published;
            }
        };

        let command = match self.registry.resolve(&prefix, &message.content) {
            Ok(command) => command,
            Err(e) => {
                debug!(message = %message.id, error = %e, "Dropping unmatched command");
                return DispatchOutcome::Unmatched;
            }
        };

        match self.gateway.channel_kind(message.channel_id).await {
            Ok(ChannelKind::Direct) => {
                debug!(command = command.name(), "Ignoring command sent in a direct message");
                return DispatchOutcome::DirectMessage;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(channel = %message.channel_id, error = %e, "Couldn't look up channel");
                return DispatchOutcome::ChannelUnavailable;
            }
        }

        let name = command.name().to_string();
        let ctx = Context::new(
            Arc::clone(&self.gateway),
            Arc::clone(&message),
            Arc::clone(&command),
            prefix,
            Arc::clone(&self.options),
            self.messages.clone(),
        );

        debug!(command = %name, author = %message.author.name, "Running command");
        match command.invoke(ctx).await {
            Ok(()) => DispatchOutcome::Handled { command: name },
            Err(e) => {
                warn!(command = %name, error = ?e, "Command handler failed");
                DispatchOutcome::HandlerFailed { command: name }
            }
        }
    }

    pub async fn handle_reaction(&self, change: ReactionChange) {
        for listener in &self.listeners {
            match (listener, &change) {
                (Listener::ReactionAdded(f), ReactionChange::Added(event))
                | (Listener::ReactionRemoved(f), ReactionChange::Removed(event)) => {
                    f(event.clone()).await;
                }
                _ => {}
            }
        }
        self.reactions.publish(change);
    }

    fn should_ignore(&self, message: &IncomingMessage) -> bool {
        if message.content.is_empty() {
            return true;
        }
        if self.bot_id().is_some_and(|id| id == message.author.id) {
            return true;
        }
        self.options.ignore_bots && message.author.bot
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("prefixes", &self.prefixes)
            .field("listeners", &self.listeners)
            .field("bot_id", &self.bot_id())
            .finish_non_exhaustive()
    }
}
