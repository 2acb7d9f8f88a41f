use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{
    BotOptions, CommandRegistry, DispatchOutcome, Dispatcher, GatewayEvent, HeraldError, Listener,
};
use serenity::all::{
    Client, Context, EventHandler, GatewayIntents, Http, Message, Reaction, Ready, ShardManager,
};
use tracing::{info, trace, warn};

use crate::{
    convert,
    error::{DiscordError, Result},
    gateway::DiscordGateway,
};

/// Forwards serenity events to the dispatcher
///
/// Serenity runs each event on its own task, so a handler waiting in a
/// collector doesn't hold up the message it is waiting for.
struct EventForwarder {
    dispatcher: Arc<Dispatcher>,
}

impl EventForwarder {
    async fn forward(&self, event: GatewayEvent) {
        let outcome = self.dispatcher.handle_event(event).await;
        trace!(?outcome, "Event dispatched");
    }
}

#[async_trait]
impl EventHandler for EventForwarder {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.forward(GatewayEvent::Ready(convert::ready_event(&ready)))
            .await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let outcome = self
            .dispatcher
            .handle_message(convert::incoming_message(&msg))
            .await;
        if let DispatchOutcome::HandlerFailed { command } = outcome {
            warn!(%command, channel = %msg.channel_id, "Command did not complete");
        }
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        self.forward(GatewayEvent::ReactionAdded(convert::reaction_event(
            &reaction,
        )))
        .await;
    }

    async fn reaction_remove(&self, _ctx: Context, reaction: Reaction) {
        self.forward(GatewayEvent::ReactionRemoved(convert::reaction_event(
            &reaction,
        )))
        .await;
    }
}

/// A Discord bot driven by a herald dispatcher
pub struct DiscordBot {
    client: Client,
    dispatcher: Arc<Dispatcher>,
}

impl DiscordBot {
    /// Validate the options and build the client; nothing connects yet
    pub async fn new(
        options: BotOptions,
        registry: Arc<CommandRegistry>,
        listeners: Vec<Listener>,
    ) -> Result<Self> {
        let dispatcher = Self::dispatcher_for(options, registry, listeners)?;
        let token = dispatcher.options().token.clone();
        let intents = GatewayIntents::from_bits_truncate(dispatcher.options().intents);

        let client = Client::builder(&token, intents)
            .event_handler(EventForwarder {
                dispatcher: Arc::clone(&dispatcher),
            })
            .await
            .map_err(|cause| DiscordError::ClientBuild { cause })?;

        Ok(Self { client, dispatcher })
    }

    fn dispatcher_for(
        options: BotOptions,
        registry: Arc<CommandRegistry>,
        listeners: Vec<Listener>,
    ) -> Result<Arc<Dispatcher>> {
        options.validate()?;
        if registry.is_empty() && listeners.is_empty() {
            return Err(HeraldError::configuration(
                "handlers",
                "register at least one command or event listener",
            )
            .into());
        }

        let http = Arc::new(Http::new(&options.token));
        let gateway = Arc::new(DiscordGateway::new(http));
        Ok(Arc::new(
            Dispatcher::new(gateway, registry, options).with_listeners(listeners),
        ))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn shard_manager(&self) -> Arc<ShardManager> {
        Arc::clone(&self.client.shard_manager)
    }

    /// Connect and run until the gateway closes
    pub async fn start(&mut self) -> Result<()> {
        info!(
            commands = self.dispatcher.registry().len(),
            prefixes = ?self.dispatcher.prefixes().snapshot(),
            "Starting Discord client"
        );
        self.client
            .start()
            .await
            .map_err(|cause| DiscordError::ClientStart { cause })
    }

    /// Close every shard; `start` returns afterwards
    pub async fn shutdown(&self) {
        info!("Closing Discord gateway");
        self.client.shard_manager.shutdown_all().await;
    }

    /// Run until Ctrl-C or SIGTERM, then close the gateway
    pub async fn run_until_signal(mut self) -> Result<()> {
        let shard_manager = self.shard_manager();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            shard_manager.shutdown_all().await;
        });

        self.start().await
    }
}

impl std::fmt::Debug for DiscordBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordBot")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Couldn't listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Couldn't listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
