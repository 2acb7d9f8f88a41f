//! The demo bot's commands and listeners

use std::time::Duration;

use herald_core::prelude::*;
use tracing::{debug, info};

pub fn demo_commands() -> Vec<Command> {
    vec![ping(), ping2()]
}

pub fn demo_listeners() -> Vec<Listener> {
    vec![Listener::ready(|ready| async move {
        info!(user = %ready.username, id = %ready.user_id, "Bot is ready");
    })]
}

/// `ping [add <value>] [rm <value>]`
fn ping() -> Command {
    Command::new("ping")
        .alias("pong")
        .arg(ArgSpec::value("add"))
        .arg(ArgSpec::value("rm"))
        .example("-ping add 5")
        .description("standard ping-pong command")
        .handler(|ctx| async move {
            let args = match ctx.parse_args() {
                Ok(args) => args,
                Err(HeraldError::NoArgsFound { .. }) => {
                    ctx.send("No args").await;
                    return Ok(());
                }
                Err(e) => return Err(miette::Report::new(e)),
            };

            if !args.has_value("add") {
                ctx.send("No").await;
                return Ok(());
            }

            for (name, arg) in args.iter() {
                debug!(name, value = %arg.value, has_value = arg.has_value, "Parsed argument");
            }
            ctx.send("Pong").await;
            Ok(())
        })
}

/// Replies, then waits five seconds for a number
fn ping2() -> Command {
    Command::new("ping2")
        .alias("pong2")
        .example("-ping2")
        .description("ping-pong that waits for a number")
        .handler(|ctx| async move {
            ctx.send("Pong2").await;

            let mut collector = MessageCollector::new(Duration::from_secs(5))
                .filter(filters::is_number)
                .end_after(1);

            if let Err(e) = collector.collect(&ctx).await {
                ctx.send(e.to_string()).await;
                return Ok(());
            }

            if let Some(reply) = collector.collected().first() {
                sendf!(ctx, "You said {}", reply.content).await;
            }
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_demo_commands_register() {
        let registry = CommandRegistry::new();
        registry.register_all(demo_commands()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("pong").unwrap().name(), "ping");
        assert_eq!(registry.get("PONG2").unwrap().name(), "ping2");
    }

    #[test]
    fn test_ping_declares_value_flags() {
        let ping = ping();
        let names: Vec<_> = ping.args().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["add", "rm"]);
        assert!(ping.args().iter().all(|a| a.requires_value && !a.strict));
    }

    #[test]
    fn test_ready_listener_present() {
        assert!(matches!(demo_listeners().as_slice(), [Listener::Ready(_)]));
    }
}
