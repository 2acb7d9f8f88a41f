mod commands;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use herald_core::{
    BotConfig, CommandRegistry,
    config::{self, TOKEN_ENV},
};
use herald_discord::DiscordBot;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::output::Output;

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Prefix command bot for Discord")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Extra command prefix (repeatable, added after configured ones)
    #[arg(long, short = 'p')]
    prefix: Vec<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and run the demo bot (default)
    Run,
    /// List the demo bot's commands
    Commands,
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "herald.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    let _log_guard = init_tracing(cli.debug, cli.log_file.as_deref()).into_diagnostic()?;

    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        info!("Loading config from standard locations");
        config::load_config_from_standard_locations().await?
    };
    for prefix in &cli.prefix {
        if !config.prefixes.contains(prefix) {
            config.prefixes.push(prefix.clone());
        }
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            config.apply_env();
            run(config).await?
        }
        Commands::Commands => list_commands()?,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => {
                config.apply_env();
                show_config(&config)?
            }
            // Env token stays out of the saved file
            ConfigCommands::Save { path } => save_config(&config, &path).await?,
        },
    }

    Ok(())
}

fn init_tracing(
    debug: bool,
    log_dir: Option<&Path>,
) -> std::io::Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            // Only show debug output from herald crates
            EnvFilter::new("herald_core=debug,herald_discord=debug,herald=debug,serenity=info,warn")
        } else {
            EnvFilter::new("herald_core=info,herald_discord=info,herald=info,warn")
        }
    });

    let console = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(fmt::time::LocalTime::rfc_3339())
        .compact();

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "herald.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

async fn run(config: BotConfig) -> Result<()> {
    let output = Output::new();
    let options = config.into_options();

    let registry = Arc::new(CommandRegistry::new());
    registry.register_all(commands::demo_commands())?;
    registry.log_loaded();

    output.section("Herald");
    output.info("Prefixes:", &options.prefixes.join("  "));
    output.commands(registry.commands().iter().map(|c| c.as_ref()));
    println!();

    let bot = DiscordBot::new(options, registry, commands::demo_listeners()).await?;
    output.status("Connecting to Discord, press Ctrl-C to stop");
    bot.run_until_signal().await?;

    output.success("Gateway closed");
    Ok(())
}

fn list_commands() -> Result<()> {
    let output = Output::new();
    let registry = CommandRegistry::new();
    registry.register_all(commands::demo_commands())?;

    output.section("Commands");
    output.commands(registry.commands().iter().map(|c| c.as_ref()));
    Ok(())
}

fn show_config(config: &BotConfig) -> Result<()> {
    let output = Output::new();
    output.section("Current Configuration");
    println!();

    let mut shown = config.clone();
    if !shown.token.is_empty() {
        shown.token = "<redacted>".to_string();
    }
    println!("{}", toml::to_string_pretty(&shown).into_diagnostic()?);

    if config.token.is_empty() {
        output.status(&format!("No token set; add one to the file or export {}", TOKEN_ENV));
    }
    Ok(())
}

async fn save_config(config: &BotConfig, path: &Path) -> Result<()> {
    let output = Output::new();
    output.info("💾", &format!("Saving configuration to: {}", path.display()));

    config::save_config(config, path).await?;

    output.success("Configuration saved successfully!");
    println!();
    println!("To use this configuration, run:");
    println!("  {} --config {}", "herald".bright_green(), path.display());
    Ok(())
}
