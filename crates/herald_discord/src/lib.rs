//! Herald Discord - serenity adapter
//!
//! Implements the herald-core [`Gateway`](herald_core::Gateway) over
//! serenity's HTTP client and feeds gateway events into a
//! [`Dispatcher`](herald_core::Dispatcher).

pub mod bot;
pub mod convert;
pub mod error;
pub mod gateway;

pub use bot::DiscordBot;
pub use error::{DiscordError, Result};
pub use gateway::DiscordGateway;

// Re-export serenity for convenience
pub use serenity;
