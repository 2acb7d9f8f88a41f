use herald_core::HeraldError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DiscordError {
    #[error("Failed to build Discord client")]
    #[diagnostic(
        code(herald::discord::client_build),
        help("Check that the token is valid and the requested intents are enabled in the Discord Developer Portal")
    )]
    ClientBuild {
        #[source]
        cause: serenity::Error,
    },

    #[error("Discord client stopped with an error")]
    #[diagnostic(
        code(herald::discord::client_start),
        help("The gateway connection failed or was closed by Discord")
    )]
    ClientStart {
        #[source]
        cause: serenity::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] HeraldError),
}

pub type Result<T> = std::result::Result<T, DiscordError>;

/// Wrap a serenity failure as a core gateway error
pub(crate) fn gateway_error(operation: &str, cause: serenity::Error) -> HeraldError {
    HeraldError::gateway(operation, cause)
}
