use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};

use crate::{args::ArgSpec, context::Context};

/// Boxed async command handler
pub type HandlerFn = Arc<dyn Fn(Context) -> BoxFuture<'static, miette::Result<()>> + Send + Sync>;

/// A prefix command
///
/// Built once at startup and shared behind an `Arc` by the registry; every
/// alias resolves to the same instance.
#[derive(Clone)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    args: Vec<ArgSpec>,
    examples: Vec<String>,
    descriptions: Vec<String>,
    handler: HandlerFn,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            args: Vec::new(),
            examples: Vec::new(),
            descriptions: Vec::new(),
            handler: Arc::new(|_: Context| async { Ok::<(), miette::Report>(()) }.boxed()),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }

    /// Set the async handler run when the command matches
    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = miette::Result<()>> + Send + 'static,
    {
        self.handler = Arc::new(move |ctx| handler(ctx).boxed());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_names(&self) -> &[String] {
        &self.aliases
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    /// Run the handler to completion
    pub async fn invoke(&self, ctx: Context) -> miette::Result<()> {
        (self.handler)(ctx).await
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
