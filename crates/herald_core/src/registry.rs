use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::{HeraldError, Result, command::Command, prefix::strip_prefix_ignore_case};

#[derive(Default)]
struct Tables {
    names: HashMap<String, Arc<Command>>,
    aliases: HashMap<String, Arc<Command>>,
}

impl Tables {
    fn owner_of(&self, key: &str) -> Option<&Arc<Command>> {
        self.names.get(key).or_else(|| self.aliases.get(key))
    }
}

/// Name and alias lookup for registered commands
///
/// Names and aliases share one case-insensitive namespace. A command is stored
/// once and every key maps to the same `Arc`.
#[derive(Default)]
pub struct CommandRegistry {
    tables: RwLock<Tables>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name and every alias
    ///
    /// Nothing is inserted when any key is already taken.
    pub fn register(&self, command: Command) -> Result<()> {
        let mut tables = self.tables.write();

        let name_key = command.name().to_lowercase();
        if let Some(existing) = tables.owner_of(&name_key) {
            return Err(HeraldError::DuplicateCommand {
                name: command.name().to_string(),
                existing: existing.name().to_string(),
            });
        }

        let mut alias_keys: Vec<String> = Vec::with_capacity(command.alias_names().len());
        for alias in command.alias_names() {
            let key = alias.to_lowercase();
            let existing = tables
                .owner_of(&key)
                .map(|c| c.name().to_string())
                .or_else(|| {
                    (key == name_key || alias_keys.contains(&key))
                        .then(|| command.name().to_string())
                });

            if let Some(existing) = existing {
                return Err(HeraldError::DuplicateAlias {
                    alias: alias.clone(),
                    command: command.name().to_string(),
                    existing,
                });
            }
            alias_keys.push(key);
        }

        let command = Arc::new(command);
        for key in alias_keys {
            tables.aliases.insert(key, Arc::clone(&command));
        }
        tables.names.insert(name_key, command);
        Ok(())
    }

    /// Register commands in order, stopping at the first failure
    ///
    /// Commands registered before the failure stay registered.
    pub fn register_all(&self, commands: impl IntoIterator<Item = Command>) -> Result<()> {
        for command in commands {
            self.register(command)?;
        }
        Ok(())
    }

    /// Look up a command by name, then by alias
    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        let key = name.to_lowercase();
        let tables = self.tables.read();
        tables.owner_of(&key).cloned()
    }

    /// Find the command invoked by `content`, which starts with `prefix`
    pub fn resolve(&self, prefix: &str, content: &str) -> Result<Arc<Command>> {
        let rest = strip_prefix_ignore_case(content, prefix).unwrap_or(content);
        let token = rest.split_whitespace().next().unwrap_or_default();

        self.get(token).ok_or_else(|| HeraldError::CommandNotFound {
            name: token.to_string(),
        })
    }

    /// Registered commands, sorted by name
    pub fn commands(&self) -> Vec<Arc<Command>> {
        let tables = self.tables.read();
        let mut commands: Vec<_> = tables.names.values().cloned().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    pub fn len(&self) -> usize {
        self.tables.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().names.is_empty()
    }

    pub fn log_loaded(&self) {
        let commands = self.commands();
        for command in &commands {
            info!(
                command = command.name(),
                aliases = command.alias_names().len(),
                "Loaded command"
            );
        }
        info!("{} commands loaded", commands.len());
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("CommandRegistry")
            .field("names", &tables.names.keys().collect::<Vec<_>>())
            .field("aliases", &tables.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}
