use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    HeraldError, Result,
    bus::{DEFAULT_BUS_CAPACITY, MAX_BUS_CAPACITY},
    error::ConfigError,
};

/// Environment variable that overrides the configured token
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// GUILDS, GUILD_MESSAGES, GUILD_MESSAGE_REACTIONS, DIRECT_MESSAGES,
/// DIRECT_MESSAGE_REACTIONS and MESSAGE_CONTENT
pub const DEFAULT_INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 10) | (1 << 12) | (1 << 13) | (1 << 15);

/// On-disk bot configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Single-prefix form from older config files, folded into `prefixes`
    #[serde(default, skip_serializing)]
    pub prefix: Option<String>,

    #[serde(default = "default_intents")]
    pub intents: u64,

    #[serde(default = "default_true")]
    pub ignore_bots: bool,

    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_intents() -> u64 {
    DEFAULT_INTENTS
}

fn default_true() -> bool {
    true
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefixes: Vec::new(),
            prefix: None,
            intents: DEFAULT_INTENTS,
            ignore_bots: true,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &redact(&self.token))
            .field("prefixes", &self.prefixes)
            .field("prefix", &self.prefix)
            .field("intents", &self.intents)
            .field("ignore_bots", &self.ignore_bots)
            .field("bus_capacity", &self.bus_capacity)
            .finish()
    }
}

impl BotConfig {
    pub async fn load() -> Result<Self> {
        load_config_from_standard_locations().await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        load_config(path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        save_config(self, path).await
    }

    /// Let `DISCORD_TOKEN` win over the file
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.token = token;
            }
        }
    }

    /// Move the legacy `prefix` key to the front of `prefixes`
    pub fn normalize(&mut self) {
        if let Some(prefix) = self.prefix.take() {
            if !prefix.is_empty() && !self.prefixes.contains(&prefix) {
                self.prefixes.insert(0, prefix);
            }
        }
    }

    pub fn into_options(mut self) -> BotOptions {
        self.normalize();
        BotOptions {
            token: self.token,
            prefixes: self.prefixes,
            intents: self.intents,
            ignore_bots: self.ignore_bots,
            bus_capacity: self.bus_capacity,
        }
    }
}

/// Runtime options shared with every command invocation
#[derive(Clone, PartialEq, Eq)]
pub struct BotOptions {
    pub token: String,
    pub prefixes: Vec<String>,
    pub intents: u64,
    pub ignore_bots: bool,
    pub bus_capacity: usize,
}

impl Default for BotOptions {
    fn default() -> Self {
        BotConfig::default().into_options()
    }
}

impl fmt::Debug for BotOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotOptions")
            .field("token", &redact(&self.token))
            .field("prefixes", &self.prefixes)
            .field("intents", &self.intents)
            .field("ignore_bots", &self.ignore_bots)
            .field("bus_capacity", &self.bus_capacity)
            .finish()
    }
}

impl BotOptions {
    /// Reject options the bot can't start with
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(HeraldError::configuration(
                "token",
                format!("no token given; set it in the config file or {}", TOKEN_ENV),
            ));
        }
        if self.prefixes.iter().all(|p| p.is_empty()) {
            return Err(HeraldError::configuration(
                "prefixes",
                "at least one non-empty prefix is required",
            ));
        }
        if self.intents == 0 {
            return Err(HeraldError::configuration(
                "intents",
                "no gateway intents requested",
            ));
        }
        if self.bus_capacity == 0 || self.bus_capacity > MAX_BUS_CAPACITY {
            return Err(HeraldError::configuration(
                "bus_capacity",
                format!("must be between 1 and {}", MAX_BUS_CAPACITY),
            ));
        }
        Ok(())
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<unset>" } else { "<redacted>" }
}

pub async fn load_config(path: &Path) -> Result<BotConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HeraldError::ConfigFile {
            config_path: path.display().to_string(),
            expected: "readable TOML file".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })?;

    let mut config: BotConfig =
        toml::from_str(&content).map_err(|e| HeraldError::ConfigFile {
            config_path: path.display().to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: ConfigError::TomlParse(e.to_string()),
        })?;

    config.normalize();
    Ok(config)
}

pub async fn save_config(config: &BotConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| HeraldError::ConfigFile {
                config_path: parent.display().to_string(),
                expected: "writable directory".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;
    }

    let mut config = config.clone();
    config.normalize();
    let content = toml::to_string_pretty(&config).map_err(|e| HeraldError::ConfigFile {
        config_path: path.display().to_string(),
        expected: "serializable configuration".to_string(),
        cause: ConfigError::TomlSerialize(e.to_string()),
    })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| HeraldError::ConfigFile {
            config_path: path.display().to_string(),
            expected: "writable file".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })
}

/// Candidate config files, most specific first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("herald.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("herald").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".herald").join("config.toml"));
    }

    paths
}

/// Load the first config file that exists, or the defaults
pub async fn load_config_from_standard_locations() -> Result<BotConfig> {
    for path in config_paths() {
        if path.exists() {
            return load_config(&path).await;
        }
    }

    Ok(BotConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid() -> BotOptions {
        BotOptions {
            token: "abc".to_string(),
            prefixes: vec!["-".to_string()],
            ..BotOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config: BotConfig = toml::from_str("token = \"t\"").unwrap();
        assert_eq!(config.intents, DEFAULT_INTENTS);
        assert!(config.ignore_bots);
        assert_eq!(config.bus_capacity, DEFAULT_BUS_CAPACITY);
        assert!(config.prefixes.is_empty());
    }

    #[test]
    fn test_legacy_prefix_folded() {
        let mut config: BotConfig =
            toml::from_str("prefix = \"-\"\nprefixes = [\"!\", \"-\"]").unwrap();
        config.normalize();
        assert_eq!(config.prefixes, vec!["!".to_string(), "-".to_string()]);

        let options: BotOptions = toml::from_str::<BotConfig>("prefix = \"?\"")
            .unwrap()
            .into_options();
        assert_eq!(options.prefixes, vec!["?".to_string()]);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let no_token = BotOptions {
            token: "  ".to_string(),
            ..valid()
        };
        assert!(matches!(
            no_token.validate(),
            Err(HeraldError::Configuration { ref field, .. }) if field == "token"
        ));

        let no_prefix = BotOptions {
            prefixes: vec![String::new()],
            ..valid()
        };
        assert!(no_prefix.validate().is_err());

        let no_intents = BotOptions {
            intents: 0,
            ..valid()
        };
        assert!(no_intents.validate().is_err());
    }

    #[test]
    fn test_validate_bus_capacity() {
        for capacity in [0, MAX_BUS_CAPACITY + 1, usize::MAX] {
            let options = BotOptions {
                bus_capacity: capacity,
                ..valid()
            };
            assert!(matches!(
                options.validate(),
                Err(HeraldError::Configuration { ref field, .. }) if field == "bus_capacity"
            ));
        }

        let largest = BotOptions {
            bus_capacity: MAX_BUS_CAPACITY,
            ..valid()
        };
        assert!(largest.validate().is_ok());

        let config: BotConfig =
            toml::from_str("token = \"t\"\nprefixes = [\"-\"]\nbus_capacity = 99999999999").unwrap();
        assert!(matches!(
            config.into_options().validate(),
            Err(HeraldError::Configuration { ref field, .. }) if field == "bus_capacity"
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let output = format!("{:?}", valid());
        assert!(!output.contains("abc"));
        assert!(output.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("herald.toml");

        let config = BotConfig {
            token: "secret".to_string(),
            prefix: Some("-".to_string()),
            ignore_bots: false,
            ..BotConfig::default()
        };
        save_config(&config, &path).await.unwrap();

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.token, "secret");
        assert_eq!(loaded.prefixes, vec!["-".to_string()]);
        assert_eq!(loaded.prefix, None);
        assert!(!loaded.ignore_bots);
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            load_config(&missing).await,
            Err(HeraldError::ConfigFile {
                cause: ConfigError::Io(_),
                ..
            })
        ));

        let broken = dir.path().join("broken.toml");
        tokio::fs::write(&broken, "token = ").await.unwrap();
        assert!(matches!(
            load_config(&broken).await,
            Err(HeraldError::ConfigFile {
                cause: ConfigError::TomlParse(_),
                ..
            })
        ));
    }

    #[test]
    fn test_config_paths_start_local() {
        assert_eq!(config_paths()[0], PathBuf::from("herald.toml"));
    }
}
