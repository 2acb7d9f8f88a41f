use parking_lot::RwLock;

use crate::{HeraldError, Result, gateway::UserId};

/// Ordered prefixes a command message may start with
///
/// First registered match wins; there is no longest-match rule.
#[derive(Debug, Default)]
pub struct PrefixSet {
    prefixes: RwLock<Vec<String>>,
}

impl PrefixSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: RwLock::new(prefixes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn push(&self, prefix: impl Into<String>) {
        self.prefixes.write().push(prefix.into());
    }

    /// Append `<@ID> ` and `<@!ID> ` so mentioning the bot works as a prefix
    pub fn add_mention_prefixes(&self, bot_id: UserId) {
        let mut prefixes = self.prefixes.write();
        for mention in [format!("<@{}> ", bot_id), format!("<@!{}> ", bot_id)] {
            if !prefixes.contains(&mention) {
                prefixes.push(mention);
            }
        }
    }

    /// The first prefix `content` starts with, compared case-insensitively
    pub fn select(&self, content: &str) -> Result<String> {
        if content.is_empty() {
            return Err(HeraldError::NoPrefixFound);
        }

        self.prefixes
            .read()
            .iter()
            .find(|prefix| strip_prefix_ignore_case(content, prefix).is_some())
            .cloned()
            .ok_or(HeraldError::NoPrefixFound)
    }

    /// The primary prefix, used when rendering help pages
    pub fn first(&self) -> Option<String> {
        self.prefixes.read().first().cloned()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.prefixes.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.read().is_empty()
    }
}

/// `content` with `prefix` removed, if it starts with it ignoring case
pub(crate) fn strip_prefix_ignore_case<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = content.get(..prefix.len())?;
    (head.to_lowercase() == prefix.to_lowercase()).then(|| &content[prefix.len()..])
}
