//! Flag parsing for command messages
//!
//! Tokens are scanned by position: every token is compared against every
//! declared flag, even one already consumed as the value of the flag before
//! it. `"!ping add rm"` with `add <value>` and `rm` declared yields
//! `add = "rm"` *and* `rm` present.

use std::collections::HashMap;

use crate::{
    HeraldError, Result,
    args::ParsedArg,
    command::Command,
    prefix::strip_prefix_ignore_case,
};

/// Flags found in a message, keyed by declared flag name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    args: HashMap<String, ParsedArg>,
}

impl ParsedArgs {
    pub fn get(&self, name: &str) -> Option<&ParsedArg> {
        self.args.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    /// Whether the flag was found and, if it takes one, got a value
    pub fn has_value(&self, name: &str) -> bool {
        self.args.get(name).is_some_and(|arg| arg.has_value)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(ParsedArg::value)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParsedArg)> {
        self.args.iter().map(|(name, arg)| (name.as_str(), arg))
    }
}

/// The command token the user typed, right after the prefix
pub fn invoked_token<'a>(prefix: &str, content: &'a str) -> &'a str {
    strip_prefix_ignore_case(content, prefix)
        .unwrap_or(content)
        .split_whitespace()
        .next()
        .unwrap_or_default()
}

/// Everything after the prefix and the command token
fn remainder<'a>(prefix: &str, content: &'a str) -> &'a str {
    let rest = strip_prefix_ignore_case(content, prefix)
        .unwrap_or(content)
        .trim_start();
    let token = rest.split_whitespace().next().unwrap_or_default();
    rest[token.len()..].trim_start()
}

/// Match the command's declared flags against the message text
pub fn parse_args(command: &Command, prefix: &str, content: &str) -> Result<ParsedArgs> {
    if command.args().is_empty() {
        return Err(HeraldError::NoArgsDeclared {
            command: command.name().to_string(),
        });
    }

    let tokens: Vec<&str> = remainder(prefix, content).split(' ').collect();
    let mut found = HashMap::new();

    for (i, token) in tokens.iter().enumerate() {
        for spec in command.args().iter().filter(|spec| spec.matches(token)) {
            let parsed = if !spec.requires_value {
                ParsedArg::present(spec)
            } else if let Some(value) = tokens.get(i + 1) {
                ParsedArg::with_value(spec, value)
            } else if spec.strict {
                return Err(HeraldError::MissingValue {
                    argument: spec.name.clone(),
                });
            } else {
                ParsedArg::missing_value(spec)
            };
            found.insert(spec.name.clone(), parsed);
        }
    }

    if found.is_empty() {
        return Err(HeraldError::NoArgsFound {
            command: command.name().to_string(),
        });
    }

    Ok(ParsedArgs { args: found })
}
