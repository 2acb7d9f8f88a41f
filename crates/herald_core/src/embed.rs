use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Upper bound (exclusive) for randomly picked embed colours
pub const COLOUR_RANGE: u32 = 10_000_000;

/// A rich embed, kept independent of any gateway's builder types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub description: String,
    pub colour: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

impl Embed {
    /// Embed with a description and a random colour
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            colour: random_colour(),
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// The "something went wrong" embed sent by `Context::err`
    pub fn error(content: impl std::fmt::Display) -> Self {
        Self::new(format!(
            ":x: | Uh oh, something **went wrong**!\n```css\n{}\n```",
            content
        ))
    }

    /// Help page for a command, titled with the bot's primary prefix
    pub fn command_help(command: &Command, prefix: &str, icon_url: Option<String>) -> Self {
        Self::new(format!("`{}{}` Command Help", prefix, command.name()))
            .field(
                "📜 | Description",
                css_block(&command.descriptions().join("\n")),
                false,
            )
            .field(
                "🤖 | Example",
                css_block(&command.examples().join("\n")),
                false,
            )
            .footer(
                format!("Aliases: {}", command.alias_names().join(" | ")),
                icon_url,
            )
    }
}

fn css_block(content: &str) -> String {
    format!("```css\n{}\n```", content)
}

pub fn random_colour() -> u32 {
    rand::thread_rng().gen_range(0..COLOUR_RANGE)
}
