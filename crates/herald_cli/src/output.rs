use herald_core::Command;
use owo_colors::OwoColorize;

/// Standard output formatting for the CLI
#[derive(Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.chars().count()).dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    /// Print a success message (indented)
    pub fn success(&self, message: &str) {
        println!("  {} {}", "✓".bright_green(), message);
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// One line per command: name, aliases and declared flags
    pub fn commands<'a>(&self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            let aliases = if command.alias_names().is_empty() {
                String::new()
            } else {
                format!(" ({})", command.alias_names().join(", "))
            };
            let flags: Vec<String> = command
                .args()
                .iter()
                .map(|arg| {
                    if arg.requires_value {
                        format!("{} <value>", arg.name)
                    } else {
                        arg.name.clone()
                    }
                })
                .collect();

            println!(
                "  {}{} {}",
                command.name().bright_yellow(),
                aliases.dimmed(),
                flags.join(" ").bright_white()
            );
        }
    }
}
