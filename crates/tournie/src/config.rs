//! Bot and command-line configuration.

use crate::services::Fixtures;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tournie_core::{Action, HandlerError, Message};

/// Library-level configuration consumed by [`build_router`].
///
/// [`build_router`]: crate::commands::build_router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Command run for empty text.
    pub default_command: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_command: "tournaments".to_string(),
        }
    }
}

/// Errors raised while starting the bot.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read fixtures from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixtures in {path}: {source}")]
    Fixtures {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Router(#[from] HandlerError),

    #[error("Failed to render response: {0}")]
    Output(#[from] serde_json::Error),
}

/// Handles one chat message against in-memory tournament data.
#[derive(Parser, Debug, Clone)]
#[command(name = "tournie", version, about)]
pub struct Config {
    /// Command run when the text is empty.
    #[arg(long, env = "TOURNIE_DEFAULT_COMMAND", default_value = "tournaments")]
    pub default_command: String,

    /// Slash command name shown in help texts.
    #[arg(long, env = "TOURNIE_SLASH_COMMAND", default_value = "/tournie")]
    pub slash_command: String,

    /// JSON file seeding tournaments and users.
    #[arg(long, env = "TOURNIE_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Log filter directive, e.g. `tournie=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    /// Platform id of the sender.
    #[arg(long, default_value = "U0LOCAL")]
    pub sender: String,

    /// Interactive callback id; the message is routed as a callback.
    #[arg(long)]
    pub callback_id: Option<String>,

    /// Callback action as `name=value`. Repeatable.
    #[arg(long = "action", value_parser = parse_action)]
    pub actions: Vec<Action>,

    /// Message text, e.g. `whoami` or `report 11-7 11-9`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

fn parse_action(s: &str) -> Result<Action, String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(Action::button(name, value)),
        _ => Err(format!("expected `name=value`, got `{s}`")),
    }
}

impl Config {
    /// Returns the library-level configuration.
    pub fn bot_config(&self) -> BotConfig {
        BotConfig {
            default_command: self.default_command.clone(),
        }
    }

    /// Builds the inbound message described by the arguments.
    pub fn message(&self) -> Message {
        let text = self.text.join(" ");
        let message = match &self.callback_id {
            Some(callback_id) => Message {
                text,
                ..Message::callback(&self.sender, callback_id, self.actions.clone())
            },
            None => Message::text(&self.sender, text),
        };
        message.with_command(&self.slash_command)
    }

    /// Reads the fixtures file, or returns empty fixtures.
    pub fn load_fixtures(&self) -> Result<Fixtures, ConfigError> {
        let Some(path) = &self.fixtures else {
            return Ok(Fixtures::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Fixtures::from_json(&json).map_err(|source| ConfigError::Fixtures {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("tournie").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_text_message() {
        let config = parse(&["--sender", "U1", "report", "11-7", "--debug"]);
        let message = config.message();
        assert_eq!(message.sender, "U1");
        assert_eq!(message.text, "report 11-7 --debug");
        assert_eq!(message.command_name(), "/tournie");
        assert_eq!(message.callback_id(), None);
    }

    #[test]
    fn test_callback_message() {
        let config = parse(&[
            "--callback-id",
            "tournament-3003",
            "--action",
            "sign_up=3003",
        ]);
        let message = config.message();
        assert_eq!(message.callback_id(), Some("tournament-3003"));
        assert_eq!(message.original_request.actions, vec![Action::button("sign_up", "3003")]);
    }

    #[test]
    fn test_invalid_action() {
        assert!(Config::try_parse_from(["tournie", "--action", "sign_up"]).is_err());
        assert!(Config::try_parse_from(["tournie", "--action", "=3"]).is_err());
    }

    #[test]
    fn test_missing_fixtures_file() {
        let config = parse(&["--fixtures", "/nonexistent/tournie.json"]);
        assert!(matches!(config.load_fixtures(), Err(ConfigError::Io { .. })));
        assert_eq!(parse(&[]).bot_config(), BotConfig::default());
    }
}
