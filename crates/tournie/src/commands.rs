//! The command and callback tables.

use crate::config::BotConfig;
use crate::deps::Deps;
use crate::handlers::usage::{UnknownCommandHint, UsageEntry};
use crate::handlers::{matches, tournaments, usage, users};
use tournie_core::{Chain, HandlerError, Router};
use tracing::debug;

/// Free-text commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Tournaments,
    WhoAmI,
    Connect,
    Disconnect,
    SignUp,
    Next,
    Report,
    Help,
}

impl Command {
    /// Every command, in help-text order.
    pub const ALL: [Command; 8] = [
        Command::Tournaments,
        Command::WhoAmI,
        Command::Connect,
        Command::Disconnect,
        Command::SignUp,
        Command::Next,
        Command::Report,
        Command::Help,
    ];

    /// Returns the routing token.
    pub fn token(self) -> &'static str {
        match self {
            Command::Tournaments => "tournaments",
            Command::WhoAmI => "whoami",
            Command::Connect => "connect",
            Command::Disconnect => "disconnect",
            Command::SignUp => "signup",
            Command::Next => "next",
            Command::Report => "report",
            Command::Help => "help",
        }
    }

    /// Returns extra tokens routed to the same pipeline.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Command::Connect => &["login"],
            Command::Disconnect => &["logout"],
            Command::Help => &["usage"],
            _ => &[],
        }
    }

    /// Resolves a token or alias.
    ///
    /// Tokens are case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.token() == token || c.aliases().iter().any(|alias| *alias == token))
    }

    fn syntax(self) -> &'static str {
        match self {
            Command::Connect => "connect [<challonge_username>]",
            Command::Report => "report [<match_id>] <score> <score>...",
            other => other.token(),
        }
    }

    fn description(self) -> &'static str {
        match self {
            Command::Tournaments => "list open tournaments",
            Command::WhoAmI => "show who you are on Challonge",
            Command::Connect => "connect your Slack and Challonge accounts",
            Command::Disconnect => "disconnect your Slack and Challonge accounts",
            Command::SignUp => "sign up for a tournament",
            Command::Next => "list open matches in tournaments you are part of",
            Command::Report => "report the set scores of your next match",
            Command::Help => "show this information",
        }
    }

    /// Builds the pipeline for this command.
    pub fn pipeline(self, config: &BotConfig) -> Chain<Deps> {
        match self {
            Command::Tournaments => tournaments::list_open_tournaments(),
            Command::WhoAmI => users::show_current_user(),
            Command::Connect => users::log_in(),
            Command::Disconnect => users::log_out(),
            Command::SignUp => tournaments::sign_up(),
            Command::Next => matches::list_next_matches(),
            Command::Report => matches::report_scores(),
            Command::Help => usage::show_usage(usage_entries(default_token(config))),
        }
    }
}

/// The configured default command as a command token. An alias resolves
/// to its command; anything else is passed on for the router to reject.
fn default_token(config: &BotConfig) -> &str {
    Command::from_token(&config.default_command)
        .map_or(config.default_command.as_str(), |command| command.token())
}

/// The help text entries. The default command is shown in brackets since
/// it can be omitted.
pub fn usage_entries(default_command: &str) -> Vec<UsageEntry> {
    let default = Command::from_token(default_command);
    Command::ALL
        .into_iter()
        .map(|command| {
            let syntax = if default == Some(command) {
                format!("[{}]", command.syntax())
            } else {
                command.syntax().to_string()
            };
            (syntax, command.description())
        })
        .collect()
}

/// Interactive callbacks, keyed by the callback id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    /// "Sign Up" button of the tournament list.
    Tournament,
    /// Sign-up select menu.
    SignUp,
    /// Member select menu of `connect`.
    Login,
    /// Match select menu of `report`.
    Report,
    /// "Close" button of the help text.
    Usage,
}

impl Callback {
    /// Every callback.
    pub const ALL: [Callback; 5] = [
        Callback::Tournament,
        Callback::SignUp,
        Callback::Login,
        Callback::Report,
        Callback::Usage,
    ];

    /// Returns the routing token.
    pub fn token(self) -> &'static str {
        match self {
            Callback::Tournament => "tournament",
            Callback::SignUp => "signup",
            Callback::Login => "login",
            Callback::Report => "report",
            Callback::Usage => "usage",
        }
    }

    /// Builds the pipeline for this callback.
    pub fn pipeline(self) -> Chain<Deps> {
        match self {
            Callback::Tournament => tournaments::sign_up_from_list(),
            Callback::SignUp => tournaments::sign_up_from_menu(),
            Callback::Login => users::log_in_from_menu(),
            Callback::Report => matches::report_scores_from_menu(),
            Callback::Usage => usage::close_usage(),
        }
    }
}

/// Registers every command and callback pipeline.
///
/// # Errors
///
/// Returns [`HandlerError::Configuration`] when the configured default
/// command is not a command token.
pub fn build_router(config: &BotConfig) -> Result<Router<Deps>, HandlerError> {
    let mut builder = Router::<Deps>::builder()
        .default_command(default_token(config))
        .on_unknown_command(UnknownCommandHint);
    for command in Command::ALL {
        builder = builder.command(command.token(), command.pipeline(config));
        for alias in command.aliases() {
            builder = builder.alias(*alias, command.token());
        }
    }
    for callback in Callback::ALL {
        builder = builder.callback(callback.token(), callback.pipeline());
    }
    let router = builder.build()?;
    debug!("Built router: {:?}", router);
    Ok(router)
}
