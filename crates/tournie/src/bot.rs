//! The error boundary around dispatch.

use crate::commands::build_router;
use crate::config::BotConfig;
use crate::deps::Deps;
use tournie_core::{HandlerError, Message, Response, Router, Template};
use tracing::{info, warn};

/// Flag that, as the last word of the text, turns the response into its JSON.
pub const DEBUG_FLAG: &str = "--debug";

/// The bot: a router plus the services its pipelines run against.
///
/// [`Bot::handle`] always produces a renderable response.
///
/// ```
/// use tournie::{Bot, BotConfig, Deps};
/// use tournie::services::Fixtures;
/// use tournie_core::Message;
///
/// # #[tokio::main]
/// # async fn main() {
/// let bot = Bot::new(&BotConfig::default(), Deps::in_memory(Fixtures::default()))
///     .expect("valid configuration");
/// let response = bot.handle(Message::text("U1", "whoami")).await;
/// assert_eq!(response.text(), Some("I don't know who you are. :crying_cat_face:"));
/// # }
/// ```
#[derive(Debug)]
pub struct Bot {
    router: Router<Deps>,
    deps: Deps,
}

impl Bot {
    /// Builds the router for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Configuration`] for an unknown default
    /// command.
    pub fn new(config: &BotConfig, deps: Deps) -> Result<Self, HandlerError> {
        Ok(Self::with_router(build_router(config)?, deps))
    }

    /// Wraps an already built router.
    pub fn with_router(router: Router<Deps>, deps: Deps) -> Self {
        Self { router, deps }
    }

    /// Returns the services the bot runs against.
    pub fn deps(&self) -> &Deps {
        &self.deps
    }

    /// Handles one inbound message.
    ///
    /// A trailing [`DEBUG_FLAG`] is removed before routing, so pipelines
    /// never see it.
    pub async fn handle(&self, mut message: Message) -> Response {
        let stripped = strip_debug_flag(&message.text).map(str::to_string);
        let debug = stripped.is_some();
        if let Some(text) = stripped {
            message.text = text;
        }
        let response = match self.router.dispatch(&self.deps, message).await {
            Ok(outcome) => outcome.into_response().unwrap_or_else(|| {
                warn!("Pipeline finished without a response");
                apology(&HandlerError::Unclassified(
                    "No response was produced".to_string(),
                ))
            }),
            Err(error) => recover(&error),
        };
        if debug {
            Response::Text(response.to_json())
        } else {
            response
        }
    }
}

/// Returns the text without its trailing debug flag, or `None` when the
/// flag is not the last word.
fn strip_debug_flag(text: &str) -> Option<&str> {
    let rest = text.trim_end().strip_suffix(DEBUG_FLAG)?;
    (rest.is_empty() || rest.ends_with(char::is_whitespace)).then(|| rest.trim_end())
}

/// Turns a raised error into the response shown to the user.
///
/// User-facing errors show their own response. Anything else is wrapped in
/// an apology quoting the error message.
pub fn recover(error: &HandlerError) -> Response {
    match error.user_response() {
        Some(response) => {
            info!("Handled user-facing error: {}", error);
            response
        }
        None => {
            warn!("Unhandled error: {}", error);
            apology(error)
        }
    }
}

/// The generic apology for unclassified and upstream errors.
pub fn apology(error: &HandlerError) -> Response {
    Template::with_text(format!(
        ":crying_cat_face: There was an error: `{error}`."
    ))
    .replace_original(false)
    .into()
}
