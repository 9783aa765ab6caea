//! Command and callback dispatch.

use crate::context::Context;
use crate::error::HandlerError;
use crate::message::Message;
use crate::step::{Outcome, Step, StepResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Context key under which the router stores the selected [`Route`].
pub const ROUTE_KEY: &str = "route";

/// The routing decision for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Free text: the first word, or the default command for empty text.
    Command {
        /// Routing token.
        token: String,
    },
    /// Interactive callback: the callback id up to its first hyphen.
    Callback {
        /// Routing token.
        token: String,
        /// The full callback id.
        callback_id: String,
    },
}

impl Route {
    /// Derives the route for `message`.
    ///
    /// A non-empty callback id always wins over the text.
    ///
    /// ```
    /// use tournie_core::{Message, Route};
    ///
    /// let route = Route::resolve(&Message::text("U1", "  next  --debug"), "tournaments");
    /// assert_eq!(route.token(), "next");
    ///
    /// let route = Route::resolve(&Message::text("U1", ""), "tournaments");
    /// assert_eq!(route.token(), "tournaments");
    ///
    /// let callback = Message::callback("U1", "tournament-42", vec![]);
    /// let route = Route::resolve(&callback, "tournaments");
    /// assert_eq!(route.token(), "tournament");
    /// ```
    pub fn resolve(message: &Message, default_command: &str) -> Self {
        match message.callback_id() {
            Some(callback_id) => Route::Callback {
                token: callback_id
                    .split('-')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                callback_id: callback_id.to_string(),
            },
            None => Route::Command {
                token: message
                    .words()
                    .next()
                    .unwrap_or(default_command)
                    .to_string(),
            },
        }
    }

    /// Returns the routing token.
    pub fn token(&self) -> &str {
        match self {
            Route::Command { token } | Route::Callback { token, .. } => token,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Command { token } => write!(f, "command '{token}'"),
            Route::Callback { token, callback_id } => {
                write!(f, "callback '{token}' ({callback_id})")
            }
        }
    }
}

type Pipeline<D> = Arc<dyn Step<D>>;

/// Maps command and callback tokens to pipelines.
///
/// Built once at startup with [`Router::builder`]. Unknown command tokens
/// land on the unknown-command pipeline, which is expected to answer
/// politely. Unknown callback tokens land on the unknown-callback pipeline,
/// which by default raises [`HandlerError::MissingCallbackHandler`].
pub struct Router<D> {
    commands: HashMap<String, Pipeline<D>>,
    callbacks: HashMap<String, Pipeline<D>>,
    default_command: String,
    unknown_command: Pipeline<D>,
    unknown_callback: Pipeline<D>,
}

impl<D> fmt::Debug for Router<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands = self.commands.keys().collect::<Vec<_>>();
        commands.sort();
        let mut callbacks = self.callbacks.keys().collect::<Vec<_>>();
        callbacks.sort();
        f.debug_struct("Router")
            .field("commands", &commands)
            .field("callbacks", &callbacks)
            .field("default_command", &self.default_command)
            .finish()
    }
}

impl<D: Send + Sync + 'static> Router<D> {
    /// Creates a new router builder.
    pub fn builder() -> RouterBuilder<D> {
        RouterBuilder::new()
    }

    /// Returns the token used for empty text.
    pub fn default_command(&self) -> &str {
        &self.default_command
    }

    /// Returns `true` if a pipeline is registered for the command token.
    pub fn has_command(&self, token: &str) -> bool {
        self.commands.contains_key(token)
    }

    /// Returns `true` if a pipeline is registered for the callback token.
    pub fn has_callback(&self, token: &str) -> bool {
        self.callbacks.contains_key(token)
    }

    /// Returns the route and the pipeline selected for `message`.
    pub fn select(&self, message: &Message) -> (Route, &dyn Step<D>) {
        let route = Route::resolve(message, &self.default_command);
        let pipeline = match &route {
            Route::Command { token } => self
                .commands
                .get(token.as_str())
                .unwrap_or(&self.unknown_command),
            Route::Callback { token, .. } => self
                .callbacks
                .get(token.as_str())
                .unwrap_or(&self.unknown_callback),
        };
        (route, pipeline.as_ref())
    }

    /// Runs the pipeline selected for `message`.
    ///
    /// The pipeline starts from a context holding the message and the
    /// selected [`Route`] under [`ROUTE_KEY`]. Errors are returned as
    /// raised; classifying them is the caller's job.
    pub async fn dispatch(&self, deps: &D, message: Message) -> StepResult {
        let (route, pipeline) = self.select(&message);
        info!("Dispatching {} to '{}'", route, pipeline.name());
        let ctx = Context::new(message).with(ROUTE_KEY, route);
        let outcome = pipeline.run(deps, ctx).await?;
        debug!(
            "Pipeline '{}' resolved ({})",
            pipeline.name(),
            if outcome.is_proceed() { "proceed" } else { "final" }
        );
        Ok(outcome)
    }
}

/// Builder for constructing [`Router`] instances.
pub struct RouterBuilder<D> {
    commands: HashMap<String, Pipeline<D>>,
    aliases: Vec<(String, String)>,
    callbacks: HashMap<String, Pipeline<D>>,
    default_command: Option<String>,
    unknown_command: Option<Pipeline<D>>,
    unknown_callback: Option<Pipeline<D>>,
}

impl<D: Send + Sync + 'static> Default for RouterBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Send + Sync + 'static> RouterBuilder<D> {
    /// Creates a new empty router builder.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: Vec::new(),
            callbacks: HashMap::new(),
            default_command: None,
            unknown_command: None,
            unknown_callback: None,
        }
    }

    /// Registers the pipeline for a command token.
    pub fn command<S: Step<D> + 'static>(mut self, token: impl Into<String>, pipeline: S) -> Self {
        self.commands.insert(token.into(), Arc::new(pipeline));
        self
    }

    /// Makes `alias` run the pipeline registered for `token`.
    pub fn alias(mut self, alias: impl Into<String>, token: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), token.into()));
        self
    }

    /// Registers the pipeline for a callback token.
    pub fn callback<S: Step<D> + 'static>(
        mut self,
        token: impl Into<String>,
        pipeline: S,
    ) -> Self {
        self.callbacks.insert(token.into(), Arc::new(pipeline));
        self
    }

    /// Sets the command token used for empty text.
    pub fn default_command(mut self, token: impl Into<String>) -> Self {
        self.default_command = Some(token.into());
        self
    }

    /// Sets the pipeline for unrecognised command tokens.
    pub fn on_unknown_command<S: Step<D> + 'static>(mut self, pipeline: S) -> Self {
        self.unknown_command = Some(Arc::new(pipeline));
        self
    }

    /// Sets the pipeline for unrecognised callback tokens.
    pub fn on_unknown_callback<S: Step<D> + 'static>(mut self, pipeline: S) -> Self {
        self.unknown_callback = Some(Arc::new(pipeline));
        self
    }

    /// Builds the router.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Configuration`] when no default command is
    /// set, when the default command or an alias target is not registered,
    /// or when an alias shadows a registered command.
    pub fn build(self) -> Result<Router<D>, HandlerError> {
        let default_command = self.default_command.ok_or_else(|| {
            HandlerError::Configuration("Default command must be specified".to_string())
        })?;

        let mut commands = self.commands;
        for (alias, token) in self.aliases {
            if commands.contains_key(&alias) {
                return Err(HandlerError::Configuration(format!(
                    "Alias '{alias}' shadows a registered command"
                )));
            }
            let pipeline = commands.get(&token).cloned().ok_or_else(|| {
                HandlerError::Configuration(format!(
                    "Alias '{alias}' points to unknown command '{token}'"
                ))
            })?;
            commands.insert(alias, pipeline);
        }

        if !commands.contains_key(&default_command) {
            return Err(HandlerError::Configuration(format!(
                "Default command '{default_command}' is not registered"
            )));
        }

        Ok(Router {
            commands,
            callbacks: self.callbacks,
            default_command,
            unknown_command: self
                .unknown_command
                .unwrap_or_else(|| Arc::new(UnknownCommand) as Pipeline<D>),
            unknown_callback: self
                .unknown_callback
                .unwrap_or_else(|| Arc::new(MissingCallbackHandler) as Pipeline<D>),
        })
    }
}

/// Fallback for unrecognised command tokens: names the token and proceeds
/// no further.
#[derive(Debug, Default)]
pub struct UnknownCommand;

#[async_trait]
impl<D: Send + Sync> Step<D> for UnknownCommand {
    async fn run(&self, _deps: &D, ctx: Context) -> StepResult {
        let token = ctx
            .get::<Route>(ROUTE_KEY)
            .map(Route::token)
            .unwrap_or_default();
        Ok(Outcome::done(format!("Unknown command: `{token}`")))
    }
}

/// Fallback for unrecognised callback tokens: a wiring bug, raised as
/// [`HandlerError::MissingCallbackHandler`].
#[derive(Debug, Default)]
pub struct MissingCallbackHandler;

#[async_trait]
impl<D: Send + Sync> Step<D> for MissingCallbackHandler {
    async fn run(&self, _deps: &D, ctx: Context) -> StepResult {
        Err(HandlerError::MissingCallbackHandler {
            callback_id: ctx
                .message()
                .callback_id()
                .unwrap_or_default()
                .to_string(),
        })
    }
}
