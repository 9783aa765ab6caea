//! A slash-command chat bot for Challonge tournaments.
//!
//! Every command and interactive callback maps to a pipeline of
//! [`tournie_core`] steps: validation steps backed by the user directory,
//! service steps backed by the tournament service, and a rendering step.
//! [`Bot::handle`] routes a message, runs its pipeline and turns whatever
//! happened into a response.
//!
//! # Example
//!
//! ```
//! use tournie::{Bot, BotConfig, Deps};
//! use tournie::services::Fixtures;
//! use tournie_core::Message;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bot = Bot::new(&BotConfig::default(), Deps::in_memory(Fixtures::default()))
//!     .expect("valid configuration");
//!
//! bot.deps().users.add_user("U1", "alice", None).await.expect("stored");
//! let response = bot.handle(Message::text("U1", "whoami")).await;
//! assert_eq!(response.text(), Some("You are known as *alice* (unverified). :ok_hand:"));
//! # }
//! ```

mod bot;
pub mod commands;
pub mod config;
mod deps;
pub mod formatting;
pub mod handlers;
pub mod keys;
pub mod scores;
pub mod services;
pub mod validation;

pub use bot::{apology, recover, Bot, DEBUG_FLAG};
pub use commands::{build_router, Callback, Command};
pub use config::{BotConfig, Config, ConfigError};
pub use deps::Deps;
