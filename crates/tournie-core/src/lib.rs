//! Core pipeline engine for the tournie chat bot.
//!
//! This crate knows nothing about tournaments. It provides the building
//! blocks every handler is assembled from, and the dispatcher that picks a
//! handler for an inbound message.
//!
//! # Core Types
//!
//! - [`Step`] - An async unit of work over explicit dependencies
//! - [`Outcome`] - What a step produced: proceed, complete or fail
//! - [`Context`] - Append-only heterogeneous storage threaded through a pipeline
//! - [`HandlerError`] - Raised failures, classified at the error boundary
//! - [`Chain`] / [`Concurrent`] - Sequential and concurrent composition
//! - [`Router`] - Command and callback dispatch
//! - [`Message`] / [`Response`] - The chat-platform data model

mod combinators;
mod context;
mod error;
mod message;
mod response;
mod router;
mod step;

pub use combinators::{chain, concurrent, Chain, Concurrent};
pub use context::{Context, ContextKey, Fragment};
pub use error::HandlerError;
pub use message::{callback_value, Action, Message, OriginalRequest, SelectedOption};
pub use response::{Attachment, Control, ControlKind, Field, MenuOption, Response, Template};
pub use router::{MissingCallbackHandler, Route, Router, RouterBuilder, UnknownCommand, ROUTE_KEY};
pub use step::{BoxStep, FnStep, Outcome, Step, StepName, StepResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        chain, concurrent, BoxStep, Chain, Concurrent, Context, ContextKey, FnStep, HandlerError,
        Message, Outcome, Response, Route, Router, Step, StepName, StepResult, Template,
    };
}
