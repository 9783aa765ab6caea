//! Handler error types.

use crate::response::Response;
use thiserror::Error;

/// Errors a step can raise while a pipeline runs.
///
/// Combinators never catch or reclassify these; they stop and pass the
/// error upward untouched. Only the error boundary around dispatch decides
/// how an error is shown, using [`HandlerError::is_user_facing`].
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum HandlerError {
    /// A fully rendered response meant for the user.
    #[error("{}", .0.text().unwrap_or("user-facing response"))]
    UserFacing(Response),

    /// An interactive control sent no usable value, e.g. a stale or
    /// tampered message.
    #[error("Invalid action value(s) for callback: {callback_id}")]
    InvalidCallbackAction {
        /// The callback id of the offending request.
        callback_id: String,
    },

    /// A resource disappeared between listing and use.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource, e.g. `Tournament`.
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// No pipeline is registered for a callback token.
    #[error("Missing handler for callback: {callback_id}")]
    MissingCallbackHandler {
        /// The full callback id that could not be routed.
        callback_id: String,
    },

    /// The tournament service answered with an HTTP error.
    #[error("{status} – {data}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response payload.
        data: serde_json::Value,
    },

    /// The router was assembled incorrectly.
    #[error("Invalid router configuration: {0}")]
    Configuration(String),

    /// Anything else.
    #[error("{0}")]
    Unclassified(String),
}

impl HandlerError {
    /// Creates a user-facing error carrying `response`.
    pub fn user_facing(response: impl Into<Response>) -> Self {
        Self::UserFacing(response.into())
    }

    /// Returns `true` for errors whose message is meant for the end user.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UserFacing(_) | Self::InvalidCallbackAction { .. } | Self::NotFound { .. }
        )
    }

    /// Returns the response to show the user for user-facing errors.
    pub fn user_response(&self) -> Option<Response> {
        match self {
            Self::UserFacing(response) => Some(response.clone()),
            Self::InvalidCallbackAction { .. } | Self::NotFound { .. } => {
                Some(Response::Text(self.to_string()))
            }
            _ => None,
        }
    }
}
