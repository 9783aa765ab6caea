//! Backend collaborators consumed by the pipelines.
//!
//! Both services are traits so pipelines only see the contract. The
//! in-memory implementations back the binary and the tests.

mod fixtures;
mod tournaments;
mod users;

pub use fixtures::Fixtures;
pub use tournaments::{
    InMemoryTournamentService, Match, Member, MemberQuery, OpenMatch, Participant, Tournament,
    TournamentService,
};
pub use users::{InMemoryUserDirectory, UserDirectory, UserRecord};

use thiserror::Error;
use tournie_core::HandlerError;

/// Errors raised by the tournament service or the user directory.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// The backend answered with an HTTP error.
    #[error("{status} – {data}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response payload.
        data: serde_json::Value,
    },

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Creates an HTTP error with a Challonge-style `errors` payload.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            data: serde_json::json!({ "errors": [message.into()] }),
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Http { status, data } => HandlerError::Upstream { status, data },
            ServiceError::Other(message) => HandlerError::Unclassified(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_conversion() {
        let error: HandlerError = ServiceError::http(404, "Not found").into();
        assert_eq!(error.to_string(), r#"404 – {"errors":["Not found"]}"#);
        assert!(!error.is_user_facing());

        let error: HandlerError = ServiceError::Other("connection reset".to_string()).into();
        assert!(matches!(error, HandlerError::Unclassified(ref m) if m == "connection reset"));
    }
}
