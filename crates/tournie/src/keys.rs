//! Context field names shared by the pipelines.

use std::any::Any;
use tournie_core::{Context, HandlerError};

/// The linked [`UserRecord`](crate::services::UserRecord).
pub const USER: &str = "user";
/// Default field for a submitted callback value.
pub const CALLBACK_VALUE: &str = "callbackValue";
/// Tournament id picked in a sign-up control.
pub const TOURNAMENT_ID: &str = "tournamentId";
/// The fetched [`Tournament`](crate::services::Tournament).
pub const TOURNAMENT: &str = "tournament";
/// Open tournaments to list.
pub const OPEN_TOURNAMENTS: &str = "openTournaments";
/// Tournaments the user can still join.
pub const JOINABLE_TOURNAMENTS: &str = "joinableTournaments";
/// The user's unplayed matches.
pub const OPEN_MATCHES: &str = "openMatches";
/// Match id picked in the report menu.
pub const MATCH_ID: &str = "matchId";
/// Challonge username picked in the login menu.
pub const CHALLONGE_USERNAME: &str = "challongeUsername";

/// Returns the field an earlier step must have set.
///
/// A missing field means the pipeline was assembled in the wrong order.
pub fn require<'a, T: Any>(ctx: &'a Context, key: &str) -> Result<&'a T, HandlerError> {
    ctx.get::<T>(key)
        .ok_or_else(|| HandlerError::Unclassified(format!("Missing context field: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tournie_core::Message;

    #[test]
    fn test_require_reports_missing_field() {
        let ctx = Context::new(Message::text("U1", "")).with(USER, 1u8);
        assert_eq!(require::<u8>(&ctx, USER).ok(), Some(&1));
        let error = require::<String>(&ctx, TOURNAMENT).expect_err("field is missing");
        assert_eq!(error.to_string(), "Missing context field: tournament");
    }
}
