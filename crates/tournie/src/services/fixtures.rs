use super::{InMemoryTournamentService, InMemoryUserDirectory, Tournament, UserRecord};
use serde::{Deserialize, Serialize};

/// Seed data for the in-memory services, read from JSON.
///
/// ```
/// use tournie::services::Fixtures;
///
/// let fixtures = Fixtures::from_json(r#"{
///     "tournaments": [{ "id": 1, "name": "Spring Cup", "state": "pending" }],
///     "users": [{ "sender": "U1", "challongeUsername": "alice" }]
/// }"#).expect("valid fixtures");
/// assert_eq!(fixtures.tournaments.len(), 1);
/// assert_eq!(fixtures.users[0].challonge_username, "alice");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    /// Tournaments, most recent first.
    #[serde(default)]
    pub tournaments: Vec<Tournament>,
    /// Users already connected.
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl Fixtures {
    /// Parses fixtures from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds the in-memory services seeded with this data.
    pub fn into_services(self) -> (InMemoryTournamentService, InMemoryUserDirectory) {
        (
            InMemoryTournamentService::new(self.tournaments),
            InMemoryUserDirectory::with_users(self.users),
        )
    }
}
