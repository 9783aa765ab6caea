//! Dependencies handed to every step.

use crate::services::{
    Fixtures, InMemoryTournamentService, InMemoryUserDirectory, TournamentService, UserDirectory,
};
use std::sync::Arc;

/// The services a pipeline runs against.
///
/// Passed to each step on every run; steps never capture services.
#[derive(Debug, Clone)]
pub struct Deps {
    /// Tournament, member and match data.
    pub tournaments: Arc<dyn TournamentService>,
    /// Linked chat users.
    pub users: Arc<dyn UserDirectory>,
}

impl Deps {
    /// Creates dependencies from the two services.
    pub fn new(tournaments: Arc<dyn TournamentService>, users: Arc<dyn UserDirectory>) -> Self {
        Self { tournaments, users }
    }

    /// Creates in-memory services seeded with `fixtures`.
    pub fn in_memory(fixtures: Fixtures) -> Self {
        let (tournaments, users): (InMemoryTournamentService, InMemoryUserDirectory) =
            fixtures.into_services();
        Self::new(Arc::new(tournaments), Arc::new(users))
    }
}
