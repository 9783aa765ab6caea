use super::ServiceError;
use crate::scores::{scores_csv, winner, ScorePair, Winner};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tournament states that still accept play.
const OPEN_STATES: [&str; 2] = ["pending", "underway"];

/// Match states that still need a result.
const OPEN_MATCH_STATES: [&str; 2] = ["pending", "open"];

/// Number of most recent tournaments scanned for members.
const MEMBER_SCAN_DEPTH: usize = 5;

/// A Challonge tournament.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_challonge_url: Option<String>,
    #[serde(default)]
    pub sign_up_url: Option<String>,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tournament_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    #[serde(default)]
    pub progress_meter: u32,
    #[serde(default)]
    pub participants_count: u32,
    #[serde(default)]
    pub signup_cap: Option<u32>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub matches: Vec<Match>,
    /// Set by member-aware queries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_signed_up: Option<bool>,
}

impl Tournament {
    /// Returns `true` for pending or underway tournaments.
    pub fn is_open(&self) -> bool {
        OPEN_STATES.contains(&self.state.as_str())
    }

    /// Returns `true` if a participant carries `email_hash`.
    pub fn has_member(&self, email_hash: Option<&str>) -> bool {
        email_hash.is_some_and(|hash| {
            self.participants
                .iter()
                .any(|p| p.email_hash.as_deref() == Some(hash))
        })
    }

    /// Returns a copy without participants and matches.
    pub fn summary(&self) -> Self {
        Self {
            participants: Vec::new(),
            matches: Vec::new(),
            ..self.clone()
        }
    }
}

/// A player registered in a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_hash: Option<String>,
    #[serde(default)]
    pub challonge_email_address_verified: Option<bool>,
}

/// A Challonge account seen in recent tournaments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
    pub email_hash: Option<String>,
    pub challonge_email_address_verified: Option<bool>,
}

/// A match between two participants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub tournament_id: u64,
    pub state: String,
    #[serde(default)]
    pub player1_id: Option<u64>,
    #[serde(default)]
    pub player2_id: Option<u64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub scores_csv: Option<String>,
    /// Participant id of the winner, or `tie`.
    #[serde(default)]
    pub winner_id: Option<String>,
}

/// An unplayed match resolved with its tournament and players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenMatch {
    #[serde(flatten)]
    pub details: Match,
    pub tournament: Tournament,
    pub player1: Option<Participant>,
    pub player2: Option<Participant>,
}

impl OpenMatch {
    /// Returns `true` if either player carries `email_hash`.
    pub fn involves(&self, email_hash: &str) -> bool {
        [&self.player1, &self.player2]
            .into_iter()
            .flatten()
            .any(|p| p.email_hash.as_deref() == Some(email_hash))
    }
}

/// Filters for [`TournamentService::fetch_open_tournaments_for_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberQuery {
    /// Keep only tournaments whose signed-up flag equals this value.
    pub signed_up: Option<bool>,
    /// Include tournaments that already started.
    pub include_underway: bool,
}

impl Default for MemberQuery {
    fn default() -> Self {
        Self {
            signed_up: None,
            include_underway: true,
        }
    }
}

impl MemberQuery {
    /// Pending tournaments the member has not joined yet.
    pub fn joinable() -> Self {
        Self {
            signed_up: Some(false),
            include_underway: false,
        }
    }
}

/// Access to tournament, member and match data.
#[async_trait]
pub trait TournamentService: Send + Sync + Debug {
    /// Returns pending and underway tournaments.
    async fn fetch_open_tournaments(&self) -> Result<Vec<Tournament>, ServiceError>;

    /// Returns open tournaments with `is_signed_up` set for the member.
    async fn fetch_open_tournaments_for_member(
        &self,
        email_hash: Option<&str>,
        query: MemberQuery,
    ) -> Result<Vec<Tournament>, ServiceError>;

    /// Returns the tournament with participants and matches, if it exists.
    async fn fetch_tournament(&self, id: &str) -> Result<Option<Tournament>, ServiceError>;

    /// Returns the members found in recent tournaments, one per email hash.
    async fn fetch_members(&self) -> Result<Vec<Member>, ServiceError>;

    /// Returns unplayed matches in open tournaments involving the member.
    async fn fetch_open_matches_for_member(
        &self,
        email_hash: Option<&str>,
    ) -> Result<Vec<OpenMatch>, ServiceError>;

    /// Registers a Challonge user in a tournament.
    async fn add_tournament_participant(
        &self,
        tournament_id: &str,
        username: &str,
    ) -> Result<Participant, ServiceError>;

    /// Stores set scores and the resulting winner on a match.
    async fn report_match_scores(
        &self,
        open_match: &OpenMatch,
        scores: &[ScorePair],
    ) -> Result<Match, ServiceError>;
}

/// A [`TournamentService`] kept in process memory.
///
/// Tournaments are stored most recent first, as the Challonge API lists
/// them.
#[derive(Debug, Default)]
pub struct InMemoryTournamentService {
    tournaments: RwLock<Vec<Tournament>>,
}

impl InMemoryTournamentService {
    /// Creates a service holding `tournaments`.
    pub fn new(tournaments: Vec<Tournament>) -> Self {
        Self {
            tournaments: RwLock::new(tournaments),
        }
    }

    /// Returns a snapshot of every stored tournament.
    pub async fn tournaments(&self) -> Vec<Tournament> {
        self.tournaments.read().await.clone()
    }

    fn open<'a>(
        tournaments: &'a [Tournament],
        include_underway: bool,
    ) -> impl Iterator<Item = &'a Tournament> {
        tournaments.iter().filter(move |t| {
            t.state == "pending" || (include_underway && t.is_open())
        })
    }
}

fn parse_id(id: &str) -> Option<u64> {
    id.trim().parse().ok()
}

#[async_trait]
impl TournamentService for InMemoryTournamentService {
    async fn fetch_open_tournaments(&self) -> Result<Vec<Tournament>, ServiceError> {
        let tournaments = self.tournaments.read().await;
        Ok(Self::open(&tournaments, true)
            .map(Tournament::summary)
            .collect())
    }

    async fn fetch_open_tournaments_for_member(
        &self,
        email_hash: Option<&str>,
        query: MemberQuery,
    ) -> Result<Vec<Tournament>, ServiceError> {
        let tournaments = self.tournaments.read().await;
        Ok(Self::open(&tournaments, query.include_underway)
            .map(|t| Tournament {
                is_signed_up: Some(t.has_member(email_hash)),
                ..t.clone()
            })
            .filter(|t| query.signed_up.is_none() || t.is_signed_up == query.signed_up)
            .collect())
    }

    async fn fetch_tournament(&self, id: &str) -> Result<Option<Tournament>, ServiceError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let tournaments = self.tournaments.read().await;
        Ok(tournaments.iter().find(|t| t.id == id).cloned())
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, ServiceError> {
        let tournaments = self.tournaments.read().await;
        let mut members: Vec<Member> = Vec::new();
        let participants = tournaments
            .iter()
            .take(MEMBER_SCAN_DEPTH)
            .flat_map(|t| t.participants.iter());
        for participant in participants {
            let Some(username) = &participant.username else {
                continue;
            };
            let seen = members.iter().any(|m| match &participant.email_hash {
                Some(hash) => m.email_hash.as_ref() == Some(hash),
                None => &m.username == username,
            });
            if !seen {
                members.push(Member {
                    username: username.clone(),
                    email_hash: participant.email_hash.clone(),
                    challonge_email_address_verified: participant
                        .challonge_email_address_verified,
                });
            }
        }
        Ok(members)
    }

    async fn fetch_open_matches_for_member(
        &self,
        email_hash: Option<&str>,
    ) -> Result<Vec<OpenMatch>, ServiceError> {
        let Some(email_hash) = email_hash else {
            return Ok(Vec::new());
        };
        let tournaments = self.tournaments.read().await;
        let open = Self::open(&tournaments, true).collect::<Vec<_>>();
        let participants: HashMap<u64, &Participant> = open
            .iter()
            .flat_map(|t| t.participants.iter())
            .map(|p| (p.id, p))
            .collect();
        let player = |id: Option<u64>| {
            id.and_then(|id| participants.get(&id)).map(|p| (*p).clone())
        };

        Ok(open
            .iter()
            .flat_map(|t| t.matches.iter().map(move |m| (*t, m)))
            .filter(|(_, m)| OPEN_MATCH_STATES.contains(&m.state.as_str()))
            .map(|(t, m)| OpenMatch {
                details: m.clone(),
                tournament: t.summary(),
                player1: player(m.player1_id),
                player2: player(m.player2_id),
            })
            .filter(|m| m.involves(email_hash))
            .collect())
    }

    async fn add_tournament_participant(
        &self,
        tournament_id: &str,
        username: &str,
    ) -> Result<Participant, ServiceError> {
        let mut tournaments = self.tournaments.write().await;
        let known = tournaments
            .iter()
            .flat_map(|t| t.participants.iter())
            .find(|p| p.username.as_deref() == Some(username))
            .cloned();
        let next_id = tournaments
            .iter()
            .flat_map(|t| t.participants.iter())
            .map(|p| p.id)
            .max()
            .unwrap_or_default()
            + 1;

        let index = parse_id(tournament_id)
            .and_then(|id| tournaments.iter().position(|t| t.id == id))
            .ok_or_else(|| ServiceError::http(404, "Tournament not found"))?;
        let tournament = &mut tournaments[index];
        if tournament
            .participants
            .iter()
            .any(|p| p.username.as_deref() == Some(username))
        {
            return Err(ServiceError::http(422, "Participant has already been taken"));
        }

        let participant = Participant {
            id: next_id,
            display_name: username.to_string(),
            username: Some(username.to_string()),
            email_hash: known.as_ref().and_then(|p| p.email_hash.clone()),
            challonge_email_address_verified: known
                .as_ref()
                .and_then(|p| p.challonge_email_address_verified),
        };
        tournament.participants.push(participant.clone());
        tournament.participants_count += 1;
        info!("Signed up '{}' for tournament {}", username, tournament.id);
        Ok(participant)
    }

    async fn report_match_scores(
        &self,
        open_match: &OpenMatch,
        scores: &[ScorePair],
    ) -> Result<Match, ServiceError> {
        let mut tournaments = self.tournaments.write().await;
        let stored = tournaments
            .iter_mut()
            .find(|t| t.id == open_match.details.tournament_id)
            .and_then(|t| t.matches.iter_mut().find(|m| m.id == open_match.details.id))
            .ok_or_else(|| ServiceError::http(404, "Match not found"))?;

        stored.scores_csv = Some(scores_csv(scores));
        stored.winner_id = match winner(scores) {
            Winner::Player1 => stored.player1_id.map(|id| id.to_string()),
            Winner::Player2 => stored.player2_id.map(|id| id.to_string()),
            Winner::Tie => Some("tie".to_string()),
        };
        stored.state = "complete".to_string();
        debug!("Reported {:?} on match {}", stored.scores_csv, stored.id);
        Ok(stored.clone())
    }
}
