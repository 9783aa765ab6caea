//! Listing tournaments and signing up for them.

use crate::deps::Deps;
use crate::formatting::{self, SIGN_UP_PROMPT};
use crate::keys;
use crate::services::{MemberQuery, Tournament, UserRecord};
use crate::validation::{AttachUser, RequireCallbackValue, RequireUser};
use async_trait::async_trait;
use tournie_core::{
    Chain, Concurrent, Context, FnStep, HandlerError, Outcome, Response, Step, StepResult, Template,
};

/// Shown when no tournament is pending or underway.
pub const NO_OPEN_TOURNAMENTS: &str =
    "There are no open tournaments. Is it time to start one? :thinking_face:";
/// Shown by `signup` when every pending tournament already has the user.
pub const NO_JOINABLE_TOURNAMENTS: &str =
    "There are currently no tournaments where you can sign up.";

/// `tournaments`: the open tournament list, member-aware when the sender is
/// connected.
pub fn list_open_tournaments() -> Chain<Deps> {
    Chain::new()
        .then(AttachUser)
        .then(FetchOpenTournaments)
        .then(FnStep::new("RenderOpenTournaments", |_: &Deps, ctx: Context| {
            let tournaments = keys::require::<Vec<Tournament>>(&ctx, keys::OPEN_TOURNAMENTS)?;
            Ok(Outcome::done(formatting::open_tournaments(
                ctx.get::<UserRecord>(keys::USER),
                tournaments,
            )))
        }))
}

/// `signup`: a select menu of pending tournaments the user has not joined.
pub fn sign_up() -> Chain<Deps> {
    Chain::new()
        .then(RequireUser)
        .then(FetchJoinableTournaments)
        .then(FnStep::new("RenderSignUpMenu", |_: &Deps, ctx: Context| {
            let tournaments =
                keys::require::<Vec<Tournament>>(&ctx, keys::JOINABLE_TOURNAMENTS)?;
            Ok(Outcome::done(formatting::sign_up_menu(tournaments)))
        }))
}

/// `tournament` callback: the "Sign Up" button of the tournament list.
pub fn sign_up_from_list() -> Chain<Deps> {
    sign_up_callback(SignUpReply::Ephemeral)
}

/// `signup` callback: the sign-up select menu.
pub fn sign_up_from_menu() -> Chain<Deps> {
    sign_up_callback(SignUpReply::Menu)
}

fn sign_up_callback(reply: SignUpReply) -> Chain<Deps> {
    Chain::new()
        .then(RequireCallbackValue::new("sign_up").into_field(keys::TOURNAMENT_ID))
        .then(Concurrent::new().with(RequireUser).with(FetchTournament))
        .then(AddParticipant { reply })
}

#[derive(Debug)]
struct FetchOpenTournaments;

#[async_trait]
impl Step<Deps> for FetchOpenTournaments {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let tournaments = match ctx.get::<UserRecord>(keys::USER) {
            Some(user) => {
                deps.tournaments
                    .fetch_open_tournaments_for_member(
                        user.challonge_email_hash.as_deref(),
                        MemberQuery::default(),
                    )
                    .await?
            }
            None => deps.tournaments.fetch_open_tournaments().await?,
        };
        if tournaments.is_empty() {
            return Ok(Outcome::fail(NO_OPEN_TOURNAMENTS));
        }
        Ok(Outcome::Proceed(ctx.with(keys::OPEN_TOURNAMENTS, tournaments)))
    }
}

#[derive(Debug)]
struct FetchJoinableTournaments;

#[async_trait]
impl Step<Deps> for FetchJoinableTournaments {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
        let tournaments = deps
            .tournaments
            .fetch_open_tournaments_for_member(
                user.challonge_email_hash.as_deref(),
                MemberQuery::joinable(),
            )
            .await?;
        if tournaments.is_empty() {
            return Ok(Outcome::fail(NO_JOINABLE_TOURNAMENTS));
        }
        Ok(Outcome::Proceed(
            ctx.with(keys::JOINABLE_TOURNAMENTS, tournaments),
        ))
    }
}

/// Looks up the tournament picked in a sign-up control.
#[derive(Debug)]
struct FetchTournament;

#[async_trait]
impl Step<Deps> for FetchTournament {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let id = keys::require::<String>(&ctx, keys::TOURNAMENT_ID)?;
        match deps.tournaments.fetch_tournament(id).await? {
            Some(tournament) => Ok(Outcome::Proceed(ctx.with(keys::TOURNAMENT, tournament))),
            None => Err(HandlerError::NotFound {
                resource: "Tournament",
                id: id.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SignUpReply {
    /// A new message below the tournament list.
    Ephemeral,
    /// The sign-up menu message, updated in place.
    Menu,
}

#[derive(Debug)]
struct AddParticipant {
    reply: SignUpReply,
}

#[async_trait]
impl Step<Deps> for AddParticipant {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
        let tournament_id = keys::require::<String>(&ctx, keys::TOURNAMENT_ID)?;
        let tournament = keys::require::<Tournament>(&ctx, keys::TOURNAMENT)?;

        deps.tournaments
            .add_tournament_participant(tournament_id, &user.challonge_username)
            .await?;

        let text = format!(
            "Awesome! You are now signed up for tournament *{}.* :tada:",
            tournament.name
        );
        Ok(Outcome::done(match self.reply {
            SignUpReply::Ephemeral => {
                Response::from(Template::with_text(text).replace_original(false))
            }
            SignUpReply::Menu => {
                formatting::followup("signup", format!("{SIGN_UP_PROMPT}\n\n{text}"))
            }
        }))
    }
}
