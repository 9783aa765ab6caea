//! Open matches and score reporting.

use crate::deps::Deps;
use crate::formatting::{self, format_match, format_scores};
use crate::keys;
use crate::scores::parse_scores;
use crate::services::{OpenMatch, UserRecord};
use crate::validation::{RequireCallbackValue, RequireUser};
use async_trait::async_trait;
use tournie_core::{Chain, Context, FnStep, HandlerError, Outcome, Step, StepResult};
use tracing::info;

/// Shown when the user has nothing left to play.
pub const NO_MATCHES: &str = "You have no matches to play. :sweat_smile:";

/// `next`
pub fn list_next_matches() -> Chain<Deps> {
    Chain::new()
        .then(RequireUser)
        .then(FetchOpenMatches)
        .then(FnStep::new("RenderOpenMatches", |_: &Deps, ctx: Context| {
            let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
            let matches = keys::require::<Vec<OpenMatch>>(&ctx, keys::OPEN_MATCHES)?;
            Ok(Outcome::done(formatting::open_matches(user, matches)))
        }))
}

/// `report [<match id>] <a-b> <a-b>...`
///
/// Two or more set scores are reported on the named match, or on the first
/// open match when no id is given. With fewer, the user is asked which
/// match to report or how to write scores.
pub fn report_scores() -> Chain<Deps> {
    Chain::new()
        .then(RequireUser)
        .then(FetchOpenMatches)
        .then(ReportScores)
}

/// Match picked in the menu of `report`: answers with the command that
/// reports on it.
pub fn report_scores_from_menu() -> Chain<Deps> {
    Chain::new()
        .then(RequireCallbackValue::new("report_scores").into_field(keys::MATCH_ID))
        .then(RequireUser)
        .then(FetchOpenMatches)
        .then(DescribeChosenMatch)
}

#[derive(Debug)]
struct FetchOpenMatches;

#[async_trait]
impl Step<Deps> for FetchOpenMatches {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
        let matches = deps
            .tournaments
            .fetch_open_matches_for_member(user.challonge_email_hash.as_deref())
            .await?;
        if matches.is_empty() {
            return Ok(Outcome::fail(NO_MATCHES));
        }
        Ok(Outcome::Proceed(ctx.with(keys::OPEN_MATCHES, matches)))
    }
}

fn find_match<'a>(matches: &'a [OpenMatch], id: &str) -> Option<&'a OpenMatch> {
    matches.iter().find(|m| m.details.id.to_string() == id)
}

/// Tells the user how to report `open_match`, naming its id when the
/// user has more than one match.
fn score_hint(open_match: &OpenMatch, user: &UserRecord, command: &str, with_id: bool) -> String {
    let mut example = String::new();
    if !command.is_empty() {
        example.push_str(command);
        example.push(' ');
    }
    example.push_str("report ");
    if with_id {
        example.push_str(&format!("{} ", open_match.details.id));
    }
    example.push_str("11-7 9-11 11-5");
    format!(
        "Report the set scores of {} ({}) like `{example}`. :memo:",
        format_match(open_match, user.challonge_email_hash.as_deref()),
        open_match.tournament.name
    )
}

#[derive(Debug)]
struct ReportScores;

#[async_trait]
impl Step<Deps> for ReportScores {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
        let matches = keys::require::<Vec<OpenMatch>>(&ctx, keys::OPEN_MATCHES)?;
        let command = ctx.message().command_name();

        let mut args = ctx.message().words().skip(1).peekable();
        let chosen = args.peek().and_then(|word| find_match(matches, word));
        if chosen.is_some() {
            args.next();
        }
        let scores = parse_scores(args).map_err(|e| {
            HandlerError::user_facing(format!("{e}. Write set scores like `11-7`."))
        })?;

        if scores.len() >= 2 {
            let Some(target) = chosen.or_else(|| matches.first()) else {
                return Ok(Outcome::fail(NO_MATCHES));
            };
            deps.tournaments.report_match_scores(target, &scores).await?;
            info!(
                "{} reported {} on match {}",
                user.sender,
                format_scores(&scores),
                target.details.id
            );
            return Ok(Outcome::done(format!(
                "Reported scores on {} ({}): {}",
                format_match(target, user.challonge_email_hash.as_deref()),
                target.tournament.name,
                format_scores(&scores)
            )));
        }

        match (chosen, matches.as_slice()) {
            (Some(only), _) => Ok(Outcome::done(score_hint(only, user, command, true))),
            (None, [only]) => Ok(Outcome::done(score_hint(only, user, command, false))),
            (None, [_, _, ..]) => Ok(Outcome::done(formatting::report_menu(user, matches))),
            (None, []) => Ok(Outcome::fail(NO_MATCHES)),
        }
    }
}

#[derive(Debug)]
struct DescribeChosenMatch;

#[async_trait]
impl Step<Deps> for DescribeChosenMatch {
    async fn run(&self, _deps: &Deps, ctx: Context) -> StepResult {
        let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
        let matches = keys::require::<Vec<OpenMatch>>(&ctx, keys::OPEN_MATCHES)?;
        let id = keys::require::<String>(&ctx, keys::MATCH_ID)?;
        let chosen = find_match(matches, id).ok_or_else(|| HandlerError::NotFound {
            resource: "Match",
            id: id.clone(),
        })?;
        let hint = score_hint(chosen, user, ctx.message().command_name(), true);
        Ok(Outcome::done(formatting::followup("report", hint)))
    }
}
