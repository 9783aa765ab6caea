//! Rendering of domain values into chat messages.
//!
//! Everything here is pure: no lookups, no failures.

use crate::scores::ScorePair;
use crate::services::{Member, OpenMatch, Participant, Tournament, UserRecord};
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tournie_core::{Attachment, MenuOption, Response, Template};

/// Accent color of every attachment.
pub const COLOR: &str = "#252830";

const SELECT_PLACEHOLDER: &str = "Select...";

/// Renders a timestamp as sent by Challonge.
pub fn format_timestamp(timestamp: &str) -> &str {
    timestamp
}

/// Renders a game name, using an emoji for games that have one.
pub fn format_game_name(game_name: &str) -> String {
    match game_name.to_lowercase().as_str() {
        "table tennis" => ":table_tennis_paddle_and_ball:".to_string(),
        "klask" => ":klask:".to_string(),
        _ => game_name.to_string(),
    }
}

/// `*alice* (verified)`
pub fn format_user(user: &UserRecord) -> String {
    format!(
        "*{}* ({})",
        user.challonge_username,
        if user.is_verified() { "verified" } else { "unverified" }
    )
}

/// Game and format, e.g. `:klask: – double elimination`.
pub fn format_tournament_type(game_name: Option<&str>, tournament_type: &str) -> String {
    match game_name {
        Some(game) => format!("{} – {}", format_game_name(game), tournament_type),
        None => tournament_type.to_string(),
    }
}

/// `3 / 16`, or just `3` without a cap.
pub fn format_num_players(participants_count: u32, signup_cap: Option<u32>) -> String {
    match signup_cap {
        Some(cap) => format!("{participants_count} / {cap}"),
        None => participants_count.to_string(),
    }
}

// The pattern is a literal.
#[allow(clippy::expect_used)]
static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)(?:\s[^<>]*)?/?>").expect("valid tag pattern")
});

/// Converts an HTML tournament description into chat markup.
///
/// Line breaks and paragraphs become newlines, bold and italics become
/// `*` and `_`, and every other tag is dropped. A `<` that does not open a
/// tag is kept as text. Entities are decoded after the tags are gone, so
/// an escaped tag shows up literally.
pub fn format_description(description: &str) -> String {
    let markup = HTML_TAG.replace_all(description, |caps: &Captures<'_>| {
        let closing = !caps[1].is_empty();
        match caps[2].to_ascii_lowercase().as_str() {
            "br" => "\n",
            "p" if closing => "\n",
            "b" | "strong" => "*",
            "i" | "em" => "_",
            _ => "",
        }
    });
    decode_html_entities(&markup)
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn format_participant(participant: Option<&Participant>, email_hash: Option<&str>) -> String {
    match participant {
        Some(p) if email_hash.is_some() && p.email_hash.as_deref() == email_hash => {
            format!("*{}* (you)", p.display_name)
        }
        Some(p) => format!("*{}*", p.display_name),
        None => ":grey_question:".to_string(),
    }
}

/// `*alice* (you) vs *bob*`
pub fn format_match(open_match: &OpenMatch, email_hash: Option<&str>) -> String {
    format!(
        "{} vs {}",
        format_participant(open_match.player1.as_ref(), email_hash),
        format_participant(open_match.player2.as_ref(), email_hash)
    )
}

/// `11-7, 9-11`
pub fn format_scores(scores: &[ScorePair]) -> String {
    scores
        .iter()
        .map(ScorePair::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The open tournament list.
///
/// A connected user gets a sign-up button or a "Signed up" field per
/// tournament. Anyone else gets a link to the sign-up page of tournaments
/// that have not started.
pub fn open_tournaments(user: Option<&UserRecord>, tournaments: &[Tournament]) -> Response {
    tournaments
        .iter()
        .fold(
            Template::with_text("*:trophy: Open tournaments: :trophy:*"),
            |template, t| template.attachment(tournament_attachment(user, t)),
        )
        .into()
}

fn tournament_attachment(user: Option<&UserRecord>, t: &Tournament) -> Attachment {
    let mut attachment = Attachment::new("tournament")
        .title(t.name.clone(), t.full_challonge_url.clone())
        .color(COLOR)
        .field(
            "Tournament",
            format_tournament_type(t.game_name.as_deref(), &t.tournament_type),
            true,
        )
        .field(
            "# Players",
            format_num_players(t.participants_count, t.signup_cap),
            true,
        );
    if let Some(description) = t.description.as_deref().filter(|d| !d.is_empty()) {
        attachment = attachment.text(format_description(description));
    }
    attachment = match &t.started_at {
        Some(started_at) => attachment.field("Started", format_timestamp(started_at), true),
        None => attachment.field("Created", format_timestamp(&t.created_at), true),
    };
    attachment = attachment.field(
        "State",
        format!("{} ({}%)", t.state, t.progress_meter),
        true,
    );

    match (user, &t.sign_up_url) {
        (Some(_), _) if t.is_signed_up == Some(true) => {
            attachment.field("Signed up", "Yes", true)
        }
        (Some(_), _) => attachment.button("Sign Up", "sign_up", t.id.to_string()),
        (None, Some(url)) if t.started_at.is_none() => {
            attachment.link_button("Sign Up", url.clone())
        }
        (None, _) => attachment,
    }
}

/// The user's unplayed matches.
pub fn open_matches(user: &UserRecord, matches: &[OpenMatch]) -> Response {
    let email_hash = user.challonge_email_hash.as_deref();
    matches
        .iter()
        .fold(
            Template::with_text("*:trophy: Your open matches: :trophy:*"),
            |template, m| {
                template.attachment(
                    Attachment::new("match")
                        .title(m.tournament.name.clone(), m.tournament.full_challonge_url.clone())
                        .text(format_match(m, email_hash))
                        .color(COLOR)
                        .field(
                            "Tournament",
                            format!(
                                "{} ({}%)",
                                format_tournament_type(
                                    m.tournament.game_name.as_deref(),
                                    &m.tournament.tournament_type
                                ),
                                m.tournament.progress_meter
                            ),
                            true,
                        )
                        .field(
                            "Match opened",
                            m.details
                                .started_at
                                .as_deref()
                                .map_or("Pending opponent", format_timestamp),
                            true,
                        ),
                )
            },
        )
        .into()
}

fn menu(callback_id: &str, text: &str, name: &str, options: Vec<MenuOption>) -> Response {
    Template::new()
        .attachment(
            Attachment::new(callback_id)
                .text(text)
                .color(COLOR)
                .select(name, SELECT_PLACEHOLDER, options),
        )
        .into()
}

/// Prompt of the sign-up menu.
pub const SIGN_UP_PROMPT: &str = "What tournament do you want to join? :simple_smile:";
pub const LOGIN_PROMPT: &str = "Who are you? :simple_smile:";
pub const REPORT_PROMPT: &str = "What match do you want to report? :simple_smile:";

/// Select menu of tournaments to join.
pub fn sign_up_menu(tournaments: &[Tournament]) -> Response {
    menu(
        "signup",
        SIGN_UP_PROMPT,
        "sign_up",
        tournaments
            .iter()
            .map(|t| MenuOption::new(t.name.clone(), t.id.to_string()))
            .collect(),
    )
}

/// Select menu of Challonge members.
pub fn login_menu(members: &[Member]) -> Response {
    menu(
        "login",
        LOGIN_PROMPT,
        "username",
        members
            .iter()
            .map(|m| MenuOption::new(m.username.clone(), m.username.clone()))
            .collect(),
    )
}

/// Select menu of matches to report.
pub fn report_menu(user: &UserRecord, matches: &[OpenMatch]) -> Response {
    let email_hash = user.challonge_email_hash.as_deref();
    menu(
        "report",
        REPORT_PROMPT,
        "report_scores",
        matches
            .iter()
            .map(|m| {
                MenuOption::new(
                    format!("{} – {}", m.tournament.name, format_match(m, email_hash)),
                    m.details.id.to_string(),
                )
            })
            .collect(),
    )
}

/// A single colored attachment that replaces an interactive message.
pub fn followup(callback_id: &str, text: impl Into<String>) -> Response {
    Template::new()
        .attachment(Attachment::new(callback_id).text(text).color(COLOR))
        .into()
}
