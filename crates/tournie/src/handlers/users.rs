//! Connecting chat users to Challonge accounts.

use crate::deps::Deps;
use crate::formatting::{self, format_user, LOGIN_PROMPT};
use crate::keys;
use crate::services::{Member, UserRecord};
use crate::validation::{RequireCallbackValue, RequireNoUser, RequireUser};
use async_trait::async_trait;
use tournie_core::{Chain, Context, FnStep, HandlerError, Outcome, Step, StepResult};
use tracing::info;

/// Reply to `disconnect`.
pub const FORGOTTEN: &str = "Okay, you are now forgotten. I hope to see you later! :wave:";

/// `whoami`
pub fn show_current_user() -> Chain<Deps> {
    Chain::new()
        .then(RequireUser)
        .then(FnStep::new("ShowCurrentUser", |_: &Deps, ctx: Context| {
            let user = keys::require::<UserRecord>(&ctx, keys::USER)?;
            Ok(Outcome::done(format!(
                "You are known as {}. :ok_hand:",
                format_user(user)
            )))
        }))
}

/// `connect [<challonge_username>]`
///
/// Without a username the user picks one from the member list.
pub fn log_in() -> Chain<Deps> {
    Chain::new().then(RequireNoUser).then(LogIn)
}

/// `login` callback: the username picked in the member menu.
pub fn log_in_from_menu() -> Chain<Deps> {
    Chain::new()
        .then(RequireNoUser)
        .then(RequireCallbackValue::new("username").into_field(keys::CHALLONGE_USERNAME))
        .then(ConfirmLogIn)
}

/// `disconnect`
pub fn log_out() -> Chain<Deps> {
    Chain::new().then(RequireUser).then(LogOut)
}

fn congrats(user: &UserRecord) -> String {
    format!("Congrats! You are now known as {}. :tada:", format_user(user))
}

/// Stores the sender under `username`, verified when a member matches.
async fn connect(
    deps: &Deps,
    sender: &str,
    username: &str,
    members: &[Member],
) -> Result<UserRecord, HandlerError> {
    let email_hash = members
        .iter()
        .find(|m| m.username == username)
        .and_then(|m| m.email_hash.as_deref());
    let user = deps.users.add_user(sender, username, email_hash).await?;
    info!("Connected {} to Challonge user '{}'", sender, username);
    Ok(user)
}

#[derive(Debug)]
struct LogIn;

#[async_trait]
impl Step<Deps> for LogIn {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let members = deps.tournaments.fetch_members().await?;
        let message = ctx.message();
        match message.words().nth(1) {
            Some(username) => {
                let user = connect(deps, &message.sender, username, &members).await?;
                Ok(Outcome::done(congrats(&user)))
            }
            None => Ok(Outcome::done(formatting::login_menu(&members))),
        }
    }
}

#[derive(Debug)]
struct ConfirmLogIn;

#[async_trait]
impl Step<Deps> for ConfirmLogIn {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        let username = keys::require::<String>(&ctx, keys::CHALLONGE_USERNAME)?;
        let members = deps.tournaments.fetch_members().await?;
        let user = connect(deps, &ctx.message().sender, username, &members).await?;
        Ok(Outcome::done(formatting::followup(
            "login_verified",
            format!("{LOGIN_PROMPT}\n\n{}", congrats(&user)),
        )))
    }
}

#[derive(Debug)]
struct LogOut;

#[async_trait]
impl Step<Deps> for LogOut {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        deps.users.delete_user(&ctx.message().sender).await?;
        Ok(Outcome::done(FORGOTTEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Fixtures;
    use crate::validation::UNKNOWN_USER;
    use tokio_test::{assert_err, assert_ok};
    use tournie_core::{Action, Message, Response};

    fn deps() -> Deps {
        Deps::in_memory(
            Fixtures::from_json(include_str!("../../fixtures/demo.json")).expect("valid fixtures"),
        )
    }

    async fn reply(pipeline: Chain<Deps>, deps: &Deps, message: Message) -> Response {
        assert_ok!(pipeline.run(deps, Context::new(message)).await)
            .into_response()
            .expect("pipeline responds")
    }

    #[tokio::test]
    async fn test_whoami() {
        let deps = deps();
        let message = Message::text("U024BE7LH", "whoami");
        let response = reply(show_current_user(), &deps, message).await;
        assert_eq!(
            response.text(),
            Some("You are known as *alice* (verified). :ok_hand:")
        );

        let response = reply(show_current_user(), &deps, Message::text("U2", "whoami")).await;
        assert_eq!(response.text(), Some(UNKNOWN_USER));
    }

    #[tokio::test]
    async fn test_connect_with_username() {
        let deps = deps();
        let response = reply(log_in(), &deps, Message::text("U2", "connect carol")).await;
        assert_eq!(
            response.text(),
            Some("Congrats! You are now known as *carol* (verified). :tada:")
        );

        let response = reply(log_in(), &deps, Message::text("U3", "login zed")).await;
        assert_eq!(
            response.text(),
            Some("Congrats! You are now known as *zed* (unverified). :tada:")
        );
    }

    #[tokio::test]
    async fn test_connect_without_username_offers_members() {
        let response = reply(log_in(), &deps(), Message::text("U2", "connect")).await;
        let control = &response.as_template().expect("template").attachments[0].actions[0];
        assert_eq!(control.name.as_deref(), Some("username"));
        let names = control.options.iter().map(|o| o.text.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave", "erin"]);
    }

    #[tokio::test]
    async fn test_connect_when_already_connected() {
        let response = reply(log_in(), &deps(), Message::text("U024BE7LH", "connect bob")).await;
        assert_eq!(
            response.text(),
            Some("You are already logged in as *alice* (verified). :angry:")
        );
    }

    #[tokio::test]
    async fn test_log_in_from_menu() {
        let deps = deps();
        let message = Message::callback(
            "U2",
            "login",
            vec![Action::selection("username", &["dave"])],
        );
        let response = reply(log_in_from_menu(), &deps, message).await;
        let text = response.as_template().expect("template").attachments[0]
            .text
            .clone()
            .unwrap_or_default();
        assert!(text.starts_with(LOGIN_PROMPT));
        assert!(text.ends_with("*dave* (verified). :tada:"));
        assert!(assert_ok!(deps.users.get_user("U2").await).is_some());
    }

    #[tokio::test]
    async fn test_log_in_from_menu_without_selection() {
        let message = Message::callback("U2", "login", vec![Action::selection("username", &[])]);
        let error = assert_err!(
            log_in_from_menu()
                .run(&deps(), Context::new(message))
                .await
        );
        assert!(matches!(error, HandlerError::InvalidCallbackAction { .. }));
    }

    #[tokio::test]
    async fn test_disconnect() {
        let deps = deps();
        let response = reply(log_out(), &deps, Message::text("U024BE7LH", "disconnect")).await;
        assert_eq!(response, Response::from(FORGOTTEN));

        let response = reply(log_out(), &deps, Message::text("U024BE7LH", "disconnect")).await;
        assert_eq!(response.text(), Some(UNKNOWN_USER));
    }
}
