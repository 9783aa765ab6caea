//! Reusable validation steps.
//!
//! The user steps look the sender up in the [`UserDirectory`]. Expected
//! rejections (unknown user, already connected) are `Fail` outcomes; only
//! a callback without a usable value raises an error.
//!
//! [`UserDirectory`]: crate::services::UserDirectory

use crate::deps::Deps;
use crate::formatting::format_user;
use crate::keys;
use async_trait::async_trait;
use tournie_core::{
    callback_value, Context, ContextKey, HandlerError, Outcome, Step, StepResult, Template,
};
use tracing::debug;

/// Shown when the sender has not connected an account.
pub const UNKNOWN_USER: &str = "I don't know who you are. :crying_cat_face:";

/// Attaches the sender's user record, or fails with [`UNKNOWN_USER`].
#[derive(Debug, Default)]
pub struct RequireUser;

#[async_trait]
impl Step<Deps> for RequireUser {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        match deps.users.get_user(&ctx.message().sender).await? {
            Some(user) => Ok(Outcome::Proceed(ctx.with(keys::USER, user))),
            None => {
                debug!("Unknown sender {}", ctx.message().sender);
                Ok(Outcome::fail(
                    Template::with_text(UNKNOWN_USER).replace_original(false),
                ))
            }
        }
    }
}

/// Fails when the sender is already connected.
#[derive(Debug, Default)]
pub struct RequireNoUser;

#[async_trait]
impl Step<Deps> for RequireNoUser {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        match deps.users.get_user(&ctx.message().sender).await? {
            Some(user) => Ok(Outcome::fail(
                Template::with_text(format!(
                    "You are already logged in as {}. :angry:",
                    format_user(&user)
                ))
                .replace_original(false),
            )),
            None => Ok(Outcome::Proceed(ctx)),
        }
    }
}

/// Attaches the sender's user record when there is one. Never fails.
#[derive(Debug, Default)]
pub struct AttachUser;

#[async_trait]
impl Step<Deps> for AttachUser {
    async fn run(&self, deps: &Deps, ctx: Context) -> StepResult {
        Ok(Outcome::Proceed(
            match deps.users.get_user(&ctx.message().sender).await? {
                Some(user) => ctx.with(keys::USER, user),
                None => ctx,
            },
        ))
    }
}

/// Attaches the value submitted through an interactive action.
///
/// The first action called `action` is read: its first selected option
/// when it carries a selection list, its literal value otherwise. The
/// value is stored as a `String` under [`keys::CALLBACK_VALUE`] unless
/// another field is chosen with [`RequireCallbackValue::into_field`].
///
/// # Errors
///
/// Raises [`HandlerError::InvalidCallbackAction`] when no value was
/// submitted.
#[derive(Debug, Clone)]
pub struct RequireCallbackValue {
    action: String,
    field: ContextKey,
}

impl RequireCallbackValue {
    /// Reads the action called `action`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            field: ContextKey::new(keys::CALLBACK_VALUE),
        }
    }

    /// Stores the value under `field` instead.
    pub fn into_field(mut self, field: impl Into<ContextKey>) -> Self {
        self.field = field.into();
        self
    }
}

#[async_trait]
impl<D: Send + Sync> Step<D> for RequireCallbackValue {
    async fn run(&self, _deps: &D, ctx: Context) -> StepResult {
        let request = &ctx.message().original_request;
        match callback_value(&request.actions, &self.action) {
            Some(value) => {
                let value = value.to_string();
                Ok(Outcome::Proceed(ctx.with(self.field.clone(), value)))
            }
            None => Err(HandlerError::InvalidCallbackAction {
                callback_id: request.callback_id.clone().unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Fixtures, UserRecord};
    use tokio_test::{assert_err, assert_ok};
    use tournie_core::{Action, Message, Response};

    fn deps() -> Deps {
        Deps::in_memory(Fixtures {
            users: vec![UserRecord {
                sender: "U1".to_string(),
                challonge_username: "alice".to_string(),
                challonge_email_hash: None,
            }],
            ..Fixtures::default()
        })
    }

    fn text(sender: &str) -> Context {
        Context::new(Message::text(sender, "whoami"))
    }

    #[tokio::test]
    async fn test_require_user() {
        let deps = deps();
        let outcome = assert_ok!(RequireUser.run(&deps, text("U1")).await);
        let ctx = outcome.into_context().expect("user is known");
        assert_eq!(
            ctx.get::<UserRecord>(keys::USER).map(|u| u.challonge_username.as_str()),
            Some("alice")
        );

        let outcome = assert_ok!(RequireUser.run(&deps, text("U2")).await);
        assert_eq!(
            outcome.into_response(),
            Some(Response::from(
                Template::with_text(UNKNOWN_USER).replace_original(false)
            ))
        );
    }

    #[tokio::test]
    async fn test_require_no_user() {
        let deps = deps();
        let outcome = assert_ok!(RequireNoUser.run(&deps, text("U2")).await);
        assert!(outcome.is_proceed());

        let outcome = assert_ok!(RequireNoUser.run(&deps, text("U1")).await);
        let response = outcome.into_response().expect("already connected");
        assert_eq!(
            response.text(),
            Some("You are already logged in as *alice* (unverified). :angry:")
        );
    }

    #[tokio::test]
    async fn test_attach_user_never_fails() {
        let deps = deps();
        let ctx = assert_ok!(AttachUser.run(&deps, text("U1")).await)
            .into_context()
            .expect("proceeds");
        assert!(ctx.contains_key(keys::USER));

        let ctx = assert_ok!(AttachUser.run(&deps, text("U2")).await)
            .into_context()
            .expect("proceeds");
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn test_require_callback_value() {
        let ctx = Context::new(Message::callback(
            "U1",
            "tournament-1",
            vec![Action::button("sign_up", "t42")],
        ));
        let ctx = assert_ok!(RequireCallbackValue::new("sign_up").run(&(), ctx).await)
            .into_context()
            .expect("value present");
        assert_eq!(
            ctx.get::<String>(keys::CALLBACK_VALUE).map(String::as_str),
            Some("t42")
        );
    }

    #[tokio::test]
    async fn test_require_callback_value_into_field() {
        let ctx = Context::new(Message::callback(
            "U1",
            "signup",
            vec![Action::selection("sign_up", &["3003", "3001"])],
        ));
        let step = RequireCallbackValue::new("sign_up").into_field(keys::TOURNAMENT_ID);
        let ctx = assert_ok!(step.run(&(), ctx).await)
            .into_context()
            .expect("value present");
        assert_eq!(
            ctx.get::<String>(keys::TOURNAMENT_ID).map(String::as_str),
            Some("3003")
        );
        assert!(!ctx.contains_key(keys::CALLBACK_VALUE));
    }

    #[tokio::test]
    async fn test_missing_callback_value_names_callback() {
        let action = Action {
            name: "sign_up".to_string(),
            ..Action::default()
        };
        let ctx = Context::new(Message::callback("U1", "tournament-1", vec![action]));
        let error = assert_err!(RequireCallbackValue::new("sign_up").run(&(), ctx).await);
        assert_eq!(
            error.to_string(),
            "Invalid action value(s) for callback: tournament-1"
        );
        assert!(error.is_user_facing());
    }
}
