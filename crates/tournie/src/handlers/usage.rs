//! Help text and the unknown-command hint.

use crate::deps::Deps;
use crate::formatting::COLOR;
use crate::validation::RequireCallbackValue;
use async_trait::async_trait;
use tournie_core::{
    Attachment, Chain, Context, FnStep, Outcome, Route, Step, StepResult, Template, ROUTE_KEY,
};

/// One line of the help text: the command syntax and what it does.
pub type UsageEntry = (String, &'static str);

/// `help`: the supported commands with a "Close" button.
pub fn show_usage(entries: Vec<UsageEntry>) -> Chain<Deps> {
    Chain::new().then(ShowUsage { entries })
}

/// `usage` callback: the "Close" button of the help text.
pub fn close_usage() -> Chain<Deps> {
    Chain::new()
        .then(RequireCallbackValue::new("close"))
        .then(FnStep::new("CloseUsage", |_: &Deps, _| {
            Ok(Outcome::done(Template::delete_original()))
        }))
}

#[derive(Debug)]
struct ShowUsage {
    entries: Vec<UsageEntry>,
}

#[async_trait]
impl Step<Deps> for ShowUsage {
    async fn run(&self, _deps: &Deps, ctx: Context) -> StepResult {
        let command = ctx.message().command_name();
        let lines = self
            .entries
            .iter()
            .map(|(syntax, description)| format!("• `{command} {syntax}` to {description}"))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Outcome::done(
            Template::new().attachment(
                Attachment::new("usage")
                    .text(format!("*Supported commands:*\n{lines}"))
                    .color(COLOR)
                    .button("Close", "close", "close"),
            ),
        ))
    }
}

/// Answers free text that matches no command.
#[derive(Debug, Default)]
pub struct UnknownCommandHint;

#[async_trait]
impl Step<Deps> for UnknownCommandHint {
    async fn run(&self, _deps: &Deps, ctx: Context) -> StepResult {
        let token = ctx.get::<Route>(ROUTE_KEY).map(Route::token).unwrap_or_default();
        let help = match ctx.message().command_name() {
            "" => "help".to_string(),
            command => format!("{command} help"),
        };
        Ok(Outcome::done(format!(
            ":trophy: `{token}` is not how you win a game... Try `{help}`."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Fixtures;
    use tokio_test::{assert_err, assert_ok};
    use tournie_core::{Action, Message, Response};

    fn deps() -> Deps {
        Deps::in_memory(Fixtures::default())
    }

    #[tokio::test]
    async fn test_usage_lists_entries() {
        let entries = vec![
            ("[tournaments]".to_string(), "list open tournaments"),
            ("help".to_string(), "show this information"),
        ];
        let message = Message::text("U1", "help").with_command("/tournie");
        let outcome = assert_ok!(show_usage(entries).run(&deps(), Context::new(message)).await);
        let response = outcome.into_response().expect("rendered");
        let attachment = &response.as_template().expect("template").attachments[0];
        assert_eq!(
            attachment.text.as_deref(),
            Some(
                "*Supported commands:*\n\
                 • `/tournie [tournaments]` to list open tournaments\n\
                 • `/tournie help` to show this information"
            )
        );
        assert_eq!(attachment.callback_id, "usage");
        assert_eq!(attachment.actions[0].value.as_deref(), Some("close"));
    }

    #[tokio::test]
    async fn test_close_usage() {
        let message = Message::callback("U1", "usage", vec![Action::button("close", "close")]);
        let outcome = assert_ok!(close_usage().run(&deps(), Context::new(message)).await);
        assert_eq!(
            outcome.into_response(),
            Some(Response::from(Template::delete_original()))
        );

        let message = Message::callback("U1", "usage", vec![]);
        assert_err!(close_usage().run(&deps(), Context::new(message)).await);
    }

    #[tokio::test]
    async fn test_unknown_command_hint() {
        let message = Message::text("U1", "dance").with_command("/tournie");
        let ctx = Context::new(message).with(
            ROUTE_KEY,
            Route::Command {
                token: "dance".to_string(),
            },
        );
        let outcome = assert_ok!(UnknownCommandHint.run(&deps(), ctx).await);
        assert_eq!(
            outcome.into_response(),
            Some(Response::from(
                ":trophy: `dance` is not how you win a game... Try `/tournie help`."
            ))
        );
    }
}
