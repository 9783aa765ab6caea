//! Inbound message model.

use serde::{Deserialize, Serialize};

/// A message received from the chat platform.
///
/// `original_request` is the platform payload the transport handed over:
/// the slash command name, the interactive callback id and the actions the
/// user triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Platform id of the user who sent the message.
    pub sender: String,
    /// Raw text following the slash command.
    #[serde(default)]
    pub text: String,
    /// Platform-specific request payload.
    #[serde(default, rename = "originalRequest")]
    pub original_request: OriginalRequest,
}

impl Message {
    /// Creates a plain text message.
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            original_request: OriginalRequest::default(),
        }
    }

    /// Creates an interactive callback message.
    pub fn callback(
        sender: impl Into<String>,
        callback_id: impl Into<String>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            sender: sender.into(),
            text: String::new(),
            original_request: OriginalRequest {
                callback_id: Some(callback_id.into()),
                actions,
                ..OriginalRequest::default()
            },
        }
    }

    /// Sets the slash command name used in help texts.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.original_request.command = Some(command.into());
        self
    }

    /// Returns the callback id if it is present and non-empty.
    pub fn callback_id(&self) -> Option<&str> {
        self.original_request
            .callback_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Returns the slash command name, or an empty string when unknown.
    pub fn command_name(&self) -> &str {
        self.original_request.command.as_deref().unwrap_or_default()
    }

    /// Iterates over the whitespace separated words of the text.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// The platform request payload carried by a [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalRequest {
    /// Slash command name, e.g. `/tournie`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Interactive callback id, e.g. `tournament-42`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    /// Interactive actions triggered by the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// An interactive action: a button press or a menu selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name as declared by the rendered control.
    pub name: String,
    /// Literal value of a button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Options picked in a select menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_options: Option<Vec<SelectedOption>>,
}

impl Action {
    /// A button press carrying a literal value.
    pub fn button(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            selected_options: None,
        }
    }

    /// A select menu submission.
    pub fn selection(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            value: None,
            selected_options: Some(
                values
                    .iter()
                    .map(|value| SelectedOption {
                        value: (*value).to_string(),
                    })
                    .collect(),
            ),
        }
    }

    /// Returns the value submitted with this action.
    ///
    /// A selection list takes precedence over the literal value; the
    /// literal is never consulted when a selection list is present.
    pub fn submitted_value(&self) -> Option<&str> {
        let value = match &self.selected_options {
            Some(options) => options.first().map(|option| option.value.as_str()),
            None => self.value.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// One option picked in a select menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Value of the selected option.
    pub value: String,
}

/// Finds the value submitted for `action_name`.
///
/// Only the first action entry with that name is considered.
pub fn callback_value<'a>(actions: &'a [Action], action_name: &str) -> Option<&'a str> {
    actions
        .iter()
        .find(|action| action.name == action_name)
        .and_then(Action::submitted_value)
}
