//! Renderable responses.
//!
//! A pipeline resolves to a [`Response`]: either a plain string or a
//! structured [`Template`] with attachments, fields and interactive
//! controls. The engine never inspects the shape; it hands it back to the
//! transport unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A response returned to the chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Plain text.
    Text(String),
    /// Rich message.
    Template(Template),
}

impl Response {
    /// Returns the top-level text of the response, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Response::Text(text) => Some(text),
            Response::Template(template) => template.text.as_deref(),
        }
    }

    /// Returns the template if this is a rich response.
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Response::Text(_) => None,
            Response::Template(template) => Some(template),
        }
    }

    /// Serialises the response to JSON.
    pub fn to_json(&self) -> String {
        // Serialising plain strings, options and vectors cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Text(text) => write!(f, "{text}"),
            Response::Template(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<String> for Response {
    fn from(s: String) -> Self {
        Response::Text(s)
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Response::Text(s.to_string())
    }
}

impl From<Template> for Response {
    fn from(template: Template) -> Self {
        Response::Template(template)
    }
}

/// A rich message made of a title text and attachments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Text shown above the attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Whether the response replaces the message that triggered it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_original: Option<bool>,
    /// Whether the message that triggered the response is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_original: Option<bool>,
    /// Attachments in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Template {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a template with a title text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A response asking the platform to delete the original message.
    pub fn delete_original() -> Self {
        Self {
            delete_original: Some(true),
            ..Self::default()
        }
    }

    /// Sets whether the original message is replaced.
    pub fn replace_original(mut self, replace: bool) -> Self {
        self.replace_original = Some(replace);
        self
    }

    /// Appends an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// A block of a [`Template`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Callback id sent back when a control of this attachment is used.
    pub callback_id: String,
    /// Attachment title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Link behind the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Side bar color, e.g. `#252830`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Key/value fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Buttons and select menus.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Control>,
}

impl Attachment {
    /// Creates an attachment with the given callback id.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Self::default()
        }
    }

    /// Sets the title and its link.
    pub fn title(mut self, title: impl Into<String>, link: Option<String>) -> Self {
        self.title = Some(title.into());
        self.title_link = link;
        self
    }

    /// Sets the body text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the color.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Appends a field.
    pub fn field(
        mut self,
        title: impl Into<String>,
        value: impl Into<String>,
        short: bool,
    ) -> Self {
        self.fields.push(Field {
            title: title.into(),
            value: value.into(),
            short,
        });
        self
    }

    /// Appends a button sending `value` under action `name`.
    pub fn button(
        mut self,
        text: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.actions.push(Control {
            kind: ControlKind::Button,
            text: text.into(),
            name: Some(name.into()),
            value: Some(value.into()),
            url: None,
            options: Vec::new(),
        });
        self
    }

    /// Appends a button opening `url`.
    pub fn link_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.actions.push(Control {
            kind: ControlKind::Button,
            text: text.into(),
            name: None,
            value: None,
            url: Some(url.into()),
            options: Vec::new(),
        });
        self
    }

    /// Appends a select menu.
    pub fn select(
        mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        options: Vec<MenuOption>,
    ) -> Self {
        self.actions.push(Control {
            kind: ControlKind::Select,
            text: text.into(),
            name: Some(name.into()),
            value: None,
            url: None,
            options,
        });
        self
    }
}

/// A key/value field of an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field label.
    pub title: String,
    /// Field value.
    pub value: String,
    /// Whether the field is rendered side by side with others.
    pub short: bool,
}

/// Kind of an interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// A button.
    Button,
    /// A select menu.
    Select,
}

/// An interactive control of an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Control kind.
    #[serde(rename = "type")]
    pub kind: ControlKind,
    /// Label.
    pub text: String,
    /// Action name sent back to the bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value sent back for buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Target of link buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Menu options for select menus.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<MenuOption>,
}

/// An option of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    /// Label.
    pub text: String,
    /// Value sent back when picked.
    pub value: String,
}

impl MenuOption {
    /// Creates a menu option.
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}
