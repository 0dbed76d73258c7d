//! Inline keyboard building.
//!
//! The send path treats the serialized keyboard as an opaque string placed
//! in the `reply_markup` field.

use serde::Serialize;

use crate::Result;

/// One inline button: either a callback or a link.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

/// Ordered rows of inline buttons.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct InlineKeyboard {
    rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// Serialize into the `reply_markup` JSON string the API expects.
    pub fn to_reply_markup(&self) -> Result<String> {
        let markup = serde_json::json!({ "inline_keyboard": self.rows });
        Ok(serde_json::to_string(&markup)?)
    }
}
