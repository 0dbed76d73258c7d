use serde::Deserialize;

use crate::domain::{ChatId, MessageId};

/// Uniform shape of one inbound update after normalization.
///
/// Classification runs in strict priority order: message text, then callback
/// query, then message photo. An update carrying both text and a callback
/// context is therefore a [`IncomingEvent::Text`]. Anything else — including
/// a recognized shape missing a required field — degrades to
/// [`IncomingEvent::Unknown`] instead of failing.
#[derive(Clone, Debug)]
pub enum IncomingEvent {
    Text(TextEvent),
    Callback(CallbackEvent),
    Photo(PhotoEvent),
    Unknown(UnknownEvent),
}

/// Message sender as reported by the API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TextEvent {
    pub update_id: i64,
    pub message_id: Option<MessageId>,
    pub chat_id: ChatId,
    pub from: Sender,
    pub request_time: i64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackEvent {
    pub update_id: i64,
    pub message_id: Option<MessageId>,
    pub chat_id: ChatId,
    pub from: Sender,
    pub request_time: i64,
    pub data: String,
}

/// One photo rendition; the API reports several sizes per photo message.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct PhotoEvent {
    pub update_id: i64,
    pub message_id: Option<MessageId>,
    pub chat_id: ChatId,
    pub from: Sender,
    pub request_time: i64,
    pub sizes: Vec<PhotoSize>,
    pub caption: Option<String>,
}

/// An update the normalizer does not recognize. The raw payload is kept for
/// diagnostics only.
#[derive(Clone, Debug)]
pub struct UnknownEvent {
    pub update_id: Option<i64>,
    pub raw: serde_json::Value,
}

impl IncomingEvent {
    /// Update id, when the update carried one.
    pub fn update_id(&self) -> Option<i64> {
        match self {
            Self::Text(e) => Some(e.update_id),
            Self::Callback(e) => Some(e.update_id),
            Self::Photo(e) => Some(e.update_id),
            Self::Unknown(e) => e.update_id,
        }
    }

    /// Chat the event originated from; `None` for unknown events.
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::Text(e) => Some(e.chat_id),
            Self::Callback(e) => Some(e.chat_id),
            Self::Photo(e) => Some(e.chat_id),
            Self::Unknown(_) => None,
        }
    }

    /// Id of the message behind the event, useful as a reply target.
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::Text(e) => e.message_id,
            Self::Callback(e) => e.message_id,
            Self::Photo(e) => e.message_id,
            Self::Unknown(_) => None,
        }
    }

    /// Textual payload: message text or callback data. Photo and unknown
    /// events have none.
    pub fn data_str(&self) -> Option<&str> {
        match self {
            Self::Text(e) => Some(e.text.as_str()),
            Self::Callback(e) => Some(e.data.as_str()),
            Self::Photo(_) | Self::Unknown(_) => None,
        }
    }

    /// `false` only for [`IncomingEvent::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl PhotoEvent {
    /// File id of the first reported size, reusable for a no-upload resend.
    pub fn file_id(&self) -> Option<&str> {
        self.sizes.first().map(|s| s.file_id.as_str())
    }
}
