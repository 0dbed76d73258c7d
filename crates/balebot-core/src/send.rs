//! Outbound send, forward and copy operations.
//!
//! Every media kind shares one parametrized path: resolve the destination,
//! pick JSON or multipart encoding from the media source, invoke the
//! transport, map the response envelope into a [`SendOutcome`].

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::{
    bot::Bot,
    domain::{ChatId, MessageId, MessageRef},
    events::{CallbackEvent, IncomingEvent, PhotoEvent, TextEvent},
    keyboard::InlineKeyboard,
    transport::{self, Body, FormField, Transport},
    Result,
};

/// Message kinds served by the parametrized media-send path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Audio,
    Document,
    Video,
    Animation,
    Voice,
}

impl MediaKind {
    /// API method for this kind.
    pub fn method(self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Audio => "sendAudio",
            Self::Document => "sendDocument",
            Self::Video => "sendVideo",
            Self::Animation => "sendAnimation",
            Self::Voice => "sendVoice",
        }
    }

    /// Payload field carrying the media, also the result echo field.
    pub fn field(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Video => "video",
            Self::Animation => "animation",
            Self::Voice => "voice",
        }
    }

    /// `sendAnimation` takes no caption.
    pub fn supports_caption(self) -> bool {
        !matches!(self, Self::Animation)
    }
}

/// Media argument for the file-bearing send operations.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaSource {
    /// Local file, uploaded via multipart after a presence check.
    File(PathBuf),
    /// API-native file reference, sent as a JSON field with no re-upload.
    FileId(String),
}

impl MediaSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn file_id(id: impl Into<String>) -> Self {
        Self::FileId(id.into())
    }
}

impl From<&Path> for MediaSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl PhotoEvent {
    /// Reference to the received photo, reusable without re-upload.
    pub fn media_source(&self) -> Option<MediaSource> {
        self.file_id().map(MediaSource::file_id)
    }
}

/// Where an outbound operation is aimed.
///
/// Anything already carrying a chat id converts into this (a normalized
/// event, a prior delivery, a message ref); a bare integer is taken as the
/// chat id itself. Forward and copy additionally require the `message_id`
/// the richer forms provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: ChatId,
    pub message_id: Option<MessageId>,
}

impl From<ChatId> for Destination {
    fn from(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            message_id: None,
        }
    }
}

impl From<i64> for Destination {
    fn from(id: i64) -> Self {
        ChatId(id).into()
    }
}

impl From<(i64, i64)> for Destination {
    fn from((chat_id, message_id): (i64, i64)) -> Self {
        Self {
            chat_id: ChatId(chat_id),
            message_id: Some(MessageId(message_id)),
        }
    }
}

impl From<MessageRef> for Destination {
    fn from(m: MessageRef) -> Self {
        Self {
            chat_id: m.chat_id,
            message_id: Some(m.message_id),
        }
    }
}

impl From<&TextEvent> for Destination {
    fn from(e: &TextEvent) -> Self {
        Self {
            chat_id: e.chat_id,
            message_id: e.message_id,
        }
    }
}

impl From<&CallbackEvent> for Destination {
    fn from(e: &CallbackEvent) -> Self {
        Self {
            chat_id: e.chat_id,
            message_id: e.message_id,
        }
    }
}

impl From<&PhotoEvent> for Destination {
    fn from(e: &PhotoEvent) -> Self {
        Self {
            chat_id: e.chat_id,
            message_id: e.message_id,
        }
    }
}

impl From<&Delivery> for Destination {
    fn from(d: &Delivery) -> Self {
        Self {
            chat_id: d.chat_id,
            message_id: Some(d.message_id),
        }
    }
}

impl IncomingEvent {
    /// Destination for replying into the originating chat; `None` for
    /// unknown events, which carry no chat.
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Self::Text(e) => Some(e.into()),
            Self::Callback(e) => Some(e.into()),
            Self::Photo(e) => Some(e.into()),
            Self::Unknown(_) => None,
        }
    }
}

/// Optional per-message parameters shared by every send operation.
#[derive(Clone, Debug, Default)]
pub struct SendOptions {
    pub reply_to_message_id: Option<MessageId>,
    /// Serialized opaquely into the `reply_markup` field.
    pub reply_markup: Option<InlineKeyboard>,
}

impl SendOptions {
    pub fn reply_to(message_id: MessageId) -> Self {
        Self {
            reply_to_message_id: Some(message_id),
            ..Self::default()
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Uniform outcome of every send, forward and copy operation.
///
/// API rejections (`ok: false`) and local pre-flight failures both land in
/// [`SendOutcome::Rejected`]; only transport faults escape as
/// [`crate::Error`].
#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    Delivered(Delivery),
    Rejected(Rejection),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            Self::Delivered(d) => Some(d),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Delivered(_) => None,
            Self::Rejected(r) => Some(r),
        }
    }
}

/// Successful delivery receipt.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    /// Kind-specific echo from the API result, e.g. the stored photo sizes.
    pub echo: Option<Value>,
}

/// API-level or validation-level failure. Recoverable; not a fault.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    pub error: String,
    pub error_code: Option<i64>,
}

impl Rejection {
    fn local(error: impl Into<String>) -> SendOutcome {
        SendOutcome::Rejected(Self {
            error: error.into(),
            error_code: None,
        })
    }
}

/// Shared response-to-result mapping for every outbound operation.
fn map_response(chat_id: ChatId, kind_field: Option<&str>, response: &Value) -> SendOutcome {
    if transport::is_ok(response) {
        let result = response.get("result");
        let Some(message_id) = result.and_then(|r| r.get("message_id")).and_then(Value::as_i64)
        else {
            return Rejection::local("malformed response: result.message_id missing");
        };
        let echo = kind_field
            .and_then(|f| result.and_then(|r| r.get(f)))
            .cloned();
        return SendOutcome::Delivered(Delivery {
            message_id: MessageId(message_id),
            chat_id,
            echo,
        });
    }

    SendOutcome::Rejected(Rejection {
        error: response
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string(),
        error_code: response.get("error_code").and_then(Value::as_i64),
    })
}

fn apply_options(payload: &mut Value, opts: &SendOptions) -> Result<()> {
    if let Some(id) = opts.reply_to_message_id {
        payload["reply_to_message_id"] = json!(id.0);
    }
    if let Some(keyboard) = &opts.reply_markup {
        payload["reply_markup"] = Value::String(keyboard.to_reply_markup()?);
    }
    Ok(())
}

impl<T: Transport> Bot<T> {
    /// Send a plain text message.
    pub async fn send_text(
        &self,
        to: impl Into<Destination>,
        text: &str,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        let dest = to.into();
        let mut payload = json!({
            "chat_id": dest.chat_id,
            "text": text,
        });
        apply_options(&mut payload, &opts)?;

        let response = self
            .transport
            .invoke("sendMessage", Body::Json(payload))
            .await?;
        Ok(map_response(dest.chat_id, None, &response))
    }

    /// Send a media message, uploading a local file or referencing an
    /// API-native file id.
    ///
    /// A local path is checked before any network call: a missing file
    /// returns [`SendOutcome::Rejected`] and the transport is never invoked.
    pub async fn send_media(
        &self,
        kind: MediaKind,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        let dest = to.into();
        let caption = caption.filter(|_| kind.supports_caption());

        match media {
            MediaSource::FileId(file_id) => {
                let mut payload = json!({ "chat_id": dest.chat_id });
                payload[kind.field()] = Value::String(file_id);
                if let Some(c) = caption {
                    payload["caption"] = c.into();
                }
                apply_options(&mut payload, &opts)?;

                let response = self
                    .transport
                    .invoke(kind.method(), Body::Json(payload))
                    .await?;
                Ok(map_response(dest.chat_id, Some(kind.field()), &response))
            }
            MediaSource::File(path) => {
                if !path.exists() {
                    return Ok(Rejection::local(format!(
                        "File not found: {}",
                        path.display()
                    )));
                }

                let mut fields = vec![
                    FormField::text("chat_id", dest.chat_id.0.to_string()),
                    FormField::file(kind.field(), path),
                ];
                if let Some(c) = caption {
                    fields.push(FormField::text("caption", c));
                }
                if let Some(id) = opts.reply_to_message_id {
                    fields.push(FormField::text("reply_to_message_id", id.0.to_string()));
                }
                if let Some(keyboard) = &opts.reply_markup {
                    fields.push(FormField::text(
                        "reply_markup",
                        keyboard.to_reply_markup()?,
                    ));
                }

                let response = self
                    .transport
                    .invoke(kind.method(), Body::Multipart(fields))
                    .await?;
                Ok(map_response(dest.chat_id, Some(kind.field()), &response))
            }
        }
    }

    pub async fn send_photo(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Photo, to, media, caption, opts)
            .await
    }

    pub async fn send_audio(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Audio, to, media, caption, opts)
            .await
    }

    pub async fn send_document(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Document, to, media, caption, opts)
            .await
    }

    pub async fn send_video(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Video, to, media, caption, opts)
            .await
    }

    pub async fn send_animation(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Animation, to, media, None, opts)
            .await
    }

    pub async fn send_voice(
        &self,
        to: impl Into<Destination>,
        media: MediaSource,
        caption: Option<&str>,
        opts: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_media(MediaKind::Voice, to, media, caption, opts)
            .await
    }

    /// Forward a message. `origin` must carry both the source chat and the
    /// message id (an event, delivery or `(chat_id, message_id)` pair does;
    /// a bare chat id does not).
    pub async fn forward(
        &self,
        to: impl Into<Destination>,
        origin: impl Into<Destination>,
    ) -> Result<SendOutcome> {
        self.relay("forwardMessage", to.into(), origin.into()).await
    }

    /// Copy a message into another chat without the forwarded-from header.
    pub async fn copy(
        &self,
        to: impl Into<Destination>,
        origin: impl Into<Destination>,
    ) -> Result<SendOutcome> {
        self.relay("copyMessage", to.into(), origin.into()).await
    }

    async fn relay(
        &self,
        method: &'static str,
        to: Destination,
        origin: Destination,
    ) -> Result<SendOutcome> {
        let Some(message_id) = origin.message_id else {
            return Ok(Rejection::local("origin carries no message_id"));
        };

        let payload = json!({
            "chat_id": to.chat_id,
            "from_chat_id": origin.chat_id,
            "message_id": message_id,
        });
        let response = self.transport.invoke(method, Body::Json(payload)).await?;
        Ok(map_response(to.chat_id, None, &response))
    }
}
