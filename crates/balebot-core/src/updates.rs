//! `getUpdates` polling and update normalization.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    bot::Bot,
    domain::{ChatId, MessageId},
    events::{
        CallbackEvent, IncomingEvent, PhotoEvent, PhotoSize, Sender, TextEvent, UnknownEvent,
    },
    session::Session,
    transport::{self, Body, Transport},
    Error, Result,
};

/// Native update envelope as delivered by `getUpdates`.
///
/// Inner fields are all optional so a shape this library does not know
/// degrades during normalization instead of failing the whole batch.
#[derive(Clone, Debug, Deserialize)]
pub struct RawUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<RawMessage>,
    #[serde(default)]
    pub callback_query: Option<RawCallbackQuery>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub chat: Option<RawChat>,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawChat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawCallbackQuery {
    #[serde(default)]
    pub message: Option<RawMessage>,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Map a raw update into the uniform event shape.
///
/// Tests run in strict order: message text, then callback query, then
/// message photo. The first matching test decides the classification, so a
/// message carrying both text and a callback context is a text event. A
/// matched shape missing a required field (chat id, sender, date, payload)
/// degrades to [`IncomingEvent::Unknown`] — normalization never errors.
pub fn normalize(raw: &Value) -> IncomingEvent {
    let unknown = || {
        IncomingEvent::Unknown(UnknownEvent {
            update_id: raw.get("update_id").and_then(Value::as_i64),
            raw: raw.clone(),
        })
    };

    let Ok(update) = serde_json::from_value::<RawUpdate>(raw.clone()) else {
        return unknown();
    };

    if let Some(msg) = update.message.as_ref().filter(|m| m.text.is_some()) {
        return text_event(update.update_id, msg).unwrap_or_else(unknown);
    }
    if let Some(cb) = update.callback_query.as_ref() {
        return callback_event(update.update_id, cb).unwrap_or_else(unknown);
    }
    if let Some(msg) = update.message.as_ref().filter(|m| m.photo.is_some()) {
        return photo_event(update.update_id, msg).unwrap_or_else(unknown);
    }
    unknown()
}

fn text_event(update_id: i64, msg: &RawMessage) -> Option<IncomingEvent> {
    Some(IncomingEvent::Text(TextEvent {
        update_id,
        message_id: msg.message_id.map(MessageId),
        chat_id: ChatId(msg.chat.as_ref()?.id),
        from: msg.from.clone()?,
        request_time: msg.date?,
        text: msg.text.clone()?,
    }))
}

fn callback_event(update_id: i64, cb: &RawCallbackQuery) -> Option<IncomingEvent> {
    let msg = cb.message.as_ref()?;
    Some(IncomingEvent::Callback(CallbackEvent {
        update_id,
        message_id: msg.message_id.map(MessageId),
        chat_id: ChatId(msg.chat.as_ref()?.id),
        from: cb.from.clone()?,
        request_time: cb.date?,
        data: cb.data.clone()?,
    }))
}

fn photo_event(update_id: i64, msg: &RawMessage) -> Option<IncomingEvent> {
    Some(IncomingEvent::Photo(PhotoEvent {
        update_id,
        message_id: msg.message_id.map(MessageId),
        chat_id: ChatId(msg.chat.as_ref()?.id),
        from: msg.from.clone()?,
        request_time: msg.date?,
        sizes: msg.photo.clone()?,
        caption: msg.caption.clone(),
    }))
}

impl<T: Transport> Bot<T> {
    /// Block until the next update is available and return it normalized.
    ///
    /// Polls `getUpdates` with `offset = last seen id + 1`. Within a batch,
    /// the first update carrying an `update_id` advances the session cursor
    /// to that id and is returned immediately; later batch items are
    /// re-delivered by the server on the next call. An empty batch repeats
    /// the poll, sleeping [`crate::bot::PollOptions::idle_delay`] between
    /// attempts when one is configured.
    ///
    /// The call returns only once an update arrives, the poll is cancelled
    /// ([`Error::Cancelled`]), or the transport faults.
    pub async fn next_event(&self, session: &mut Session) -> Result<IncomingEvent> {
        loop {
            if self.poll.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let payload = serde_json::json!({ "offset": session.offset() });
            let response = tokio::select! {
                _ = self.poll.cancel.cancelled() => return Err(Error::Cancelled),
                res = self.transport.invoke("getUpdates", Body::Json(payload)) => res?,
            };

            let items = match response.get("result").and_then(Value::as_array) {
                Some(items) if !items.is_empty() => items,
                _ => {
                    if !transport::is_ok(&response) {
                        tracing::warn!("getUpdates returned ok=false, treating as empty batch");
                    }
                    if let Some(delay) = self.poll.idle_delay {
                        tokio::select! {
                            _ = self.poll.cancel.cancelled() => return Err(Error::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    continue;
                }
            };

            for item in items {
                let Some(update_id) = item.get("update_id").and_then(Value::as_i64) else {
                    continue;
                };
                session.advance(update_id);
                let event = normalize(item);
                if let Some(chat_id) = event.chat_id() {
                    tracing::debug!(chat_id = chat_id.0, update_id, "update received");
                }
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::BotConfig;
    use crate::transport::mock::MockTransport;

    fn session() -> Session {
        Session::new(BotConfig::new("123:TEST"))
    }

    fn updates_response(items: Vec<Value>) -> Value {
        json!({ "ok": true, "result": items })
    }

    fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
        json!({
            "update_id": update_id,
            "message": {
                "message_id": 7,
                "chat": { "id": chat_id },
                "from": { "id": 1 },
                "date": 100,
                "text": text,
            }
        })
    }

    #[tokio::test]
    async fn text_message_normalizes_with_all_fields() {
        let batch = updates_response(vec![text_update(5, 9, "hi")]);
        let bot = Bot::new(MockTransport::new(vec![batch]));
        let mut session = session();

        let event = bot.next_event(&mut session).await.unwrap();

        assert_eq!(session.last_update_id(), 5);
        match event {
            IncomingEvent::Text(t) => {
                assert_eq!(t.update_id, 5);
                assert_eq!(t.message_id, Some(MessageId(7)));
                assert_eq!(t.chat_id, ChatId(9));
                assert_eq!(t.from.id, 1);
                assert_eq!(t.request_time, 100);
                assert_eq!(t.text, "hi");
            }
            other => panic!("expected text event, got {other:?}"),
        }
    }

    #[test]
    fn text_wins_over_callback() {
        let raw = json!({
            "update_id": 1,
            "message": {
                "chat": { "id": 9 },
                "from": { "id": 1 },
                "date": 100,
                "text": "hi",
            },
            "callback_query": {
                "message": { "chat": { "id": 9 } },
                "from": { "id": 1 },
                "date": 100,
                "data": "pressed",
            }
        });
        assert!(matches!(normalize(&raw), IncomingEvent::Text(_)));
    }

    #[test]
    fn callback_normalizes_from_its_message_context() {
        let raw = json!({
            "update_id": 2,
            "callback_query": {
                "message": { "message_id": 12, "chat": { "id": 9 } },
                "from": { "id": 1, "username": "u" },
                "date": 200,
                "data": "pressed",
            }
        });
        match normalize(&raw) {
            IncomingEvent::Callback(cb) => {
                assert_eq!(cb.update_id, 2);
                assert_eq!(cb.message_id, Some(MessageId(12)));
                assert_eq!(cb.chat_id, ChatId(9));
                assert_eq!(cb.request_time, 200);
                assert_eq!(cb.data, "pressed");
            }
            other => panic!("expected callback event, got {other:?}"),
        }
    }

    #[test]
    fn photo_normalizes_with_sizes_and_caption() {
        let raw = json!({
            "update_id": 3,
            "message": {
                "message_id": 13,
                "chat": { "id": 9 },
                "from": { "id": 1 },
                "date": 300,
                "photo": [
                    { "file_id": "small", "width": 90, "height": 90 },
                    { "file_id": "big", "width": 800, "height": 800 },
                ],
                "caption": "look",
            }
        });
        match normalize(&raw) {
            IncomingEvent::Photo(p) => {
                assert_eq!(p.sizes.len(), 2);
                assert_eq!(p.file_id(), Some("small"));
                assert_eq!(p.caption.as_deref(), Some("look"));
            }
            other => panic!("expected photo event, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_shape_degrades_to_unknown() {
        let raw = json!({
            "update_id": 4,
            "edited_message": { "text": "nope" }
        });
        match normalize(&raw) {
            IncomingEvent::Unknown(u) => assert_eq!(u.update_id, Some(4)),
            other => panic!("expected unknown event, got {other:?}"),
        }
    }

    #[test]
    fn text_missing_chat_degrades_instead_of_reclassifying() {
        // Classification locks on the text test; a broken text shape must
        // not fall through to the callback branch.
        let raw = json!({
            "update_id": 5,
            "message": { "text": "hi", "date": 1 },
            "callback_query": {
                "message": { "chat": { "id": 9 } },
                "from": { "id": 1 },
                "date": 1,
                "data": "pressed",
            }
        });
        assert!(matches!(normalize(&raw), IncomingEvent::Unknown(_)));
    }

    #[tokio::test]
    async fn unknown_first_update_is_returned_and_advances_cursor() {
        let batch = updates_response(vec![
            json!({ "update_id": 3, "poll_answer": {} }),
            text_update(4, 9, "later"),
        ]);
        let bot = Bot::new(MockTransport::new(vec![batch]));
        let mut session = session();

        let event = bot.next_event(&mut session).await.unwrap();

        assert!(!event.is_known());
        assert_eq!(session.last_update_id(), 3);
        assert_eq!(bot.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn empty_batches_poll_until_an_update_arrives() {
        let bot = Bot::new(MockTransport::new(vec![
            updates_response(vec![]),
            updates_response(vec![]),
            updates_response(vec![text_update(2, 9, "hi")]),
        ]));
        let mut session = session();

        let event = bot.next_event(&mut session).await.unwrap();

        assert!(matches!(event, IncomingEvent::Text(_)));
        assert_eq!(bot.transport().call_count(), 3);
        for (method, body) in bot.transport().calls() {
            assert_eq!(method, "getUpdates");
            match body {
                Body::Json(v) => assert_eq!(v["offset"], json!(1)),
                other => panic!("expected json body, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn offset_advances_past_the_returned_update() {
        let bot = Bot::new(MockTransport::new(vec![
            updates_response(vec![text_update(5, 9, "first")]),
            updates_response(vec![text_update(6, 9, "second")]),
        ]));
        let mut session = session();

        bot.next_event(&mut session).await.unwrap();
        bot.next_event(&mut session).await.unwrap();

        let calls = bot.transport().calls();
        match &calls[1].1 {
            Body::Json(v) => assert_eq!(v["offset"], json!(6)),
            other => panic!("expected json body, got {other:?}"),
        }
        assert_eq!(session.last_update_id(), 6);
    }

    #[tokio::test]
    async fn ok_false_is_treated_as_an_empty_batch() {
        let bot = Bot::new(MockTransport::new(vec![
            json!({ "ok": false, "description": "flood" }),
            updates_response(vec![text_update(1, 9, "hi")]),
        ]));
        let mut session = session();

        let event = bot.next_event(&mut session).await.unwrap();

        assert!(matches!(event, IncomingEvent::Text(_)));
        assert_eq!(bot.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn updates_without_ids_are_skipped() {
        let batch = updates_response(vec![
            json!({ "message": { "text": "no id" } }),
            text_update(4, 9, "counted"),
        ]);
        let bot = Bot::new(MockTransport::new(vec![batch]));
        let mut session = session();

        let event = bot.next_event(&mut session).await.unwrap();

        assert_eq!(event.update_id(), Some(4));
        assert_eq!(session.last_update_id(), 4);
    }

    #[tokio::test]
    async fn cancelled_poll_returns_cancelled_without_invoking() {
        let poll = crate::bot::PollOptions::default();
        poll.cancel.cancel();
        let bot = Bot::new(MockTransport::new(vec![])).with_poll_options(poll);
        let mut session = session();

        let err = bot.next_event(&mut session).await.unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(bot.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn transport_fault_propagates() {
        // Exhausted mock stands in for a connection failure.
        let bot = Bot::new(MockTransport::new(vec![]));
        let mut session = session();

        let err = bot.next_event(&mut session).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }
}
