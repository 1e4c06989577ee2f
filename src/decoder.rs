//! Turns raw update JSON into a typed [`Update`], and attaches enrichment
//! data by calling back into the platform through a [`Bot`].
//!
//! Unknown `update_type` tags are a documented forward-compatibility
//! signal, not an error: [`decode`] returns [`DecodeOutcome::Unrecognized`]
//! and the ingestion loop logs a warning and moves on (see
//! [`crate::ingestion`]).

use std::str::FromStr;

use serde::de::Error as _;
use tracing::{instrument, warn};

use crate::{
    client::{Bot, Session},
    enums::UpdateType,
    errors::SessionErrorKind,
    types::{
        BotAdded, BotRemoved, BotStarted, BotStopped, ChatTitleChanged, DialogCleared,
        DialogMuted, DialogRemoved, DialogUnmuted, Enrichment, MessageCallback,
        MessageChatCreated, MessageCreated, MessageEdited, MessageRemoved, Update, UpdateKind,
        UserAdded, UserRemoved,
    },
};

/// The result of attempting to decode one raw update.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(Update),
    /// The wire `update_type` didn't match any known variant. Carries the
    /// raw tag only, for logging — the rest of the payload is discarded.
    Unrecognized { raw_type: String },
}

/// Decode one raw update object.
///
/// # Errors
/// Returns [`SessionErrorKind::Parse`] if `raw` isn't a JSON object, is
/// missing `update_type`/`timestamp`, or a *known* `update_type`'s payload
/// doesn't match its expected shape. An unknown `update_type` is never an
/// error — see [`DecodeOutcome::Unrecognized`].
#[instrument(skip(raw))]
pub fn decode(raw: &serde_json::Value) -> Result<DecodeOutcome, SessionErrorKind> {
    let object = raw
        .as_object()
        .ok_or_else(|| serde_json::Error::custom("update is not a JSON object"))?;

    let raw_type = object
        .get("update_type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| serde_json::Error::custom("update is missing update_type"))?;

    let Ok(update_type) = UpdateType::from_str(raw_type) else {
        return Ok(DecodeOutcome::Unrecognized {
            raw_type: raw_type.to_owned(),
        });
    };

    let timestamp = object
        .get("timestamp")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| serde_json::Error::custom("update is missing timestamp"))?;

    macro_rules! payload {
        ($variant:ident) => {
            UpdateKind::$variant(serde_json::from_value(raw.clone())?)
        };
    }

    let kind = match update_type {
        UpdateType::MessageCreated => payload!(MessageCreated),
        UpdateType::MessageEdited => payload!(MessageEdited),
        UpdateType::MessageRemoved => payload!(MessageRemoved),
        UpdateType::MessageCallback => payload!(MessageCallback),
        UpdateType::MessageChatCreated => payload!(MessageChatCreated),
        UpdateType::BotAdded => payload!(BotAdded),
        UpdateType::BotRemoved => payload!(BotRemoved),
        UpdateType::BotStarted => payload!(BotStarted),
        UpdateType::BotStopped => payload!(BotStopped),
        UpdateType::UserAdded => payload!(UserAdded),
        UpdateType::UserRemoved => payload!(UserRemoved),
        UpdateType::ChatTitleChanged => payload!(ChatTitleChanged),
        UpdateType::DialogCleared => payload!(DialogCleared),
        UpdateType::DialogMuted => payload!(DialogMuted),
        UpdateType::DialogUnmuted => payload!(DialogUnmuted),
        UpdateType::DialogRemoved => payload!(DialogRemoved),
    };

    Ok(DecodeOutcome::Decoded(Update::new(timestamp, kind)))
}

/// Best-effort enrichment: fetches `chat`/`from_user` for an update when
/// the bot's `auto_requests` flag is set. Each lookup is independent; a
/// failure logs a warning and leaves that field `None` rather than
/// failing the whole update.
///
/// `from_user` is never fetched over the network for message-bearing
/// variants — their sender is already embedded in the payload
/// (`Message::sender`/`Callback::user`). A member lookup only happens for
/// removal variants, which carry just a bare `user_id`.
#[instrument(skip(bot, update))]
pub async fn enrich<S: Session>(update: &mut Update, bot: &Bot<S>) {
    if !bot.auto_requests() {
        return;
    }

    let (chat_id, user_id) = update.get_ids();

    let mut enrichment = Enrichment::default();

    if let Some(chat_id) = chat_id {
        match bot.get_chat_by_id(chat_id).await {
            Ok(chat) => enrichment.chat = Some(chat),
            Err(err) => warn!(chat_id, error = %err, "failed to enrich update with chat"),
        }
    }

    match &update.kind {
        UpdateKind::MessageCreated(m) => enrichment.from_user = m.message.sender.clone(),
        UpdateKind::MessageEdited(m) => enrichment.from_user = m.message.sender.clone(),
        UpdateKind::MessageCallback(m) => enrichment.from_user = Some(m.callback.user.clone()),
        _ => {
            if let (Some(chat_id), Some(user_id)) = (chat_id, user_id) {
                match bot.get_chat_member(chat_id, user_id).await {
                    Ok(member) => enrichment.from_user = Some(member.user),
                    Err(err) => {
                        warn!(chat_id, user_id, error = %err, "failed to enrich update with user");
                    }
                }
            }
        }
    }

    update.enrichment = enrichment;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_update() {
        let raw = json!({
            "update_type": "message_removed",
            "timestamp": 42,
            "message_id": "m1",
            "chat_id": 1,
            "user_id": 2,
        });

        match decode(&raw).unwrap() {
            DecodeOutcome::Decoded(update) => {
                assert_eq!(update.timestamp, 42);
                assert_eq!(update.get_ids(), (Some(1), Some(2)));
            }
            DecodeOutcome::Unrecognized { .. } => panic!("expected a decoded update"),
        }
    }

    #[test]
    fn unknown_update_type_is_not_an_error() {
        let raw = json!({"update_type": "meteor_strike", "timestamp": 1});

        match decode(&raw).unwrap() {
            DecodeOutcome::Unrecognized { raw_type } => assert_eq!(raw_type, "meteor_strike"),
            DecodeOutcome::Decoded(_) => panic!("expected unrecognized"),
        }
    }

    #[test]
    fn missing_update_type_is_an_error() {
        let raw = json!({"timestamp": 1});
        assert!(decode(&raw).is_err());
    }
}
