use serde::{Deserialize, Serialize};

use crate::enums::UpdateType;

use super::{Callback, Chat, Message, User};

/// `message_created` / `message_edited` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCreated {
    pub message: Message,
    pub user_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEdited {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRemoved {
    pub message_id: String,
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCallback {
    pub message: Option<Message>,
    pub user_locale: Option<String>,
    pub callback: Callback,
}

/// Deprecated: still decodes and dispatches, but new integrations should
/// prefer `bot_started`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChatCreated {
    pub chat: Chat,
    pub title: Option<String>,
    pub message_id: Option<String>,
    pub start_payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotAdded {
    pub chat_id: i64,
    pub user: User,
    pub is_channel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRemoved {
    pub chat_id: i64,
    pub user: User,
    pub is_channel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStarted {
    pub chat_id: i64,
    pub user: User,
    pub user_locale: Option<String>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStopped {
    pub chat_id: i64,
    pub user: User,
    pub user_locale: Option<String>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAdded {
    pub chat_id: i64,
    pub inviter_id: Option<i64>,
    pub user: User,
    pub is_channel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRemoved {
    pub chat_id: i64,
    pub admin_id: Option<i64>,
    pub user: User,
    pub is_channel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTitleChanged {
    pub chat_id: i64,
    pub user: User,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogCleared {
    pub chat_id: i64,
    pub user: User,
    pub user_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogMuted {
    pub chat_id: i64,
    pub muted_until: i64,
    pub user: User,
    pub user_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogUnmuted {
    pub chat_id: i64,
    pub user: User,
    pub user_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogRemoved {
    pub chat_id: i64,
    pub user: User,
    pub user_locale: Option<String>,
}

/// The closed set of decoded update payloads. Tagged by
/// [`UpdateType`] one level up, in [`Update::kind`] — `UpdateKind` itself
/// carries no tag since `Update::update_type()` already derives it per
/// variant, which keeps callers from having two sources of truth for "what
/// kind is this".
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    MessageCreated(MessageCreated),
    MessageEdited(MessageEdited),
    MessageRemoved(MessageRemoved),
    MessageCallback(MessageCallback),
    MessageChatCreated(MessageChatCreated),
    BotAdded(BotAdded),
    BotRemoved(BotRemoved),
    BotStarted(BotStarted),
    BotStopped(BotStopped),
    UserAdded(UserAdded),
    UserRemoved(UserRemoved),
    ChatTitleChanged(ChatTitleChanged),
    DialogCleared(DialogCleared),
    DialogMuted(DialogMuted),
    DialogUnmuted(DialogUnmuted),
    DialogRemoved(DialogRemoved),
}

/// Enrichment results, filled in by [`crate::decoder::enrich`] when the
/// bot's `auto_requests` flag is on. All `None` until enrichment runs, and
/// individually `None` if their lookup failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub chat: Option<Chat>,
    pub from_user: Option<User>,
}

/// One decoded platform update: the tagged payload plus its envelope
/// (`timestamp`) and whatever enrichment has been attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub timestamp: i64,
    pub kind: UpdateKind,
    pub enrichment: Enrichment,
}

impl Update {
    #[must_use]
    pub fn new(timestamp: i64, kind: UpdateKind) -> Self {
        Self {
            timestamp,
            kind,
            enrichment: Enrichment::default(),
        }
    }

    /// The update's discriminator, re-derived from `kind` rather than
    /// stored, so `kind` and `update_type()` can never disagree.
    #[must_use]
    pub fn update_type(&self) -> UpdateType {
        match &self.kind {
            UpdateKind::MessageCreated(_) => UpdateType::MessageCreated,
            UpdateKind::MessageEdited(_) => UpdateType::MessageEdited,
            UpdateKind::MessageRemoved(_) => UpdateType::MessageRemoved,
            UpdateKind::MessageCallback(_) => UpdateType::MessageCallback,
            UpdateKind::MessageChatCreated(_) => UpdateType::MessageChatCreated,
            UpdateKind::BotAdded(_) => UpdateType::BotAdded,
            UpdateKind::BotRemoved(_) => UpdateType::BotRemoved,
            UpdateKind::BotStarted(_) => UpdateType::BotStarted,
            UpdateKind::BotStopped(_) => UpdateType::BotStopped,
            UpdateKind::UserAdded(_) => UpdateType::UserAdded,
            UpdateKind::UserRemoved(_) => UpdateType::UserRemoved,
            UpdateKind::ChatTitleChanged(_) => UpdateType::ChatTitleChanged,
            UpdateKind::DialogCleared(_) => UpdateType::DialogCleared,
            UpdateKind::DialogMuted(_) => UpdateType::DialogMuted,
            UpdateKind::DialogUnmuted(_) => UpdateType::DialogUnmuted,
            UpdateKind::DialogRemoved(_) => UpdateType::DialogRemoved,
        }
    }

    /// The routing key: `(chat_id, user_id)`, with either side `None` when
    /// the update carries no derivable value for it.
    #[must_use]
    pub fn get_ids(&self) -> (Option<i64>, Option<i64>) {
        match &self.kind {
            UpdateKind::MessageCreated(m) => (
                Some(m.message.recipient.chat_id),
                m.message.sender.as_ref().map(|u| u.user_id),
            ),
            UpdateKind::MessageEdited(m) => (
                Some(m.message.recipient.chat_id),
                m.message.recipient.user_id,
            ),
            UpdateKind::MessageRemoved(m) => (Some(m.chat_id), Some(m.user_id)),
            UpdateKind::MessageCallback(m) => (
                m.message.as_ref().map(|msg| msg.recipient.chat_id),
                Some(m.callback.user.user_id),
            ),
            UpdateKind::MessageChatCreated(m) => (Some(m.chat.chat_id), m.chat.owner_id),
            UpdateKind::BotAdded(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::BotRemoved(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::BotStarted(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::BotStopped(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::UserAdded(u) => (Some(u.chat_id), u.inviter_id),
            UpdateKind::UserRemoved(u) => (Some(u.chat_id), u.admin_id),
            UpdateKind::ChatTitleChanged(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::DialogCleared(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::DialogMuted(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::DialogUnmuted(u) => (Some(u.chat_id), Some(u.user.user_id)),
            UpdateKind::DialogRemoved(u) => (Some(u.chat_id), Some(u.user.user_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User {
            user_id: id,
            first_name: "Test".into(),
            last_name: None,
            username: None,
            is_bot: false,
            last_activity_time: None,
        }
    }

    #[test]
    fn message_removed_derives_both_ids() {
        let update = Update::new(
            1,
            UpdateKind::MessageRemoved(MessageRemoved {
                message_id: "m1".into(),
                chat_id: 10,
                user_id: 20,
            }),
        );
        assert_eq!(update.get_ids(), (Some(10), Some(20)));
        assert_eq!(update.update_type(), UpdateType::MessageRemoved);
    }

    #[test]
    fn user_added_derives_inviter_as_user_id() {
        let update = Update::new(
            1,
            UpdateKind::UserAdded(UserAdded {
                chat_id: 5,
                inviter_id: Some(99),
                user: user(1),
                is_channel: false,
            }),
        );
        assert_eq!(update.get_ids(), (Some(5), Some(99)));
    }

    #[test]
    fn user_added_with_no_inviter_has_null_user_id() {
        let update = Update::new(
            1,
            UpdateKind::UserAdded(UserAdded {
                chat_id: 5,
                inviter_id: None,
                user: user(1),
                is_channel: false,
            }),
        );
        assert_eq!(update.get_ids(), (Some(5), None));
    }
}
