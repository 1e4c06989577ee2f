use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// The closed set of update kinds the platform can send, discriminated by
/// the wire `update_type` string.
///
/// `MessageChatCreated` is deprecated on the platform but still decodes and
/// dispatches — registering a handler for it emits a one-time warning (see
/// [`crate::router::Router::register`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum UpdateType {
    MessageCreated,
    MessageEdited,
    MessageRemoved,
    MessageCallback,
    MessageChatCreated,
    BotAdded,
    BotRemoved,
    BotStarted,
    BotStopped,
    UserAdded,
    UserRemoved,
    ChatTitleChanged,
    DialogCleared,
    DialogMuted,
    DialogUnmuted,
    DialogRemoved,
}

impl UpdateType {
    /// All update types, in the order the dispatcher builds its observers.
    #[must_use]
    pub fn all() -> [Self; 16] {
        [
            Self::MessageCreated,
            Self::MessageEdited,
            Self::MessageRemoved,
            Self::MessageCallback,
            Self::MessageChatCreated,
            Self::BotAdded,
            Self::BotRemoved,
            Self::BotStarted,
            Self::BotStopped,
            Self::UserAdded,
            Self::UserRemoved,
            Self::ChatTitleChanged,
            Self::DialogCleared,
            Self::DialogMuted,
            Self::DialogUnmuted,
            Self::DialogRemoved,
        ]
    }

    /// Update types the platform still sends but that new integrations
    /// shouldn't rely on.
    #[must_use]
    pub fn is_deprecated(self) -> bool {
        matches!(self, Self::MessageChatCreated)
    }
}
