//! Value objects decoded from the platform's JSON, plus the `Update` tagged
//! union they compose into.

mod callback;
mod chat;
mod message;
mod update;
mod user;

pub use callback::Callback;
pub use chat::{Chat, ChatMember, ChatStatus, ChatType, Subscription};
pub use message::{Attachment, Message, MessageBody, Recipient};
pub use update::{
    BotAdded, BotRemoved, BotStarted, BotStopped, ChatTitleChanged, DialogCleared, DialogMuted,
    DialogRemoved, DialogUnmuted, Enrichment, MessageCallback, MessageChatCreated, MessageCreated,
    MessageEdited, MessageRemoved, Update, UpdateKind, UserAdded, UserRemoved,
};
pub use user::User;
