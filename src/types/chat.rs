use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Dialog,
    Chat,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Removed,
    Left,
    Closed,
    Suspended,
}

/// A chat, as returned by `getChatById` enrichment lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: i64,
    #[serde(rename = "type")]
    pub kind: ChatType,
    pub status: ChatStatus,
    pub title: Option<String>,
    pub last_event_time: i64,
    pub participants_count: i64,
    pub owner_id: Option<i64>,
    pub is_public: bool,
    pub link: Option<String>,
    pub description: Option<String>,
    pub dialog_with_user: Option<User>,
}

/// A chat member, as returned by `getChatMember`; carries a [`User`] plus
/// membership metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    #[serde(flatten)]
    pub user: User,
    pub last_access_time: Option<i64>,
    pub is_owner: Option<bool>,
    pub is_admin: Option<bool>,
    pub join_time: Option<i64>,
}

/// A push subscription, as returned by `getSubscriptions` — used only to
/// detect the "webhook already set, polling will be starved" misconfiguration
/// the dispatcher warns about on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub url: String,
    pub time: i64,
    pub update_types: Option<Vec<String>>,
}
