use serde::{Deserialize, Serialize};

use super::User;

/// Where a message was sent: a chat plus, for group chats, the sender's
/// user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub chat_id: i64,
    pub chat_type: String,
    pub user_id: Option<i64>,
}

/// Raw attachment payload. The codec and dispatcher only need to know
/// attachments exist and round-trip through JSON — building/interpreting
/// specific attachment kinds is outbound-API surface and out of scope here.
pub type Attachment = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub mid: String,
    pub seq: i64,
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Reply-keyboard/inline-keyboard markup attached to the message, if
    /// any. Round-tripped as opaque JSON — building markup is outbound-API
    /// surface and out of scope here.
    #[serde(default)]
    pub markup: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Option<User>,
    pub recipient: Recipient,
    pub timestamp: i64,
    pub body: MessageBody,
}
