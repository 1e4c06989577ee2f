//! The handful of MAX Bot API methods this crate's ingestion and
//! enrichment logic calls for itself: `getUpdates`, `getChatById`,
//! `getChatMember`, `getMe`, `getSubscriptions`.
//!
//! This is not a full API binding. Each method is a small struct
//! implementing [`ApiMethod`], which a [`crate::client::Session`] turns
//! into an HTTP request.

mod get_chat_by_id;
mod get_chat_member;
mod get_me;
mod get_subscriptions;
mod get_updates;
mod unsubscribe;

pub use get_chat_by_id::GetChatById;
pub use get_chat_member::GetChatMember;
pub use get_me::GetMe;
pub use get_subscriptions::{GetSubscriptions, Subscriptions};
pub use get_updates::{GetUpdates, GetUpdatesResult};
pub use unsubscribe::{Unsubscribe, UnsubscribeResult};

use std::borrow::Cow;

use serde::de::DeserializeOwned;

use crate::client::HttpMethod;

/// One MAX Bot API call: its HTTP verb, path, query parameters and (for
/// `POST`/`PATCH`) JSON body, plus the type its response deserializes into.
pub trait ApiMethod {
    type Return: DeserializeOwned + Send;

    const HTTP_METHOD: HttpMethod;

    /// Path relative to the API root, e.g. `"updates"` or `"chats/123"`.
    fn path(&self) -> Cow<'static, str>;

    /// Query parameters, always including `access_token` (added by the
    /// session, not here).
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON request body, for `POST`/`PATCH` methods. `None` for
    /// `GET`/`DELETE`.
    fn body(&self) -> Option<serde_json::Value> {
        None
    }
}
