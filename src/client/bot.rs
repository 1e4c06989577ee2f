//! [`Bot`]: a token, its derived id, and a [`Session`] for talking to the
//! platform.
//!
//! # Notes
//! Cheap to clone: token/hidden-token are `String`s and the default
//! [`ReqwestSession`] wraps a pooled `reqwest::Client` internally.

use std::fmt::{self, Debug, Display, Formatter};

use tracing::instrument;

use crate::{
    client::{session::DEFAULT_TIMEOUT, ReqwestSession, Session},
    errors::SessionErrorKind,
    methods::{
        GetChatById, GetChatMember, GetMe, GetSubscriptions, GetUpdates, GetUpdatesResult,
        Unsubscribe,
    },
    types::{Chat, ChatMember, Subscription, User},
    utils::token,
};

/// A bot identity plus the [`Session`] used to reach the platform.
///
/// `auto_requests` controls whether [`crate::decoder::enrich`] fills in
/// `chat`/`from_user` on every update by calling back into the platform.
/// Defaults on, per spec; disable with [`Bot::with_auto_requests`] to skip
/// the extra round trips.
#[derive(Clone)]
pub struct Bot<C = ReqwestSession> {
    pub token: String,
    pub hidden_token: String,
    pub bot_id: i64,
    auto_requests: bool,
    client: C,
}

impl Bot<ReqwestSession> {
    /// # Panics
    /// Panics if `token` isn't shaped like `<bot_id>:<secret>`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(token, ReqwestSession::default())
    }
}

impl<C> Bot<C> {
    /// # Panics
    /// Panics if `token` isn't shaped like `<bot_id>:<secret>`.
    #[must_use]
    pub fn with_client(token: impl Into<String>, client: C) -> Self {
        let token = token.into();
        let bot_id = token::extract_bot_id(&token)
            .expect("invalid bot token: expected `<bot_id>:<secret>`");
        let hidden_token = token::hide(&token);

        Self {
            token,
            hidden_token,
            bot_id,
            auto_requests: true,
            client,
        }
    }

    #[must_use]
    pub fn with_auto_requests(mut self, auto_requests: bool) -> Self {
        self.auto_requests = auto_requests;
        self
    }

    #[must_use]
    pub fn auto_requests(&self) -> bool {
        self.auto_requests
    }
}

impl<C> Debug for Bot<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("token", &self.hidden_token)
            .field("bot_id", &self.bot_id)
            .field("auto_requests", &self.auto_requests)
            .finish_non_exhaustive()
    }
}

impl<C> Display for Bot<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Bot {{ bot_id: {}, token: {} }}", self.bot_id, self.hidden_token)
    }
}

impl<C: Session> Bot<C> {
    /// Sends a request using this bot's default timeout.
    ///
    /// # Errors
    /// See [`Session::make_request`].
    pub async fn send<M>(&self, method: &M) -> Result<M::Return, SessionErrorKind>
    where
        M: crate::methods::ApiMethod + Send + Sync,
    {
        self.client.make_request(self, method, None).await
    }

    /// Sends a request with an explicit timeout, in seconds.
    ///
    /// # Errors
    /// See [`Session::make_request`].
    pub async fn send_with_timeout<M>(
        &self,
        method: &M,
        request_timeout: f32,
    ) -> Result<M::Return, SessionErrorKind>
    where
        M: crate::methods::ApiMethod + Send + Sync,
    {
        self.client
            .make_request(self, method, Some(request_timeout))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, SessionErrorKind> {
        self.send(&GetMe).await
    }

    #[instrument(skip(self))]
    pub async fn get_chat_by_id(&self, chat_id: i64) -> Result<Chat, SessionErrorKind> {
        self.send(&GetChatById { chat_id }).await
    }

    #[instrument(skip(self))]
    pub async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<ChatMember, SessionErrorKind> {
        self.send(&GetChatMember { chat_id, user_id }).await
    }

    /// Long-polls for a batch of updates.
    ///
    /// # Errors
    /// See [`Session::make_request`].
    #[instrument(skip(self))]
    pub async fn get_updates(
        &self,
        marker: Option<i64>,
        timeout: u32,
        limit: u32,
        types: Option<&[String]>,
    ) -> Result<GetUpdatesResult, SessionErrorKind> {
        let method = GetUpdates {
            marker,
            timeout,
            limit,
            types: types.map(<[String]>::to_vec),
        };
        // Long-poll requests legitimately take longer than the default
        // timeout; give the transport headroom beyond the platform's own
        // `timeout` parameter.
        let transport_timeout = DEFAULT_TIMEOUT.max(timeout as f32 + 10.0);
        self.send_with_timeout(&method, transport_timeout).await
    }

    #[instrument(skip(self))]
    pub async fn get_subscriptions(&self) -> Result<Vec<Subscription>, SessionErrorKind> {
        self.send(&GetSubscriptions).await.map(|r| r.subscriptions)
    }

    pub async fn close_session(&self) -> Result<(), anyhow::Error> {
        self.client.close().await
    }

    /// Tears down every active webhook subscription, one `unsubscribe`
    /// call per URL `getSubscriptions` reports. Tolerant to partial
    /// failures: one subscription failing to unsubscribe doesn't stop the
    /// rest from being attempted (§5).
    ///
    /// # Errors
    /// Returns the initial `getSubscriptions` failure, if any. Failures
    /// unsubscribing individual URLs are logged and otherwise swallowed —
    /// callers that need to know which ones failed should call
    /// `get_subscriptions`/`Unsubscribe` themselves instead.
    #[instrument(skip(self))]
    pub async fn delete_webhook(&self) -> Result<(), SessionErrorKind> {
        let subscriptions = self.get_subscriptions().await?;

        for subscription in subscriptions {
            if let Err(err) = self.send(&Unsubscribe { url: subscription.url.clone() }).await {
                tracing::warn!(url = subscription.url, error = %err, "failed to unsubscribe webhook");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_bot_id_from_token() {
        let bot = Bot::new("123456:secret");
        assert_eq!(bot.bot_id, 123_456);
        assert!(!bot.hidden_token.contains("secret"));
    }

    #[test]
    fn auto_requests_defaults_to_on() {
        let bot = Bot::new("123456:secret");
        assert!(bot.auto_requests());
        assert!(!bot.with_auto_requests(false).auto_requests());
    }
}
