use std::borrow::Cow;

use serde::Deserialize;

use crate::{client::HttpMethod, methods::ApiMethod, types::Subscription};

/// `GET /subscriptions` — the webhook subscriptions currently registered
/// for this bot. The dispatcher checks this at startup to warn about the
/// "webhook registered, long polling will never see an update" trap (see
/// [`crate::dispatcher::Dispatcher::check_subscriptions`]).
#[derive(Debug, Clone, Copy)]
pub struct GetSubscriptions;

#[derive(Debug, Deserialize)]
pub struct Subscriptions {
    pub subscriptions: Vec<Subscription>,
}

impl ApiMethod for GetSubscriptions {
    type Return = Subscriptions;

    const HTTP_METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("subscriptions")
    }
}
