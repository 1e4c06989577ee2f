use std::borrow::Cow;

use serde::Deserialize;

use crate::{client::HttpMethod, methods::ApiMethod};

/// `DELETE /subscriptions?url=...` — tears down one webhook subscription.
/// Used by [`crate::client::Bot::delete_webhook`], which iterates every
/// subscription `getSubscriptions` reports and unsubscribes each in turn
/// (§5: "resource scoping... tolerant to partial failures").
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeResult {
    pub success: bool,
}

impl ApiMethod for Unsubscribe {
    type Return = UnsubscribeResult;

    const HTTP_METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("subscriptions")
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("url", self.url.clone())]
    }
}
