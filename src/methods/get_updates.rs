use std::borrow::Cow;

use serde::Deserialize;

use crate::{client::HttpMethod, methods::ApiMethod};

/// `GET /updates` — long-poll for a batch of new updates.
///
/// `limit` is clamped to `1..=1000` and `timeout` to `0..=90` by the
/// platform; this crate passes whatever the caller configured through
/// unchanged and lets the platform do the clamping.
#[derive(Debug, Clone)]
pub struct GetUpdates {
    pub marker: Option<i64>,
    pub timeout: u32,
    pub limit: u32,
    pub types: Option<Vec<String>>,
}

/// Raw decoded response body of `getUpdates`: a batch of still-untyped
/// update objects plus the `marker` to resume from on the next call. Each
/// element of `updates` is handed to [`crate::decoder::decode`]
/// individually, so one malformed update in a batch doesn't lose the rest.
#[derive(Debug, Deserialize)]
pub struct GetUpdatesResult {
    pub updates: Vec<serde_json::Value>,
    pub marker: Option<i64>,
}

impl ApiMethod for GetUpdates {
    type Return = GetUpdatesResult;

    const HTTP_METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("updates")
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("limit", self.limit.to_string()),
            ("timeout", self.timeout.to_string()),
        ];

        if let Some(marker) = self.marker {
            query.push(("marker", marker.to_string()));
        }
        if let Some(types) = &self.types {
            query.push(("types", types.join(",")));
        }

        query
    }
}
