//! The default [`Session`] implementation, built on a pooled `reqwest::Client`.

use std::{borrow::Cow, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{event, instrument, Level, Span};

use crate::{
    client::{
        session::{ClientResponse, DEFAULT_TIMEOUT},
        Bot, HttpMethod, Session,
    },
    methods::ApiMethod,
};

const DEFAULT_BASE_URL: &str = "https://botapi.max.ru";

/// `reqwest`-backed [`Session`]. Sends `access_token` as a query parameter
/// on every request, matching the platform's auth scheme.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: Client,
    base_url: Cow<'static, str>,
}

impl ReqwestSession {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: Cow::Borrowed(DEFAULT_BASE_URL),
        }
    }

    /// Points requests at a different API root, e.g. a test double server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<Cow<'static, str>>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ReqwestSession {
    /// # Panics
    /// Panics if the underlying `reqwest::Client` cannot be built.
    fn default() -> Self {
        Self::new(
            Client::builder()
                .timeout(Duration::from_secs_f32(DEFAULT_TIMEOUT))
                .build()
                .expect("failed to build reqwest client"),
        )
    }
}

#[async_trait]
impl Session for ReqwestSession {
    #[instrument(skip(self, bot, method, timeout), fields(path, status))]
    async fn send_request<C, M>(
        &self,
        bot: &Bot<C>,
        method: &M,
        timeout: Option<f32>,
    ) -> Result<ClientResponse, anyhow::Error>
    where
        C: Session,
        M: ApiMethod + Send + Sync,
    {
        let path = method.path();
        Span::current().record("path", path.as_ref());

        let url = format!("{}/{}", self.base_url, path);

        let mut query = method.query();
        query.push(("access_token", bot.token.clone()));

        let mut request = match M::HTTP_METHOD {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
            HttpMethod::Patch => self.client.patch(&url),
        }
        .query(&query);

        if let Some(body) = method.body() {
            request = request.json(&body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(Duration::from_secs_f32(timeout));
        }

        let response = request.send().await.map_err(|err| {
            event!(Level::ERROR, error = %err, "failed to send request");
            err
        })?;

        let status_code = response.status().as_u16();
        Span::current().record("status", status_code);

        let content = response.text().await.map_err(|err| {
            event!(Level::ERROR, error = %err, status_code, "failed to read response body");
            err
        })?;

        Ok(ClientResponse::new(status_code, content))
    }
}
