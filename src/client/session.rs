//! The [`Session`] trait: the transport boundary between a [`crate::client::Bot`]
//! and the MAX platform. Swapping the `Session` implementation lets tests
//! drive the dispatcher and FSM without opening a real socket.

use std::{
    fmt::{self, Display, Formatter},
    ops::RangeInclusive,
};

use async_trait::async_trait;
use tracing::{event, instrument, Level, Span};

use crate::{
    client::Bot,
    errors::{PlatformErrorKind, SessionErrorKind},
    methods::ApiMethod,
};

pub const DEFAULT_TIMEOUT: f32 = 30.0;

/// The HTTP verb an [`ApiMethod`] is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    const SUCCESS_RANGE: RangeInclusive<u16> = 200..=226;

    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self(status_code)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        Self::SUCCESS_RANGE.contains(&self.0)
    }

    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(status_code: u16) -> Self {
        Self::new(status_code)
    }
}

/// The raw, untyped response returned by [`Session::send_request`], before
/// it is parsed into the method's declared `Return` type.
#[derive(Debug)]
pub struct ClientResponse {
    pub status_code: StatusCode,
    pub content: String,
}

impl ClientResponse {
    #[must_use]
    pub fn new(status_code: impl Into<StatusCode>, content: impl Into<String>) -> Self {
        Self {
            status_code: status_code.into(),
            content: content.into(),
        }
    }
}

/// The platform's JSON error envelope, returned alongside a non-2xx status.
#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Anything that can carry a request for an [`ApiMethod`] to the platform
/// and bring a response back. [`ReqwestSession`](super::ReqwestSession) is
/// the default; tests typically implement this directly against an in-memory
/// fixture instead of running an HTTP server.
#[async_trait]
pub trait Session: Send + Sync {
    /// Sends one request and returns the raw response, without parsing or
    /// status-code interpretation.
    ///
    /// # Errors
    /// Returns an error only for transport failures (connection refused,
    /// DNS failure, timed out, body unreadable) — a non-2xx HTTP status is
    /// not itself an error at this layer, it's surfaced to
    /// [`Session::check_response`].
    async fn send_request<C, M>(
        &self,
        bot: &Bot<C>,
        method: &M,
        timeout: Option<f32>,
    ) -> Result<ClientResponse, anyhow::Error>
    where
        C: Session,
        M: ApiMethod + Send + Sync;

    /// Maps an HTTP status code plus the platform's JSON error envelope (if
    /// any) to a [`PlatformErrorKind`]. Status codes outside the mapped set
    /// become [`PlatformErrorKind::Unknown`].
    #[instrument(skip(self, content), fields(status = status_code.as_u16()))]
    fn check_response(
        &self,
        status_code: StatusCode,
        content: &str,
    ) -> Result<(), PlatformErrorKind> {
        if status_code.is_success() {
            return Ok(());
        }

        let envelope: ErrorEnvelope = serde_json::from_str(content).unwrap_or(ErrorEnvelope {
            code: None,
            message: None,
        });
        let message = envelope
            .message
            .or(envelope.code)
            .unwrap_or_else(|| content.to_owned());

        let err = match status_code.as_u16() {
            400 => PlatformErrorKind::BadRequest { message },
            401 => PlatformErrorKind::Unauthorized { message },
            403 => PlatformErrorKind::Forbidden { message },
            404 => PlatformErrorKind::NotFound { message },
            409 => PlatformErrorKind::Conflict { message },
            429 => PlatformErrorKind::TooManyRequests {
                message,
                retry_after: None,
            },
            500..=599 => PlatformErrorKind::ServerError { message },
            _ => {
                event!(Level::WARN, %status_code, "unmapped status code");
                PlatformErrorKind::Unknown(anyhow::Error::msg(message))
            }
        };

        Err(err)
    }

    /// Sends a request, parses the response body and maps a non-success
    /// status to a [`PlatformErrorKind`].
    ///
    /// # Errors
    /// Propagates transport failures, JSON parse failures, and mapped
    /// platform errors.
    #[instrument(skip(self, bot, method, timeout), fields(bot_id = bot.bot_id))]
    async fn make_request<C, M>(
        &self,
        bot: &Bot<C>,
        method: &M,
        timeout: Option<f32>,
    ) -> Result<M::Return, SessionErrorKind>
    where
        C: Session,
        M: ApiMethod + Send + Sync,
    {
        let response = self
            .send_request(bot, method, timeout)
            .await
            .map_err(SessionErrorKind::Transport)?;

        self.check_response(response.status_code, &response.content)?;

        event!(Level::TRACE, content = response.content, "parsing response");
        Span::current().record("status", response.status_code.as_u16());

        Ok(serde_json::from_str(&response.content)?)
    }

    /// Close any pooled connections. Default implementation does nothing.
    async fn close(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
