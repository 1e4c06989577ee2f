use thiserror::Error;

/// Errors reported by the MAX platform itself, distinguished by what the
/// caller should do about them (retry, back off, stop).
#[derive(Error, Debug)]
pub enum PlatformErrorKind {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("too many requests: {message} (retry after {retry_after:?}s)")]
    TooManyRequests {
        message: String,
        retry_after: Option<i64>,
    },
    #[error("server error: {message}")]
    ServerError { message: String },
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl PlatformErrorKind {
    /// Whether the long-poll driver should treat this as the "non-auth
    /// platform error" case in the retry table, i.e. sleep and retry rather
    /// than abort.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unauthorized { .. } | Self::Forbidden { .. })
    }
}
