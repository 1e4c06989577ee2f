use thiserror::Error;

/// Fatal, unrecoverable errors. A [`crate::dispatcher::Dispatcher`] that
/// surfaces one of these should stop polling rather than retry.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid bot token: {0}")]
    InvalidToken(String),
}
