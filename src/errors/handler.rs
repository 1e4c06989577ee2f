use thiserror::Error;

/// Opaque wrapper for whatever error a user's handler returns.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct HandlerError {
    #[from]
    source: anyhow::Error,
}

impl HandlerError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self { source: err.into() }
    }
}
