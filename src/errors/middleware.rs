use thiserror::Error;

/// Opaque wrapper for whatever error a user's middleware returns.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct MiddlewareError {
    #[from]
    source: anyhow::Error,
}

impl MiddlewareError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self { source: err.into() }
    }
}
