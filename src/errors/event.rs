use super::{ExtractorError, HandlerError, MiddlewareError};

use thiserror::Error;

/// The error a dispatch pass can fail with: something went wrong extracting
/// handler arguments, running a handler, or running a middleware.
#[derive(Error, Debug)]
pub enum EventErrorKind {
    #[error(transparent)]
    Extraction(#[from] ExtractorError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error(transparent)]
    Middleware(#[from] MiddlewareError),
}
