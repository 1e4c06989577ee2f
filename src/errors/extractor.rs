use std::{borrow::Cow, convert::Infallible};

use thiserror::Error;

/// Raised when a [`crate::extractors::FromEventAndContext`] implementation
/// cannot produce its value for the current update (e.g. a `Message`
/// extractor running against a `MessageCallback` update).
#[derive(Error, Debug)]
#[error("extraction error: {msg}")]
pub struct ExtractorError {
    msg: Cow<'static, str>,
}

impl ExtractorError {
    pub fn new<T: Into<Cow<'static, str>>>(msg: T) -> Self {
        Self { msg: msg.into() }
    }
}

impl From<Infallible> for ExtractorError {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}
