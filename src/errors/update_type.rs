use std::borrow::Cow;

use thiserror::Error;

/// Raised internally when a raw update's `update_type` tag doesn't match
/// any known [`crate::enums::UpdateType`] variant. Callers never see this:
/// the decoder turns it into [`crate::decoder::DecodeOutcome::Unrecognized`]
/// rather than propagating it as an error.
#[derive(Error, Debug)]
#[error("unknown update type: {raw_type}")]
pub struct UnknownUpdateType {
    pub raw_type: Cow<'static, str>,
}

impl UnknownUpdateType {
    pub fn new<T: Into<Cow<'static, str>>>(raw_type: T) -> Self {
        Self {
            raw_type: raw_type.into(),
        }
    }
}
