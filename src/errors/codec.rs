use thiserror::Error;

/// Errors from encoding/decoding [`crate::codec::CallbackPayload`] values.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("callback payload prefix mismatch: expected {expected:?}, got {got:?}")]
    PrefixMismatch { expected: String, got: String },
    #[error("callback payload field count mismatch: expected {expected}, got {got}")]
    FieldCountMismatch { expected: usize, got: usize },
    #[error("callback payload field {field:?} contains the separator {separator:?}")]
    SeparatorInValue { field: &'static str, separator: &'static str },
    #[error("callback payload too long: {size} bytes, maximum is {max}")]
    TooLong { size: usize, max: usize },
    #[error("callback payload field {field:?} failed to parse: {source}")]
    FieldParse {
        field: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
