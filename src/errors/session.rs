use super::platform::PlatformErrorKind;

use thiserror::Error;

/// Errors from the transport boundary: sending a request to the platform,
/// decoding its response, or the platform rejecting the request.
#[derive(Error, Debug)]
pub enum SessionErrorKind {
    /// Transport-level failure: connection refused, DNS failure, timeout.
    #[error("transport error: {0}")]
    Transport(anyhow::Error),
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Platform(#[from] PlatformErrorKind),
    /// Kept for hosts that layer attachment upload on top of this crate's
    /// `Bot`; upload itself is out of scope here.
    #[error("upload failed: {0}")]
    UploadFailure(String),
}
