use serde::{Deserialize, Serialize};

use super::User;

/// An interactive-button press. `payload` is the opaque string a handler
/// decodes with [`crate::codec::CallbackPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callback {
    pub callback_id: String,
    pub payload: Option<String>,
    pub user: User,
}
