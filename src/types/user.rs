use serde::{Deserialize, Serialize};

/// A platform user, as embedded in updates, callbacks and chat member
/// lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    pub last_activity_time: Option<i64>,
}
