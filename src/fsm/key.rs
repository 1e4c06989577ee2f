/// Identifies one FSM context: a bot, and optionally a chat and a user
/// within it. Both `chat_id`/`user_id` are `Option` because not every
/// update type carries both (see [`crate::types::Update::get_ids`]) and
/// because a [`crate::fsm::context::Strategy`] other than `UserInChat`
/// deliberately narrows the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub bot_id: i64,
    pub chat_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl StorageKey {
    #[must_use]
    pub fn new(bot_id: i64, chat_id: Option<i64>, user_id: Option<i64>) -> Self {
        Self {
            bot_id,
            chat_id,
            user_id,
        }
    }
}
