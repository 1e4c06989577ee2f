use std::borrow::Cow;

use crate::{client::HttpMethod, methods::ApiMethod, types::Chat};

/// `GET /chats/{chat_id}`.
#[derive(Debug, Clone, Copy)]
pub struct GetChatById {
    pub chat_id: i64,
}

impl ApiMethod for GetChatById {
    type Return = Chat;

    const HTTP_METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(format!("chats/{}", self.chat_id))
    }
}
