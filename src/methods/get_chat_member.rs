use std::borrow::Cow;

use crate::{client::HttpMethod, methods::ApiMethod, types::ChatMember};

/// `GET /chats/{chat_id}/members/{user_id}`.
#[derive(Debug, Clone, Copy)]
pub struct GetChatMember {
    pub chat_id: i64,
    pub user_id: i64,
}

impl ApiMethod for GetChatMember {
    type Return = ChatMember;

    const HTTP_METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(format!("chats/{}/members/{}", self.chat_id, self.user_id))
    }
}
