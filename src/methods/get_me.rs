use std::borrow::Cow;

use crate::{client::HttpMethod, methods::ApiMethod, types::User};

/// `GET /me` — the bot's own identity, as a [`User`].
#[derive(Debug, Clone, Copy)]
pub struct GetMe;

impl ApiMethod for GetMe {
    type Return = User;

    const HTTP_METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed("me")
    }
}
