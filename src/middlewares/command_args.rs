use async_trait::async_trait;

use crate::{
    errors::EventErrorKind,
    event::{Request, Response},
    filters::command::parse_command,
    types::UpdateKind,
};

use super::{Middleware, Next};

/// Splits a command message's trailing text into `Vec<String>` and stashes
/// it in the request context, so a handler can declare a plain
/// `args: Vec<String>` parameter instead of re-parsing `message.body.text`
/// itself. Paired with [`crate::filters::command::IsCommand`], which
/// decides whether the handler runs at all — this middleware only extracts
/// what it already matched against.
pub struct ProvideCommandArgs {
    prefix: String,
}

impl ProvideCommandArgs {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

#[async_trait]
impl<S> Middleware<S> for ProvideCommandArgs
where
    S: Send + Sync + 'static,
{
    async fn call(&self, request: Request<S>, next: Next<S>) -> Result<Response<S>, EventErrorKind> {
        let args: Vec<String> = match &request.update.kind {
            UpdateKind::MessageCreated(created) => created
                .message
                .body
                .text
                .as_deref()
                .and_then(|text| parse_command(text.trim(), &self.prefix))
                .map(|(_, _, args)| args.into_iter().map(ToOwned::to_owned).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        request
            .context
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(args);

        next(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{Bot, ReqwestSession},
        context::Context,
        event::{EventReturn, HandlerObject},
        middlewares::wrap_handler_with_middlewares,
        types::{Message, MessageBody, MessageCreated, Recipient, Update},
    };
    use std::sync::{Arc, Mutex};

    fn command_update(text: &str) -> Arc<Update> {
        Arc::new(Update::new(
            1,
            UpdateKind::MessageCreated(MessageCreated {
                message: Message {
                    sender: None,
                    recipient: Recipient {
                        chat_id: 1,
                        chat_type: "dialog".into(),
                        user_id: None,
                    },
                    timestamp: 1,
                    body: MessageBody {
                        mid: "m1".into(),
                        seq: 1,
                        text: Some(text.to_owned()),
                        attachments: Vec::new(),
                        markup: None,
                    },
                },
                user_locale: None,
            }),
        ))
    }

    #[tokio::test]
    async fn injects_parsed_args_into_context() {
        let handler = Arc::new(HandlerObject::<ReqwestSession>::new(|args: Vec<String>| async move {
            assert_eq!(args, vec!["hello".to_owned(), "world".to_owned()]);
            Ok::<_, crate::errors::HandlerError>(EventReturn::Finish)
        }));

        let request = Request::new(
            Arc::new(Bot::new("1:secret")),
            command_update("/start hello world"),
            Arc::new(Mutex::new(Context::new())),
        );

        let middlewares: Arc<[Arc<dyn Middleware<ReqwestSession>>]> =
            Arc::from(vec![Arc::new(ProvideCommandArgs::new("/")) as Arc<dyn Middleware<ReqwestSession>>]);
        let next = wrap_handler_with_middlewares(handler, middlewares);

        let response = next(request).await.unwrap();
        assert!(matches!(response.handler_result, Ok(EventReturn::Finish)));
    }
}
