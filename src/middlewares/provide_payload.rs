use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::warn;

use crate::{
    codec::CallbackPayload,
    errors::EventErrorKind,
    event::{Request, Response},
    types::UpdateKind,
};

use super::{Middleware, Next};

/// Decodes `event.callback.payload` with `T::decode` and stashes the
/// result in the request context, so a handler can declare `payload: T`
/// directly instead of decoding it itself (§4.6 of the dispatch spec).
///
/// A payload that fails to decode (wrong prefix, wrong field count, a
/// field that doesn't parse) is logged and left out of the context —
/// the handler then sees a missing-extractor error rather than this
/// middleware panicking or aborting dispatch for an update some other
/// handler might still want.
pub struct ProvidePayload<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ProvidePayload<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for ProvidePayload<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S, T> Middleware<S> for ProvidePayload<T>
where
    S: Send + Sync + 'static,
    T: CallbackPayload + Send + Sync + Clone + 'static,
{
    async fn call(&self, request: Request<S>, next: Next<S>) -> Result<Response<S>, EventErrorKind> {
        if let UpdateKind::MessageCallback(callback) = &request.update.kind {
            if let Some(raw) = &callback.callback.payload {
                match T::decode(raw) {
                    Ok(payload) => {
                        request
                            .context
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .insert(payload);
                    }
                    Err(err) => warn!(error = %err, "failed to decode callback payload"),
                }
            }
        }

        next(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        callback_payload,
        client::{Bot, ReqwestSession},
        context::Context,
        event::{EventReturn, HandlerObject},
        middlewares::wrap_handler_with_middlewares,
        types::{Callback, MessageCallback, Update, User},
    };
    use std::sync::{Arc, Mutex};

    callback_payload! {
        struct OpenItem {
            id: u64,
        }
    }

    fn callback_update(payload: &str) -> Arc<Update> {
        Arc::new(Update::new(
            1,
            UpdateKind::MessageCallback(MessageCallback {
                message: None,
                user_locale: None,
                callback: Callback {
                    callback_id: "c1".into(),
                    payload: Some(payload.to_owned()),
                    user: User {
                        user_id: 1,
                        first_name: "T".into(),
                        last_name: None,
                        username: None,
                        is_bot: false,
                        last_activity_time: None,
                    },
                },
            }),
        ))
    }

    #[tokio::test]
    async fn injects_decoded_payload() {
        let handler = Arc::new(HandlerObject::<ReqwestSession>::new(|payload: OpenItem| async move {
            assert_eq!(payload.id, 17);
            Ok::<_, crate::errors::HandlerError>(EventReturn::Finish)
        }));

        let request = Request::new(
            Arc::new(Bot::new("1:secret")),
            callback_update("OpenItem|17"),
            Arc::new(Mutex::new(Context::new())),
        );

        let middlewares: Arc<[Arc<dyn Middleware<ReqwestSession>>]> =
            Arc::from(vec![Arc::new(ProvidePayload::<OpenItem>::new()) as Arc<dyn Middleware<ReqwestSession>>]);
        let next = wrap_handler_with_middlewares(handler, middlewares);

        let response = next(request).await.unwrap();
        assert!(matches!(response.handler_result, Ok(EventReturn::Finish)));
    }
}
