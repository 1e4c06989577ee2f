use std::time::Instant;

use async_trait::async_trait;
use tracing::{event, instrument, Level};

use crate::{errors::EventErrorKind, event::EventReturn};

use super::{Middleware, Next};
use crate::event::Request;

/// Logs each handler call's outcome and wall-clock duration at `DEBUG`
/// (success) or `ERROR` (any `EventErrorKind`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Logging;

impl Logging {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl<S> Middleware<S> for Logging
where
    S: Send + Sync + 'static,
{
    #[instrument(skip(self, request, next))]
    async fn call(
        &self,
        request: Request<S>,
        next: Next<S>,
    ) -> Result<crate::event::Response<S>, EventErrorKind> {
        let started = Instant::now();
        let result = next(request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => match response.handler_result {
                Ok(EventReturn::Finish) => {
                    event!(Level::DEBUG, ?elapsed, "handler finished");
                }
                Ok(EventReturn::Skip) => {
                    event!(Level::DEBUG, ?elapsed, "handler skipped");
                }
                Err(ref err) => {
                    event!(Level::ERROR, ?elapsed, error = %err, "handler returned an error");
                }
            },
            Err(EventErrorKind::Extraction(err)) => {
                event!(Level::ERROR, ?elapsed, error = %err, "argument extraction failed");
            }
            Err(EventErrorKind::Handler(err)) => {
                event!(Level::ERROR, ?elapsed, error = %err, "handler returned an error");
            }
            Err(EventErrorKind::Middleware(err)) => {
                event!(Level::ERROR, ?elapsed, error = %err, "middleware returned an error");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{Bot, ReqwestSession},
        context::Context,
        event::HandlerObject,
        middlewares::wrap_handler_with_middlewares,
        types::{MessageRemoved, Update, UpdateKind},
    };
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn logs_successful_handler_without_altering_the_result() {
        let handler = Arc::new(HandlerObject::<ReqwestSession>::new(|| async {
            Ok::<_, crate::errors::HandlerError>(EventReturn::Finish)
        }));

        let request = Request::new(
            Arc::new(Bot::new("1:secret")),
            Arc::new(Update::new(
                1,
                UpdateKind::MessageRemoved(MessageRemoved {
                    message_id: "m".into(),
                    chat_id: 1,
                    user_id: 2,
                }),
            )),
            Arc::new(Mutex::new(Context::new())),
        );

        let middlewares: Arc<[Arc<dyn crate::middlewares::Middleware<ReqwestSession>>]> =
            Arc::from(Vec::new());
        let next = wrap_handler_with_middlewares(handler, middlewares);
        let response = Logging.call(request, next).await.unwrap();

        assert!(matches!(response.handler_result, Ok(EventReturn::Finish)));
    }
}
