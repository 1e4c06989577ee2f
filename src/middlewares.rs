//! [`Middleware`]: wraps the handler call chain, able to inspect/mutate
//! the request, inject data into [`crate::context::Context`] for
//! downstream extractors, short-circuit before the handler runs, or
//! post-process its result.
//!
//! Runs after filters, before the handler — there's no separate "outer"
//! layer (run before filters, for things like per-update logging spans)
//! as a distinct concept here; a middleware registered on a
//! [`crate::router::Router`] already runs before that router's
//! handler-level filters are even consulted, covering the same use case.

mod command_args;
mod logging;
mod provide_payload;

pub use command_args::ProvideCommandArgs;
pub use logging::Logging;
pub use provide_payload::ProvidePayload;

use std::{future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;

use crate::{
    errors::EventErrorKind,
    event::{HandlerObject, Request, Response},
};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// The rest of the middleware chain, plus the handler at the end.
/// Call it to continue the chain; don't call it to short-circuit.
pub type Next<S> = Box<dyn FnOnce(Request<S>) -> BoxFuture<Result<Response<S>, EventErrorKind>> + Send>;

#[async_trait]
pub trait Middleware<S>: Send + Sync {
    async fn call(&self, request: Request<S>, next: Next<S>) -> Result<Response<S>, EventErrorKind>;
}

#[async_trait]
impl<T: ?Sized, S> Middleware<S> for Arc<T>
where
    T: Middleware<S>,
    S: Send + Sync + 'static,
{
    async fn call(&self, request: Request<S>, next: Next<S>) -> Result<Response<S>, EventErrorKind> {
        T::call(self, request, next).await
    }
}

#[async_trait]
impl<S, Func, Fut> Middleware<S> for Func
where
    S: Send + Sync + 'static,
    Func: Fn(Request<S>, Next<S>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<S>, EventErrorKind>> + Send,
{
    async fn call(&self, request: Request<S>, next: Next<S>) -> Result<Response<S>, EventErrorKind> {
        self(request, next).await
    }
}

/// Builds the [`Next`] continuation for one handler by folding its
/// middleware stack right to left, so `middlewares[0]` runs first and
/// `middlewares[0]`'s `next` invokes `middlewares[1]`, and so on until the
/// handler itself runs.
#[must_use]
pub fn wrap_handler_with_middlewares<S>(
    handler: Arc<HandlerObject<S>>,
    middlewares: Arc<[Arc<dyn Middleware<S>>]>,
) -> Next<S>
where
    S: Send + Sync + 'static,
{
    Box::new(move |request: Request<S>| {
        Box::pin(async move {
            let Some((middleware, rest)) = middlewares.split_first() else {
                return match handler.call(request).await {
                    Ok(response) => match &response.handler_result {
                        Ok(_) => Ok(response),
                        Err(_) => {
                            let Response { handler_result, .. } = response;
                            Err(EventErrorKind::Handler(handler_result.unwrap_err()))
                        }
                    },
                    Err(err) => Err(EventErrorKind::Extraction(err)),
                };
            };

            let middleware = Arc::clone(middleware);
            let rest: Arc<[_]> = rest.into();

            middleware
                .call(request, wrap_handler_with_middlewares(handler, rest))
                .await
        })
    })
}
