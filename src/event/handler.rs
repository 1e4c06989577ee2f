use std::{
    fmt::{self, Debug, Formatter},
    future::Future,
    pin::Pin,
    sync::Arc,
};

use crate::{
    client::{Bot, ReqwestSession},
    context::Context,
    errors::{ExtractorError, HandlerError},
    extractors::FromEventAndContext,
    filters::Filter,
    types::Update,
};

use super::EventReturn;

/// Everything a handler or filter needs to look at for one dispatched
/// update: the bot, the update itself, and the request-scoped extras bag.
pub struct Request<S = ReqwestSession> {
    pub bot: Arc<Bot<S>>,
    pub update: Arc<Update>,
    pub context: Arc<std::sync::Mutex<Context>>,
}

impl<S> Request<S> {
    #[must_use]
    pub fn new(
        bot: Arc<Bot<S>>,
        update: Arc<Update>,
        context: Arc<std::sync::Mutex<Context>>,
    ) -> Self {
        Self {
            bot,
            update,
            context,
        }
    }
}

impl<S> Clone for Request<S> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            update: Arc::clone(&self.update),
            context: Arc::clone(&self.context),
        }
    }
}

impl<S> Debug for Request<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request").field("update", &self.update).finish_non_exhaustive()
    }
}

pub type HandlerResult = Result<EventReturn, HandlerError>;

pub struct Response<S = ReqwestSession> {
    pub request: Request<S>,
    pub handler_result: HandlerResult,
}

/// An async function callable with `Args` extracted from a [`Request`].
/// Implemented for plain async closures up to 6 arguments (see
/// `impls` below) — handlers needing more context than that should bundle
/// their extractors into a struct extractor instead.
pub trait Handler<Args> {
    type Output: Into<HandlerResult>;
    type Future: Future<Output = Self::Output> + Send;

    fn call(&self, args: Args) -> Self::Future;
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A handler erased to a boxed closure over [`Request`], after argument
/// extraction has already run. Built by [`HandlerObject::new`].
pub type BoxedHandler<S> =
    Arc<dyn Fn(Request<S>) -> BoxFuture<Result<Response<S>, ExtractorError>> + Send + Sync>;

/// One registered handler: its erased call closure plus the filters that
/// gate whether it's even tried for a given update.
pub struct HandlerObject<S> {
    call: BoxedHandler<S>,
    pub filters: Vec<Arc<dyn Filter<S>>>,
}

impl<S> HandlerObject<S>
where
    S: Send + Sync + 'static,
{
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args> + Clone + Send + Sync + 'static,
        Args: FromEventAndContext<S> + Send + Sync + 'static,
        Args::Error: Into<ExtractorError>,
    {
        let call: BoxedHandler<S> = Arc::new(move |request: Request<S>| {
            let handler = handler.clone();
            Box::pin(async move {
                let args = Args::extract(
                    Arc::clone(&request.bot),
                    Arc::clone(&request.update),
                    Arc::clone(&request.context),
                )
                .map_err(Into::into)?;

                let handler_result = handler.call(args).await.into();
                Ok(Response {
                    request,
                    handler_result,
                })
            })
        });

        Self {
            call,
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Filter<S> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Whether every filter registered on this handler passes for
    /// `request`. An empty filter list always matches.
    pub async fn matches(&self, request: &Request<S>) -> bool {
        for filter in &self.filters {
            if !filter.check(request).await {
                return false;
            }
        }
        true
    }

    pub async fn call(&self, request: Request<S>) -> Result<Response<S>, ExtractorError> {
        (self.call)(request).await
    }
}

#[allow(non_snake_case)]
mod impls {
    //! [`Handler`] blanket impls for async closures of 0 to 6 arguments.
    //! Handlers needing more extractors than that should compose a
    //! struct extractor instead.

    use super::{Future, Handler};

    macro_rules! impl_handler {
        ($($param:ident)*) => {
            impl<Func, Fut, $($param,)*> Handler<($($param,)*)> for Func
            where
                Func: Fn($($param,)*) -> Fut,
                Fut: Future + Send,
            {
                type Output = Fut::Output;
                type Future = Fut;

                #[inline]
                #[allow(unused_variables)]
                fn call(&self, ($($param,)*): ($($param,)*)) -> Self::Future {
                    (self)($($param,)*)
                }
            }
        };
    }

    impl_handler! {}
    impl_handler! { A }
    impl_handler! { A B }
    impl_handler! { A B C }
    impl_handler! { A B C D }
    impl_handler! { A B C D E }
    impl_handler! { A B C D E F }
}
