//! [`Router`]: an ordered handler list plus the filters and middlewares
//! that gate it. A [`crate::dispatcher::Dispatcher`] owns one root router
//! and zero or more included routers, tried in order for every update (see
//! [`crate::dispatcher::Dispatcher::feed_update`]).

use std::{
    borrow::Cow,
    collections::HashSet,
    fmt::{self, Debug, Formatter},
    sync::{Arc, Once, PoisonError},
};

use tracing::{instrument, warn};

use crate::{
    enums::UpdateType,
    errors::ExtractorError,
    event::{EventReturn, Handler, HandlerObject, PropagateEventResult, Request},
    extractors::FromEventAndContext,
    filters::{self, BaseFilter, Filter, Kwargs},
    fsm,
    middlewares::{wrap_handler_with_middlewares, Middleware},
};

/// Optional extras attached to one handler registration: predicate
/// filters, base filters (predicate-or-kwargs, see
/// [`crate::filters::BaseFilter`]), the FSM states it's willing to run
/// under (empty = any state), and handler-scoped middlewares wrapping
/// just this handler's invocation.
pub struct HandlerOptions<S> {
    pub filters: Vec<Arc<dyn Filter<S>>>,
    pub base_filters: Vec<Arc<dyn BaseFilter<S>>>,
    pub states: Vec<Option<String>>,
    pub middlewares: Vec<Arc<dyn Middleware<S>>>,
}

impl<S> Default for HandlerOptions<S> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            base_filters: Vec::new(),
            states: Vec::new(),
            middlewares: Vec::new(),
        }
    }
}

impl<S> HandlerOptions<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Filter<S> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Registers a handler-scoped [`BaseFilter`]: besides gating, a
    /// `Some(dict)` result is merged into this request's [`Kwargs`] before
    /// the handler runs (spec §4.4: "`h.base_filters` produce `False`:
    /// continue … dict result merges kwargs").
    #[must_use]
    pub fn base_filter(mut self, filter: impl BaseFilter<S> + 'static) -> Self {
        self.base_filters.push(Arc::new(filter));
        self
    }

    /// Accept only when the FSM state canonically named `state` is current.
    /// `None` matches the absence of any state.
    #[must_use]
    pub fn state(mut self, state: Option<impl Into<String>>) -> Self {
        self.states.push(state.map(Into::into));
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }
}

struct RegisteredHandler<S> {
    update_type: UpdateType,
    states: Vec<Option<String>>,
    base_filters: Vec<Arc<dyn BaseFilter<S>>>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
    object: Arc<HandlerObject<S>>,
}

/// A named group of handlers. `router_id` is only for diagnostics (logged
/// on [`crate::errors::HandlerError`]/[`crate::errors::MiddlewareError`]
/// and in `tracing` spans) — it plays no role in routing.
pub struct Router<S = crate::client::ReqwestSession> {
    router_id: Cow<'static, str>,
    filters: Vec<Arc<dyn Filter<S>>>,
    base_filters: Vec<Arc<dyn BaseFilter<S>>>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
    handlers: Vec<RegisteredHandler<S>>,
}

static DEPRECATED_UPDATE_TYPE_WARNED: Once = Once::new();

impl<S> Router<S>
where
    S: Send + Sync + 'static,
{
    #[must_use]
    pub fn new(router_id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            router_id: router_id.into(),
            filters: Vec::new(),
            base_filters: Vec::new(),
            middlewares: Vec::new(),
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub fn router_id(&self) -> &str {
        &self.router_id
    }

    /// Gates every handler in this router: if any router-wide filter fails,
    /// the dispatcher moves on to the next router without even looking at
    /// this router's handler list.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter<S> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Registers a router-wide [`BaseFilter`]: a `Some(dict)` result
    /// contributes to every handler attempt's [`Kwargs`] in this router; a
    /// `None` result skips the whole router, same as a failed
    /// [`Router::filter`] (spec §4.4: "`router.base_filters` fail:
    /// continue … may contribute extra kwargs").
    #[must_use]
    pub fn base_filter(mut self, filter: impl BaseFilter<S> + 'static) -> Self {
        self.base_filters.push(Arc::new(filter));
        self
    }

    /// Appends a router-scoped middleware. Router middlewares wrap every
    /// handler invocation in this router, inside any
    /// [`crate::dispatcher::Dispatcher`]-level (global) middleware and
    /// outside the handler's own [`HandlerOptions::middleware`] list.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Inserts a router-scoped middleware at the head of the list, so it
    /// runs before any middleware already registered on this router.
    #[must_use]
    pub fn outer_middleware(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.insert(0, Arc::new(middleware));
        self
    }

    /// Registers `handler` for `update_type`. Handlers are tried in
    /// registration order; the first whose filters and states match wins
    /// (see [`Router::propagate`]).
    pub fn register<H, Args>(&mut self, update_type: UpdateType, handler: H, options: HandlerOptions<S>)
    where
        H: Handler<Args> + Clone + Send + Sync + 'static,
        Args: FromEventAndContext<S> + Send + Sync + 'static,
        Args::Error: Into<ExtractorError>,
    {
        if update_type.is_deprecated() {
            DEPRECATED_UPDATE_TYPE_WARNED.call_once(|| {
                warn!(%update_type, "registering a handler for a deprecated update type");
            });
        }

        let mut object = HandlerObject::new(handler);
        for filter in options.filters {
            object.filters.push(filter);
        }

        self.handlers.push(RegisteredHandler {
            update_type,
            states: options.states,
            base_filters: options.base_filters,
            middlewares: options.middlewares,
            object: Arc::new(object),
        });
    }

    /// The distinct update types this router has at least one handler for,
    /// across both the router's own handlers — used by ingestion drivers to
    /// build the `types` filter passed to `getUpdates` (§4.2).
    #[must_use]
    pub fn used_update_types(&self) -> HashSet<UpdateType> {
        self.handlers.iter().map(|h| h.update_type).collect()
    }

    /// Tries this router's handlers (filtered to `update_type`) against
    /// `request`, in registration order. `outer_middlewares` are prepended
    /// ahead of this router's own middlewares for every handler attempt —
    /// the dispatcher passes its global middlewares here (see
    /// [`crate::dispatcher::Dispatcher::feed_update`]).
    ///
    /// # Errors
    /// Never returns an `Err` directly: a handler or middleware failure is
    /// reported as [`PropagateEventResult::Failed`] rather than propagated,
    /// so the dispatcher can log it and move on to the next update (§7).
    #[instrument(skip(self, request, outer_middlewares), fields(router_id = %self.router_id))]
    pub async fn propagate(
        &self,
        update_type: UpdateType,
        request: Request<S>,
        outer_middlewares: &[Arc<dyn Middleware<S>>],
    ) -> PropagateEventResult<S> {
        for filter in &self.filters {
            if !filter.check(&request).await {
                return PropagateEventResult::Unhandled;
            }
        }

        let router_kwargs = match filters::apply_base_filters(&self.base_filters, &request).await {
            Some(kwargs) => kwargs,
            None => return PropagateEventResult::Unhandled,
        };

        let fsm_context = {
            let guard = request
                .context
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get_cloned::<fsm::Context>()
        };
        let current_state = match &fsm_context {
            Some(ctx) => ctx.get_state().await.unwrap_or_default(),
            None => None,
        };

        let mut any_matched = false;

        for registered in &self.handlers {
            if registered.update_type != update_type {
                continue;
            }
            if !registered.object.matches(&request).await {
                continue;
            }
            if !registered.states.is_empty() && !registered.states.contains(&current_state) {
                continue;
            }
            let handler_kwargs = match filters::apply_base_filters(&registered.base_filters, &request).await {
                Some(kwargs) => kwargs,
                None => continue,
            };

            any_matched = true;

            if !router_kwargs.is_empty() || !handler_kwargs.is_empty() {
                let mut merged = router_kwargs.clone();
                merged.extend(handler_kwargs);
                request
                    .context
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(Kwargs(merged));
            }

            let chain: Vec<Arc<dyn Middleware<S>>> = outer_middlewares
                .iter()
                .cloned()
                .chain(self.middlewares.iter().cloned())
                .chain(registered.middlewares.iter().cloned())
                .collect();

            let next = wrap_handler_with_middlewares(Arc::clone(&registered.object), Arc::from(chain));

            match next(request.clone()).await {
                Ok(response) => match response.handler_result {
                    Ok(EventReturn::Finish) => return PropagateEventResult::Handled(response),
                    Ok(EventReturn::Skip) => continue,
                    Err(_) => unreachable!("wrap_handler_with_middlewares turns a handler Err into an outer Err"),
                },
                Err(err) => return PropagateEventResult::Failed(err),
            }
        }

        if any_matched {
            PropagateEventResult::Rejected
        } else {
            PropagateEventResult::Unhandled
        }
    }
}

impl<S> Debug for Router<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("router_id", &self.router_id)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{Bot, ReqwestSession},
        context::Context,
        errors::HandlerError,
        types::{MessageRemoved, Update, UpdateKind},
    };
    use std::sync::Mutex;

    fn request() -> Request<ReqwestSession> {
        Request::new(
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
        )
    }

    #[tokio::test]
    async fn first_matching_handler_wins_and_no_other_runs() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async { Ok::<_, HandlerError>(EventReturn::Finish) },
            HandlerOptions::new(),
        );
        router.register(UpdateType::MessageRemoved, || async { unreachable!() }, HandlerOptions::new());

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Handled(_)));
    }

    #[tokio::test]
    async fn unrelated_update_type_is_unhandled() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageCreated,
            || async { Ok::<_, HandlerError>(EventReturn::Finish) },
            HandlerOptions::new(),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Unhandled));
    }

    #[tokio::test]
    async fn skip_falls_through_to_next_handler() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async { Ok::<_, HandlerError>(EventReturn::Skip) },
            HandlerOptions::new(),
        );
        router.register(
            UpdateType::MessageRemoved,
            || async { Ok::<_, HandlerError>(EventReturn::Finish) },
            HandlerOptions::new(),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Handled(_)));
    }

    #[tokio::test]
    async fn all_handlers_skipping_is_rejected_not_unhandled() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async { Ok::<_, HandlerError>(EventReturn::Skip) },
            HandlerOptions::new(),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Rejected));
    }

    #[tokio::test]
    async fn router_filter_failing_skips_the_whole_router() {
        let router = Router::<ReqwestSession>::new("main").filter(|_: &Request<ReqwestSession>| async { false });

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Unhandled));
    }

    /// End-to-end scenario 2 (spec §8): a handler gated on a specific FSM
    /// state doesn't run while the current state is something else, and
    /// does once the state transitions to one it accepts.
    #[tokio::test]
    async fn handler_gated_on_state_only_runs_once_state_matches() {
        use crate::fsm::{MemoryStorage, Storage, StorageKey};

        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async { Ok::<_, HandlerError>(EventReturn::Finish) },
            HandlerOptions::new().state(Some("Wizard:step2")),
        );

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let key = StorageKey::new(1, Some(42), Some(7));

        let req_for = |storage: &Arc<dyn Storage>| {
            let mut context = Context::new();
            context.insert(fsm::Context::new(Arc::clone(storage), key));
            Request::new(
                Arc::new(Bot::new("1:secret")),
                Arc::new(Update::new(
                    1,
                    UpdateKind::MessageRemoved(MessageRemoved {
                        message_id: "m".into(),
                        chat_id: 42,
                        user_id: 7,
                    }),
                )),
                Arc::new(Mutex::new(context)),
            )
        };

        storage.set_state(&key, Some("Wizard:step1".to_owned())).await.unwrap();
        let result = router.propagate(UpdateType::MessageRemoved, req_for(&storage), &[]).await;
        assert!(matches!(result, PropagateEventResult::Unhandled));

        storage.set_state(&key, Some("Wizard:step2".to_owned())).await.unwrap();
        let result = router.propagate(UpdateType::MessageRemoved, req_for(&storage), &[]).await;
        assert!(matches!(result, PropagateEventResult::Handled(_)));
    }

    #[tokio::test]
    async fn base_filter_rejecting_falls_through_like_a_plain_filter() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async { unreachable!() },
            HandlerOptions::new().base_filter(|_: &Request<ReqwestSession>| async { None }),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Unhandled));
    }

    /// End-to-end scenario 3-adjacent (spec §4.4): a `Some(dict)` base
    /// filter result is merged into the request's `Kwargs` before the
    /// handler runs, and the handler can read it back out.
    #[tokio::test]
    async fn base_filter_dict_result_is_readable_as_kwargs() {
        use crate::filters::Kwargs;

        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            |kwargs: Kwargs| async move {
                assert_eq!(kwargs.0.get("greeting"), Some(&serde_json::json!("hi")));
                Ok::<_, HandlerError>(EventReturn::Finish)
            },
            HandlerOptions::new().base_filter(|_: &Request<ReqwestSession>| async {
                Some(std::collections::HashMap::from([(
                    "greeting".to_owned(),
                    serde_json::json!("hi"),
                )]))
            }),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Handled(_)));
    }

    #[tokio::test]
    async fn router_and_handler_base_filter_kwargs_both_merge() {
        use crate::filters::Kwargs;

        let mut router = Router::<ReqwestSession>::new("main").base_filter(|_: &Request<ReqwestSession>| async {
            Some(std::collections::HashMap::from([(
                "from_router".to_owned(),
                serde_json::json!(1),
            )]))
        });
        router.register(
            UpdateType::MessageRemoved,
            |kwargs: Kwargs| async move {
                assert_eq!(kwargs.0.get("from_router"), Some(&serde_json::json!(1)));
                assert_eq!(kwargs.0.get("from_handler"), Some(&serde_json::json!(2)));
                Ok::<_, HandlerError>(EventReturn::Finish)
            },
            HandlerOptions::new().base_filter(|_: &Request<ReqwestSession>| async {
                Some(std::collections::HashMap::from([(
                    "from_handler".to_owned(),
                    serde_json::json!(2),
                )]))
            }),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Handled(_)));
    }

    #[tokio::test]
    async fn router_base_filter_rejecting_skips_whole_router() {
        let mut router = Router::<ReqwestSession>::new("main")
            .base_filter(|_: &Request<ReqwestSession>| async { None });
        router.register(
            UpdateType::MessageRemoved,
            || async { unreachable!() },
            HandlerOptions::new(),
        );

        let result = router.propagate(UpdateType::MessageRemoved, request(), &[]).await;
        assert!(matches!(result, PropagateEventResult::Unhandled));
    }
}
