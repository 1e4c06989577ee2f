//! [`Dispatcher`]: the root [`Router`] plus the infrastructure around it —
//! the bot, FSM storage and strategy, global middlewares, and the flat
//! sequence of included routers (§3: "Routers form a flat ordered sequence
//! under one Dispatcher").
//!
//! Built directly via [`DispatcherBuilder`], with no separate
//! two-phase "config then provider" indirection or multi-bot fan-out:
//! one `Dispatcher` here drives exactly one [`Bot`] — ingestion is the
//! module that owns the polling/webhook loop around it, see
//! [`crate::ingestion`].

use std::sync::{atomic::AtomicBool, Arc};

use tracing::{error, instrument, warn};

use crate::{
    client::{Bot, ReqwestSession, Session},
    context::Context,
    enums::UpdateType,
    event::{EventReturn, PropagateEventResult, Request},
    fsm::{self, MemoryStorage, Storage, Strategy},
    middlewares::Middleware,
    router::Router,
};

/// The root router plus the state every dispatched update needs: the bot
/// to enrich/reply with, the FSM backing store and key-derivation
/// strategy, and global middlewares wrapping every handler attempt across
/// every router (§4.4).
pub struct Dispatcher<S = ReqwestSession> {
    bot: Arc<Bot<S>>,
    storage: Arc<dyn Storage>,
    strategy: Strategy,
    routers: Vec<Router<S>>,
    main_router: Router<S>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
    use_create_task: bool,
    stop_flag: Arc<AtomicBool>,
}

impl<S> Dispatcher<S>
where
    S: Send + Sync + 'static,
{
    #[must_use]
    pub fn builder() -> DispatcherBuilder<S> {
        DispatcherBuilder::new()
    }

    #[must_use]
    pub fn bot(&self) -> &Arc<Bot<S>> {
        &self.bot
    }

    /// The distinct update types at least one router's handlers care
    /// about — ingestion drivers pass this to `getUpdates`'s `types` (or
    /// skip filtering entirely if empty, meaning "everything").
    #[must_use]
    pub fn used_update_types(&self) -> Vec<UpdateType> {
        let mut types: Vec<UpdateType> = self
            .routers
            .iter()
            .chain(std::iter::once(&self.main_router))
            .flat_map(Router::used_update_types)
            .collect();
        types.sort_by_key(|t| t.as_ref().to_owned());
        types.dedup();
        types
    }

    /// Flips the cooperative stop flag. The ingestion loop checks this at
    /// the top of each iteration (§4.2 point 5); in-flight handlers spawned
    /// under `use_create_task` are not cancelled.
    pub fn stop_polling(&self) {
        self.stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.stop_flag.load(std::sync::atomic::Ordering::Relaxed)
    }

    #[must_use]
    pub fn use_create_task(&self) -> bool {
        self.use_create_task
    }

    /// Builds the [`fsm::Context`] for `update` under this dispatcher's
    /// [`Strategy`].
    fn fsm_context_for(&self, update: &crate::types::Update) -> fsm::Context {
        let (chat_id, user_id) = update.get_ids();
        let key = self.strategy.key(self.bot.bot_id, chat_id, user_id);
        fsm::Context::new(Arc::clone(&self.storage), key)
    }

    /// Tries `update` against every router in order — the included routers
    /// first, then the main router (§3) — under the global middleware
    /// stack. Returns once some router handles, rejects, or fails it; a
    /// router returning `Unhandled` simply falls through to the next one.
    #[instrument(skip(self, update), fields(update_type = %update.update_type()))]
    pub async fn feed_update(&self, update: Arc<crate::types::Update>) -> PropagateEventResult<S> {
        let update_type = update.update_type();
        let (chat_id, user_id) = update.get_ids();
        let fsm_context = self.fsm_context_for(&update);

        let mut context = Context::new();
        context.insert(fsm_context.clone());

        let request = Request::new(Arc::clone(&self.bot), update, Arc::new(std::sync::Mutex::new(context)));

        for router in self.routers.iter().chain(std::iter::once(&self.main_router)) {
            match router.propagate(update_type, request.clone(), &self.middlewares).await {
                PropagateEventResult::Unhandled => continue,
                result @ (PropagateEventResult::Handled(_) | PropagateEventResult::Rejected) => return result,
                PropagateEventResult::Failed(err) => {
                    let process_info = format!("{update_type} | chat_id: {chat_id:?}, user_id: {user_id:?}");
                    let state = fsm_context.get_state().await.unwrap_or_default();
                    let data = fsm_context.get_data().await.unwrap_or_default();
                    error!(
                        router_id = router.router_id(),
                        process_info,
                        state = ?state,
                        data = ?data,
                        error = %err,
                        "handler or middleware failed; update considered handled"
                    );
                    return PropagateEventResult::Failed(err);
                }
            }
        }

        PropagateEventResult::Unhandled
    }
}

impl<S> Dispatcher<S>
where
    S: Session + Send + Sync + 'static,
{
    /// Runs the `on_started` pseudo-update: a `BotStarted` update carrying
    /// no real chat/user, dispatched once before the first real update
    /// (§4.4). Handlers that only care about "ingestion is ready" should
    /// filter on this shape, or more commonly just do setup work directly
    /// in an `on_started`-registered handler body.
    pub async fn emit_started(&self) -> PropagateEventResult<S> {
        let update = Arc::new(crate::types::Update::new(
            0,
            crate::types::UpdateKind::BotStarted(crate::types::BotStarted {
                chat_id: 0,
                user: crate::types::User {
                    user_id: self.bot.bot_id,
                    first_name: String::new(),
                    last_name: None,
                    username: None,
                    is_bot: true,
                    last_activity_time: None,
                },
                user_locale: None,
                payload: None,
            }),
        ));
        self.feed_update(update).await
    }

    /// Warns if webhook subscriptions are active while long-polling — the
    /// two ingestion modes are mutually exclusive on the platform side
    /// (§4.2 point 2). Polling proceeds regardless of the outcome.
    pub async fn warn_if_webhook_active(&self) {
        match self.bot.get_subscriptions().await {
            Ok(subscriptions) if !subscriptions.is_empty() => {
                warn!(
                    count = subscriptions.len(),
                    "webhook subscriptions are active while long-polling; the platform will not \
                     deliver the same updates twice, but having both configured is almost \
                     certainly a misconfiguration"
                );
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to check for active webhook subscriptions"),
        }
    }
}

/// Builds a [`Dispatcher`]: a consuming builder narrowed to this crate's
/// single-bot-per-dispatcher shape.
pub struct DispatcherBuilder<S = ReqwestSession> {
    bot: Option<Arc<Bot<S>>>,
    storage: Arc<dyn Storage>,
    strategy: Strategy,
    routers: Vec<Router<S>>,
    main_router: Router<S>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
    use_create_task: bool,
}

impl<S> DispatcherBuilder<S>
where
    S: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            bot: None,
            storage: Arc::new(MemoryStorage::new()),
            strategy: Strategy::UserInChat,
            routers: Vec::new(),
            main_router: Router::new("main"),
            middlewares: Vec::new(),
            use_create_task: false,
        }
    }

    #[must_use]
    pub fn bot(mut self, bot: Bot<S>) -> Self {
        self.bot = Some(Arc::new(bot));
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the main router (handlers registered directly on the
    /// dispatcher, tried last — see [`Dispatcher::feed_update`]).
    #[must_use]
    pub fn main_router(mut self, router: Router<S>) -> Self {
        self.main_router = router;
        self
    }

    /// Appends one included router, tried before the main router in the
    /// order they were added.
    #[must_use]
    pub fn include_router(mut self, router: Router<S>) -> Self {
        self.routers.push(router);
        self
    }

    /// Appends a global middleware, wrapping every handler attempt across
    /// the whole router tree (§4.4: "global middlewares on the Dispatcher
    /// wrap the entire router-tree traversal").
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn outer_middleware(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.insert(0, Arc::new(middleware));
        self
    }

    /// Opts into concurrent dispatch: ingestion spawns a task per update
    /// instead of awaiting handlers sequentially (§5).
    #[must_use]
    pub fn use_create_task(mut self, use_create_task: bool) -> Self {
        self.use_create_task = use_create_task;
        self
    }

    /// # Panics
    /// Panics if no bot was configured via [`DispatcherBuilder::bot`].
    #[must_use]
    pub fn build(self) -> Dispatcher<S> {
        Dispatcher {
            bot: self.bot.expect("Dispatcher requires a bot (see DispatcherBuilder::bot)"),
            storage: self.storage,
            strategy: self.strategy,
            routers: self.routers,
            main_router: self.main_router,
            middlewares: self.middlewares,
            use_create_task: self.use_create_task,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<S> Default for DispatcherBuilder<S>
where
    S: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
