use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::{
    client::Session,
    decoder::{self, DecodeOutcome},
    dispatcher::Dispatcher,
    errors::SessionErrorKind,
    types::Update,
};

/// Knobs for [`run_polling`]: a `polling_timeout`-style builder, widened
/// to the platform's other `getUpdates` parameters.
#[derive(Debug, Clone)]
pub struct PollingOptions {
    /// Long-poll timeout passed to `getUpdates`, in seconds. Clamped to
    /// the platform's `0..=90` at call time.
    pub timeout: u32,
    /// Max updates per `getUpdates` call. Clamped to `1..=1000`.
    pub limit: u32,
    /// Discard events timestamped before the loop started, on the first
    /// iteration only — useful after a long downtime to avoid replaying
    /// a backlog.
    pub skip_updates: bool,
    /// Warn if a webhook subscription is active before the loop starts
    /// (§4.2 point 2). The two ingestion modes are mutually exclusive on
    /// the platform side.
    pub auto_check_subscriptions: bool,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            timeout: 30,
            limit: 100,
            skip_updates: false,
            auto_check_subscriptions: true,
        }
    }
}

impl PollingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn skip_updates(mut self, skip_updates: bool) -> Self {
        self.skip_updates = skip_updates;
        self
    }

    #[must_use]
    pub fn auto_check_subscriptions(mut self, auto_check_subscriptions: bool) -> Self {
        self.auto_check_subscriptions = auto_check_subscriptions;
        self
    }
}

/// Fatal failure of the long-poll loop. Everything else in the retry
/// table (§4.2) is handled internally by sleeping and continuing.
#[derive(Error, Debug)]
pub enum PollingError {
    #[error("authenticating with the platform failed: {0}")]
    AuthFailure(#[source] SessionErrorKind),
}

/// Runs the long-poll loop until [`Dispatcher::stop_polling`] is called or
/// an auth failure is hit. Returns `Ok(())` on a cooperative stop.
///
/// # Errors
/// Returns [`PollingError::AuthFailure`] if the initial `getMe` or any
/// later `getUpdates` call fails with an unauthorized/forbidden platform
/// error — the retry table treats this as fatal rather than retryable.
#[instrument(skip(dispatcher, options))]
pub async fn run_polling<S>(
    dispatcher: Arc<Dispatcher<S>>,
    options: PollingOptions,
) -> Result<(), PollingError>
where
    S: Session + Send + Sync + 'static,
{
    let timeout = options.timeout.min(90);
    let limit = options.limit.clamp(1, 1000);

    dispatcher
        .bot()
        .get_me()
        .await
        .map_err(PollingError::AuthFailure)?;

    if options.auto_check_subscriptions {
        dispatcher.warn_if_webhook_active().await;
    }

    dispatcher.emit_started().await;

    let types = used_update_types(&dispatcher);
    let loop_start_time = now_millis();
    let mut marker: Option<i64> = None;
    let mut first_iteration = true;

    info!("starting long-poll loop");

    while !dispatcher.is_stopping() {
        match dispatcher
            .bot()
            .get_updates(marker, timeout, limit, types.as_deref())
            .await
        {
            Ok(result) => {
                if let Some(next_marker) = result.marker {
                    marker = Some(next_marker);
                }

                for raw in result.updates {
                    handle_raw_update(&dispatcher, raw, first_iteration, loop_start_time, options.skip_updates)
                        .await;
                }

                first_iteration = false;
            }
            Err(SessionErrorKind::Transport(err)) => {
                if is_timeout(&err) {
                    continue;
                }
                warn!(error = %err, "transport error reaching the platform; sleeping 30s");
                sleep(Duration::from_secs(30)).await;
            }
            Err(SessionErrorKind::Platform(kind)) if !kind.is_retryable() => {
                error!(error = %kind, "authentication with the platform failed; stopping the loop");
                return Err(PollingError::AuthFailure(SessionErrorKind::Platform(kind)));
            }
            Err(SessionErrorKind::Platform(kind)) => {
                warn!(error = %kind, "platform error fetching updates; sleeping 5s");
                sleep(Duration::from_secs(5)).await;
            }
            Err(err) => {
                error!(error = %err, "unexpected error fetching updates; sleeping 5s");
                sleep(Duration::from_secs(5)).await;
            }
        }
    }

    info!("long-poll loop stopped");
    Ok(())
}

async fn handle_raw_update<S>(
    dispatcher: &Arc<Dispatcher<S>>,
    raw: serde_json::Value,
    first_iteration: bool,
    loop_start_time: i64,
    skip_updates: bool,
) where
    S: Session + Send + Sync + 'static,
{
    match decoder::decode(&raw) {
        Ok(DecodeOutcome::Decoded(mut update)) => {
            if skip_updates && first_iteration && update.timestamp < loop_start_time {
                return;
            }
            decoder::enrich(&mut update, dispatcher.bot()).await;
            dispatch(dispatcher, update).await;
        }
        Ok(DecodeOutcome::Unrecognized { raw_type }) => {
            warn!(raw_type, "skipping update with an unrecognized update_type");
        }
        Err(err) => warn!(error = %err, "failed to decode update; skipping it"),
    }
}

async fn dispatch<S>(dispatcher: &Arc<Dispatcher<S>>, update: Update)
where
    S: Session + Send + Sync + 'static,
{
    let update = Arc::new(update);
    if dispatcher.use_create_task() {
        let dispatcher = Arc::clone(dispatcher);
        tokio::spawn(async move {
            dispatcher.feed_update(update).await;
        });
    } else {
        dispatcher.feed_update(update).await;
    }
}

fn used_update_types<S>(dispatcher: &Dispatcher<S>) -> Option<Vec<String>>
where
    S: Send + Sync + 'static,
{
    let types: Vec<String> = dispatcher
        .used_update_types()
        .iter()
        .map(|t| t.as_ref().to_owned())
        .collect();
    if types.is_empty() {
        None
    } else {
        Some(types)
    }
}

/// Distinguishes "Request timeout" from "Transport/connect failure" in
/// the retry table. `reqwest::Error` survives the `anyhow::Error` wrapping
/// unchanged (`ReqwestSession::send_request` propagates it via bare `?`),
/// so a downcast recovers its own timeout signal. Any other `Session`
/// implementation falls through to the generic connect-failure branch.
fn is_timeout(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .is_some_and(reqwest::Error::is_timeout)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{Bot, ReqwestSession},
        errors::HandlerError,
        event::EventReturn,
        router::{HandlerOptions, Router},
        enums::UpdateType,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn polling_options_default_matches_platform_defaults() {
        let options = PollingOptions::default();
        assert_eq!(options.timeout, 30);
        assert_eq!(options.limit, 100);
        assert!(!options.skip_updates);
        assert!(options.auto_check_subscriptions);
    }

    #[test]
    fn used_update_types_is_none_when_nothing_registered() {
        let dispatcher = Dispatcher::<ReqwestSession>::builder()
            .bot(Bot::new("1:secret"))
            .build();
        assert_eq!(used_update_types(&dispatcher), None);
    }

    #[test]
    fn used_update_types_collects_wire_strings() {
        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageCreated,
            || async { Ok::<_, HandlerError>(EventReturn::Finish) },
            HandlerOptions::new(),
        );
        let dispatcher = Dispatcher::<ReqwestSession>::builder()
            .bot(Bot::new("1:secret"))
            .main_router(router)
            .build();

        assert_eq!(
            used_update_types(&dispatcher),
            Some(vec!["message_created".to_owned()])
        );
    }

    #[tokio::test]
    async fn handle_raw_update_dispatches_a_decodable_update() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(EventReturn::Finish)
            },
            HandlerOptions::new(),
        );
        let dispatcher = Arc::new(
            Dispatcher::<ReqwestSession>::builder()
                .bot(Bot::new("1:secret"))
                .main_router(router)
                .build(),
        );

        let raw = serde_json::json!({
            "update_type": "message_removed",
            "timestamp": 1,
            "message_id": "m1",
            "chat_id": 1,
            "user_id": 2,
        });

        handle_raw_update(&dispatcher, raw, false, 0, false).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handle_raw_update_skips_backlog_on_first_iteration() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut router = Router::<ReqwestSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(EventReturn::Finish)
            },
            HandlerOptions::new(),
        );
        let dispatcher = Arc::new(
            Dispatcher::<ReqwestSession>::builder()
                .bot(Bot::new("1:secret"))
                .main_router(router)
                .build(),
        );

        let raw = serde_json::json!({
            "update_type": "message_removed",
            "timestamp": 1,
            "message_id": "m1",
            "chat_id": 1,
            "user_id": 2,
        });

        handle_raw_update(&dispatcher, raw, true, 1_000, true).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handle_raw_update_ignores_unrecognized_update_type() {
        let dispatcher = Arc::new(
            Dispatcher::<ReqwestSession>::builder()
                .bot(Bot::new("1:secret"))
                .build(),
        );

        let raw = serde_json::json!({"update_type": "meteor_strike", "timestamp": 1});

        handle_raw_update(&dispatcher, raw, false, 0, false).await;
    }

    /// End-to-end scenario 5 (spec §8): `getUpdates` fails with a transport
    /// error twice, the loop sleeps and retries both times, and the third
    /// call's update is dispatched.
    #[tokio::test(start_paused = true)]
    async fn retries_transport_failures_then_dispatches() {
        use crate::{client::ClientResponse, methods::ApiMethod};
        use async_trait::async_trait;
        use std::sync::atomic::AtomicBool;

        #[derive(Clone, Default)]
        struct FlakyThenOkSession {
            update_calls: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl crate::client::Session for FlakyThenOkSession {
            async fn send_request<C, M>(
                &self,
                _bot: &Bot<C>,
                method: &M,
                _timeout: Option<f32>,
            ) -> Result<ClientResponse, anyhow::Error>
            where
                C: crate::client::Session,
                M: ApiMethod + Send + Sync,
            {
                if method.path().as_ref() == "me" {
                    return Ok(ClientResponse::new(
                        200u16,
                        serde_json::json!({
                            "user_id": 1, "first_name": "Bot", "last_name": null,
                            "username": null, "is_bot": true, "last_activity_time": null
                        })
                        .to_string(),
                    ));
                }

                let call = self.update_calls.fetch_add(1, Ordering::SeqCst);
                if call < 2 {
                    anyhow::bail!("simulated transport failure");
                }
                if call == 2 {
                    return Ok(ClientResponse::new(
                        200u16,
                        serde_json::json!({
                            "marker": 1,
                            "updates": [{
                                "update_type": "message_removed",
                                "timestamp": 1,
                                "message_id": "m1",
                                "chat_id": 1,
                                "user_id": 2,
                            }],
                        })
                        .to_string(),
                    ));
                }
                // Stops the loop deterministically right after the one
                // dispatch, instead of looping forever on instant successes
                // with nothing to make the test task yield back.
                Ok(ClientResponse::new(
                    401u16,
                    serde_json::json!({"message": "unauthorized"}).to_string(),
                ))
            }
        }

        static HANDLED: AtomicBool = AtomicBool::new(false);

        let mut router = Router::<FlakyThenOkSession>::new("main");
        router.register(
            UpdateType::MessageRemoved,
            || async {
                HANDLED.store(true, Ordering::SeqCst);
                Ok::<_, HandlerError>(EventReturn::Finish)
            },
            HandlerOptions::new(),
        );

        let dispatcher = Arc::new(
            Dispatcher::<FlakyThenOkSession>::builder()
                .bot(Bot::with_client("1:secret", FlakyThenOkSession::default()))
                .main_router(router)
                .build(),
        );

        let polling_dispatcher = Arc::clone(&dispatcher);
        let task = tokio::spawn(async move {
            run_polling(
                polling_dispatcher,
                PollingOptions::new().auto_check_subscriptions(false),
            )
            .await
        });

        for _ in 0..10 {
            if HANDLED.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::advance(Duration::from_secs(31)).await;
            tokio::task::yield_now().await;
        }
        assert!(HANDLED.load(Ordering::SeqCst), "update was never dispatched after retries");

        // The mock turns fatal (unauthorized) right after the one success,
        // so the loop exits on its own without needing `stop_polling`.
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("polling loop did not stop after the simulated auth failure")
            .unwrap();
        assert!(matches!(result, Err(PollingError::AuthFailure(_))));
    }
}
