//! The webhook ingestion mode: a small `axum` app that receives pushed
//! updates over HTTP instead of long-polling for them (§4.3). A plain
//! `axum::Router`/`State`/`Json` app, sharing the dispatcher as shared
//! state across requests.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    response::Json,
    routing::{post, MethodRouter},
    Router as AxumRouter,
};
use tracing::{instrument, warn};

use crate::{
    client::Session,
    decoder::{self, DecodeOutcome},
    dispatcher::Dispatcher,
};

/// Default path the platform posts updates to when none is configured.
const DEFAULT_PATH: &str = "/";

/// An `axum` app wrapping one [`Dispatcher`]. Receives updates on a single
/// configurable path and always answers `{"ok":true}`, so the platform
/// never retries delivery regardless of what decoding or dispatch did
/// internally (§4.3 point 2).
///
/// Additional routes can be attached with [`WebhookApp::route`] for
/// user-defined endpoints (health checks, other webhooks) served from the
/// same process.
pub struct WebhookApp<S = crate::client::ReqwestSession> {
    router: AxumRouter<Arc<Dispatcher<S>>>,
}

impl<S> WebhookApp<S>
where
    S: Session + Send + Sync + 'static,
{
    /// Builds an app that receives updates at `path` (commonly `/`).
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            router: AxumRouter::new().route(path, post(receive_update::<S>)),
        }
    }

    /// Attaches an additional POST route to the same app, sharing the
    /// dispatcher as its state.
    #[must_use]
    pub fn route(mut self, path: &str, handler: MethodRouter<Arc<Dispatcher<S>>>) -> Self {
        self.router = self.router.route(path, handler);
        self
    }

    /// Binds `dispatcher` as this app's shared state and serves it at
    /// `addr` until the process is killed.
    ///
    /// # Errors
    /// Returns an error if the listener can't be bound or the server
    /// encounters an I/O failure.
    #[instrument(skip(self, dispatcher))]
    pub async fn serve(self, addr: SocketAddr, dispatcher: Arc<Dispatcher<S>>) -> std::io::Result<()> {
        let app = self.router.with_state(dispatcher);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await
    }
}

impl<S> Default for WebhookApp<S>
where
    S: Session + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}

async fn receive_update<S>(
    State(dispatcher): State<Arc<Dispatcher<S>>>,
    Json(raw): Json<serde_json::Value>,
) -> Json<serde_json::Value>
where
    S: Session + Send + Sync + 'static,
{
    match decoder::decode(&raw) {
        Ok(DecodeOutcome::Decoded(mut update)) => {
            decoder::enrich(&mut update, dispatcher.bot()).await;
            let update = Arc::new(update);
            if dispatcher.use_create_task() {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher.feed_update(update).await;
                });
            } else {
                dispatcher.feed_update(update).await;
            }
        }
        Ok(DecodeOutcome::Unrecognized { raw_type }) => {
            warn!(raw_type, "webhook received an unrecognized update_type");
        }
        Err(err) => warn!(error = %err, "webhook failed to decode update"),
    }

    Json(serde_json::json!({"ok": true}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Bot, ReqwestSession};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt as _;

    fn dispatcher() -> Arc<Dispatcher<ReqwestSession>> {
        Arc::new(
            Dispatcher::builder()
                .bot(Bot::new("1:secret"))
                .build(),
        )
    }

    #[tokio::test]
    async fn always_answers_ok_even_for_unrecognized_updates() {
        let app = WebhookApp::new("/").router.with_state(dispatcher());

        let body = serde_json::json!({"update_type": "meteor_strike", "timestamp": 1}).to_string();
        let request = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn answers_ok_for_a_decodable_update() {
        let app = WebhookApp::new("/").router.with_state(dispatcher());

        let body = serde_json::json!({
            "update_type": "message_removed",
            "timestamp": 1,
            "message_id": "m1",
            "chat_id": 1,
            "user_id": 2,
        })
        .to_string();
        let request = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
