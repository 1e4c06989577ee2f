//! Gets updates into a [`crate::dispatcher::Dispatcher`]: either by
//! long-polling `getUpdates` ([`long_poll`]) or by receiving them pushed
//! over HTTP ([`webhook`], behind the `webhook` feature).
//!
//! A single polling task drives updates into the dispatcher directly,
//! rather than a separate listener/receiver channel pair — the
//! concurrency decision lives at per-update dispatch, not in the
//! ingestion layer itself (§5). The retry table (§4.2) specifies fixed
//! sleep durations per error kind, so plain `tokio::time::sleep` is used
//! rather than an exponential-backoff helper.

mod long_poll;
#[cfg(feature = "webhook")]
mod webhook;

pub use long_poll::{run_polling, PollingError, PollingOptions};
#[cfg(feature = "webhook")]
pub use webhook::WebhookApp;
