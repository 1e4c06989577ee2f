//! Update-dispatch and state-management engine for MAX bots.
//!
//! This crate owns everything between "bytes arrived from the platform" and
//! "a handler ran": update ingestion (long-poll and webhook), decoding,
//! routing through filters and middleware, FSM context storage and the
//! callback-payload codec. It does not implement the full MAX Bot API
//! surface or outbound request building — see the `client` module for the
//! narrow slice of methods this crate needs for itself.

pub mod client;
pub mod codec;
pub mod context;
pub mod decoder;
pub mod dispatcher;
pub mod enums;
pub mod errors;
pub mod event;
pub mod extractors;
pub mod filters;
pub mod fsm;
pub mod ingestion;
pub mod methods;
pub mod middlewares;
pub mod router;
pub mod types;
pub mod utils;

pub use client::Bot;
pub use context::Context;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use fsm::Context as FSMContext;
pub use router::Router;
