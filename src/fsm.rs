//! Finite-state-machine context storage: per-`(chat, user)` state plus an
//! arbitrary data bag, backed by a pluggable [`Storage`].
//!
//! There's no FSM support in the Telegram-side framework this crate's
//! dispatch engine is modeled on, since Telegram bots there lean on
//! per-chat state conventions instead of a first-class state machine. MAX
//! bots need one, so this module is grounded directly in the reference
//! implementation's `storage`/`context` packages instead.

mod context;
mod key;
mod state;
mod storage;

pub use context::Context;
pub use key::StorageKey;
pub use state::{State, StatesGroup, Strategy};
pub use storage::{MemoryStorage, Storage};

#[cfg(feature = "redis-storage")]
pub use storage::RedisStorage;
