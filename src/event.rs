//! The handler-call machinery: what a handler returns, what a dispatch
//! pass returns, and the [`Handler`]/[`HandlerObject`] pair that adapts an
//! arbitrary async function into something the router can call uniformly.
//!
//! Handlers are stored directly as a boxed closure rather than behind a
//! two-phase `ServiceFactory`/`Service` indirection — there's no
//! config-time service construction step this crate needs a built-once-
//! per-process handler for.

mod handler;

pub use handler::{BoxedHandler, Handler, HandlerObject, Request, Response};

/// What a handler's `Ok` value means for propagation to the next handler
/// in a router (see [`crate::router::Router`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReturn {
    /// Stop trying further handlers registered for this update: this one
    /// owns it.
    Finish,
    /// This handler declined to act (e.g. decided its filters matched but
    /// the update isn't actually for it); try the next registered handler.
    Skip,
}

impl From<()> for EventReturn {
    fn from((): ()) -> Self {
        Self::Finish
    }
}

/// The outcome of trying one update against one router (or the whole
/// dispatcher): did a handler take it, reject it, or was there nothing
/// registered that even matched its filters.
#[derive(Debug)]
pub enum PropagateEventResult<S = crate::client::ReqwestSession> {
    /// A handler ran and returned [`EventReturn::Finish`].
    Handled(Response<S>),
    /// Every handler whose filters matched returned [`EventReturn::Skip`].
    Rejected,
    /// No handler's filters matched this update at all.
    Unhandled,
    /// A handler or one of its middlewares returned an error. The update is
    /// still considered handled — the dispatcher logs this and moves on to
    /// the next update rather than trying further routers.
    Failed(crate::errors::EventErrorKind),
}
