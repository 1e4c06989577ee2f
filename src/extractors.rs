//! Binds handler arguments to an update dispatch.
//!
//! Python frameworks in this space reflect on a handler's parameter names at
//! call time and hand it whichever accumulated kwargs it asked for. Rust has
//! no such reflection, so this crate replaces it with [`FromEventAndContext`]:
//! a trait implemented once per argument type, called by [`crate::event::HandlerObject`]
//! for every declared parameter before the handler itself runs. A handler's
//! signature is then just an ordinary function signature — `async fn(bot:
//! Bot, message: Message, context: fsm::Context)` — ordered however the
//! author likes.

mod impls;
mod tuples;

use std::sync::{Arc, Mutex};

use crate::{client::Bot, context::Context, types::Update};

/// Produces one handler argument from the three things every dispatched
/// update carries: the bot, the update itself, and the request-scoped
/// [`Context`] bag that filters/middlewares stash extras in.
///
/// Implemented for [`Bot`], [`std::sync::Arc<Bot>`], [`Update`],
/// [`std::sync::Arc<Update>`], [`crate::fsm::Context`], `Vec<String>`
/// (command arguments — see [`crate::middlewares::ProvideCommandArgs`]),
/// `Option<T>` of any extractor, and every `callback_payload!`-generated
/// type (see [`crate::codec::CallbackPayload`]).
pub trait FromEventAndContext<S>: Sized {
    type Error;

    /// # Errors
    /// Implementation-defined: typically "this update doesn't carry the
    /// value this extractor wants" (e.g. a `Message` extractor run against a
    /// `MessageCallback` update) or "nothing put this in the context bag".
    fn extract(
        bot: Arc<Bot<S>>,
        update: Arc<Update>,
        context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error>;
}
