use std::{
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    client::Bot,
    context::Context,
    errors::ExtractorError,
    filters::Kwargs,
    fsm,
    types::{Callback, Chat, Message, Update, UpdateKind, User},
};

use super::FromEventAndContext;

/// A handler taking `Bot<S>` by value gets a clone; [`Bot`] is cheap to
/// clone (see [`crate::client::Bot`]).
impl<S: Clone> FromEventAndContext<S> for Bot<S> {
    type Error = Infallible;

    fn extract(
        bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok((*bot).clone())
    }
}

impl<S> FromEventAndContext<S> for Arc<Bot<S>> {
    type Error = Infallible;

    fn extract(
        bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok(bot)
    }
}

impl<S> FromEventAndContext<S> for Update {
    type Error = Infallible;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok((*update).clone())
    }
}

impl<S> FromEventAndContext<S> for Arc<Update> {
    type Error = Infallible;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok(update)
    }
}

/// The per-`(chat, user)` FSM facade, always available to a handler (see
/// §4.4 of the dispatch spec — `context` is injected for every update).
impl<S> FromEventAndContext<S> for fsm::Context {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_cloned::<fsm::Context>()
            .ok_or_else(|| ExtractorError::new("no FSM context bound to this request"))
    }
}

/// Parsed command arguments, put in the context bag by
/// [`crate::middlewares::ProvideCommandArgs`].
impl<S> FromEventAndContext<S> for Vec<String> {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_cloned::<Vec<String>>()
            .ok_or_else(|| {
                ExtractorError::new("no command args bound to this request; attach ProvideCommandArgs")
            })
    }
}

/// The merged `Some(dict)` results of this request's router- and
/// handler-level [`crate::filters::BaseFilter`]s, or an empty map if none
/// contributed anything — a handler can always declare `Kwargs` without
/// checking whether any base filter actually ran.
impl<S> FromEventAndContext<S> for Kwargs {
    type Error = Infallible;

    fn extract(
        _bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok(context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_cloned::<Kwargs>()
            .unwrap_or_default())
    }
}

/// Declining to extract never fails the handler call; `None` is passed
/// through instead. Useful for optional enrichment data, e.g.
/// `from_user: Option<User>`.
impl<S, T> FromEventAndContext<S> for Option<T>
where
    T: FromEventAndContext<S>,
{
    type Error = Infallible;

    fn extract(
        bot: Arc<Bot<S>>,
        update: Arc<Update>,
        context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok(T::extract(bot, update, context).ok())
    }
}

/// The enriched `chat` attached by [`crate::decoder::enrich`], if
/// `auto_requests` is on and the lookup succeeded.
impl<S> FromEventAndContext<S> for Chat {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        update
            .enrichment
            .chat
            .clone()
            .ok_or_else(|| ExtractorError::new("update has no enriched chat (auto_requests off or lookup failed)"))
    }
}

/// The enriched `from_user`, if enrichment ran and succeeded.
impl<S> FromEventAndContext<S> for User {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        update
            .enrichment
            .from_user
            .clone()
            .ok_or_else(|| ExtractorError::new("update has no enriched user (auto_requests off or lookup failed)"))
    }
}

/// Only `message_created`/`message_edited` updates carry a [`Message`].
impl<S> FromEventAndContext<S> for Message {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        match &update.kind {
            UpdateKind::MessageCreated(created) => Ok(created.message.clone()),
            UpdateKind::MessageEdited(edited) => Ok(edited.message.clone()),
            UpdateKind::MessageCallback(callback) => callback
                .message
                .clone()
                .ok_or_else(|| ExtractorError::new("callback update carries no message")),
            _ => Err(ExtractorError::new("update does not carry a message")),
        }
    }
}

/// Only `message_callback` updates carry a [`Callback`].
impl<S> FromEventAndContext<S> for Callback {
    type Error = ExtractorError;

    fn extract(
        _bot: Arc<Bot<S>>,
        update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        match &update.kind {
            UpdateKind::MessageCallback(callback) => Ok(callback.callback.clone()),
            _ => Err(ExtractorError::new("update is not a message_callback")),
        }
    }
}
