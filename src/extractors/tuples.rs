//! [`FromEventAndContext`] for `()` and tuples, so a handler's whole
//! argument list extracts in one shot: [`crate::event::HandlerObject::new`]
//! calls `Args::extract` once, where `Args` is the handler's parameter list
//! collected into a tuple by the blanket [`crate::event::Handler`] impls.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use crate::{client::Bot, context::Context, errors::ExtractorError, types::Update};

use super::FromEventAndContext;

impl<S> FromEventAndContext<S> for () {
    type Error = Infallible;

    fn extract(
        _bot: Arc<Bot<S>>,
        _update: Arc<Update>,
        _context: Arc<Mutex<Context>>,
    ) -> Result<Self, Self::Error> {
        Ok(())
    }
}

macro_rules! tuple_from_event_and_context {
    ($($T:ident),+) => {
        impl<S, $($T,)+> FromEventAndContext<S> for ($($T,)+)
        where
            $($T: FromEventAndContext<S>, $T::Error: Into<ExtractorError>,)+
        {
            type Error = ExtractorError;

            #[allow(non_snake_case)]
            fn extract(
                bot: Arc<Bot<S>>,
                update: Arc<Update>,
                context: Arc<Mutex<Context>>,
            ) -> Result<Self, Self::Error> {
                $(
                    let $T = $T::extract(Arc::clone(&bot), Arc::clone(&update), Arc::clone(&context))
                        .map_err(Into::into)?;
                )+
                Ok(($($T,)+))
            }
        }
    };
}

tuple_from_event_and_context! { A }
tuple_from_event_and_context! { A, B }
tuple_from_event_and_context! { A, B, C }
tuple_from_event_and_context! { A, B, C, D }
tuple_from_event_and_context! { A, B, C, D, E }
tuple_from_event_and_context! { A, B, C, D, E, F }
