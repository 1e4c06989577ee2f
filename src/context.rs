//! The request-scoped "extras" bag that flows alongside an [`crate::types::Update`]
//! through filters, middlewares and into the handler.
//!
//! Python frameworks in this space thread a `dict[str, Any]` of accumulated kwargs
//! through the dispatch pipeline and hand handlers whichever keys their signature
//! declares. Rust has no runtime parameter reflection, so this crate replaces the
//! kwarg dict with a small type-keyed map (the same trick `http::Extensions` and
//! `axum::extract::Extension` use): a middleware that wants to hand the handler a
//! `Vec<String>` of command arguments calls `context.insert(args)`, and the handler
//! (or an [`crate::extractors::FromEventAndContext`] impl) calls
//! `context.get::<Vec<String>>()`.
//!
//! One `Context` is created per dispatched update and is always reachable as
//! `Arc<tokio::sync::Mutex<Context>>` from that point on, so middlewares earlier in
//! a chain can stash data for ones (or a handler) further down.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
};

type AnyBox = Box<dyn Any + Send + Sync>;

/// A type-keyed map of at-most-one value per type, scoped to a single dispatch.
#[derive(Default)]
pub struct Context {
    values: HashMap<TypeId, AnyBox>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing whatever was previously stored for type `T`.
    /// Returns the previous value, if any.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok().map(|boxed| *boxed))
    }

    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    #[must_use]
    pub fn get_cloned<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.get::<T>().cloned()
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok().map(|boxed| *boxed))
    }

    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_retrieves_by_type() {
        let mut ctx = Context::new();
        assert!(ctx.get::<String>().is_none());

        ctx.insert(String::from("hello"));
        ctx.insert(42_i32);

        assert_eq!(ctx.get::<String>(), Some(&"hello".to_owned()));
        assert_eq!(ctx.get::<i32>(), Some(&42));
    }

    #[test]
    fn insert_replaces_previous_value_of_same_type() {
        let mut ctx = Context::new();
        ctx.insert(vec!["a".to_owned()]);
        let prev = ctx.insert(vec!["b".to_owned(), "c".to_owned()]);

        assert_eq!(prev, Some(vec!["a".to_owned()]));
        assert_eq!(ctx.get::<Vec<String>>(), Some(&vec!["b".to_owned(), "c".to_owned()]));
    }

    #[test]
    fn remove_takes_value_out() {
        let mut ctx = Context::new();
        ctx.insert(7_u64);
        assert_eq!(ctx.remove::<u64>(), Some(7));
        assert!(ctx.get::<u64>().is_none());
    }
}
