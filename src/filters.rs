//! Boolean predicates gating whether a handler is even tried for an
//! update, plus the `bool | dict` predicate kind from spec §4.4 that can
//! also contribute extra kwargs (see [`BaseFilter`]/[`Kwargs`] below). A
//! plain [`Filter`] never mutates anything and never injects data for the
//! handler — that's what [`crate::middlewares`] is for (see
//! `filters::command` for the split in practice: [`command::IsCommand`]
//! decides yes/no, the dispatcher's command middleware is what exposes
//! parsed arguments).

pub mod command;
mod combinators;

pub use combinators::{And, Invert, Or};

use std::{collections::HashMap, future::Future, sync::Arc};

use async_trait::async_trait;

use crate::event::Request;

/// A predicate over one dispatch request. Combine with `.and()`/`.or()`/
/// `.invert()`, or register several on a handler — all of a handler's
/// filters must pass (see [`crate::event::HandlerObject::filter`]).
#[async_trait]
pub trait Filter<S>: Send + Sync {
    async fn check(&self, request: &Request<S>) -> bool;

    fn invert(self) -> Invert<S>
    where
        Self: Sized + 'static,
    {
        Invert::new(self)
    }

    fn and(self, filter: impl Filter<S> + 'static) -> And<S>
    where
        Self: Sized + 'static,
    {
        And::new(self).and(filter)
    }

    fn or(self, filter: impl Filter<S> + 'static) -> Or<S>
    where
        Self: Sized + 'static,
    {
        Or::new(self).or(filter)
    }
}

#[async_trait]
impl<T: ?Sized, S> Filter<S> for Arc<T>
where
    T: Filter<S>,
    S: Send + Sync,
{
    async fn check(&self, request: &Request<S>) -> bool {
        T::check(self, request).await
    }
}

/// Lets a plain async closure `Fn(&Request<S>) -> impl Future<Output = bool>`
/// be used anywhere a [`Filter`] is expected.
#[async_trait]
impl<S, Func, Fut> Filter<S> for Func
where
    S: Send + Sync,
    Func: Fn(&Request<S>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn check(&self, request: &Request<S>) -> bool {
        self(request).await
    }
}

/// What a [`BaseFilter`] returns: `None` rejects, `Some(extra)` accepts
/// and contributes `extra` to the handler's [`Kwargs`] — the Rust
/// rendition of spec §4.4's "predicate filter: `(event) -> bool | dict`".
pub type FilterOutcome = Option<HashMap<String, serde_json::Value>>;

/// Extra keyword-style data accumulated from router- and handler-level
/// [`BaseFilter`]s, merged in evaluation order and readable back out of a
/// handler via the `Kwargs` extractor (see `crate::extractors::impls`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs(pub HashMap<String, serde_json::Value>);

/// A filter that, besides gating, can contribute extra data for the
/// handler to read back — router-wide (`Router::base_filter`) or
/// handler-scoped (`HandlerOptions::base_filter`). Grounded on the
/// reference implementation's `BaseFilter`/`process_base_filters`
/// (`maxapi/dispatcher.py`): each filter in a list runs in order, `Some`
/// results are merged key-wise, and the first `None` stops evaluation for
/// that list.
#[async_trait]
pub trait BaseFilter<S>: Send + Sync {
    async fn check(&self, request: &Request<S>) -> FilterOutcome;
}

#[async_trait]
impl<T: ?Sized, S> BaseFilter<S> for Arc<T>
where
    T: BaseFilter<S>,
    S: Send + Sync,
{
    async fn check(&self, request: &Request<S>) -> FilterOutcome {
        T::check(self, request).await
    }
}

/// Lets a plain async closure `Fn(&Request<S>) -> impl Future<Output = FilterOutcome>`
/// be used anywhere a [`BaseFilter`] is expected.
#[async_trait]
impl<S, Func, Fut> BaseFilter<S> for Func
where
    S: Send + Sync,
    Func: Fn(&Request<S>) -> Fut + Send + Sync,
    Fut: Future<Output = FilterOutcome> + Send,
{
    async fn check(&self, request: &Request<S>) -> FilterOutcome {
        self(request).await
    }
}

/// Runs `filters` against `request` in order, merging `Some(dict)` results
/// key-wise and stopping at the first `None`. An empty list accepts with
/// no contributed kwargs, matching `_check_router_filters`'s `{}` default
/// when a router/handler declares no base filters.
pub async fn apply_base_filters<S: Send + Sync>(
    filters: &[Arc<dyn BaseFilter<S>>],
    request: &Request<S>,
) -> FilterOutcome {
    let mut merged = HashMap::new();
    for filter in filters {
        match filter.check(request).await {
            Some(extra) => merged.extend(extra),
            None => return None,
        }
    }
    Some(merged)
}
