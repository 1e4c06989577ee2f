use std::sync::Arc;

use async_trait::async_trait;

use crate::event::Request;

use super::Filter;

/// `!inner`.
pub struct Invert<S> {
    inner: Arc<dyn Filter<S>>,
}

impl<S> Invert<S> {
    pub fn new(filter: impl Filter<S> + 'static) -> Self {
        Self {
            inner: Arc::new(filter),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> Filter<S> for Invert<S> {
    async fn check(&self, request: &Request<S>) -> bool {
        !self.inner.check(request).await
    }
}

/// `a && b && ...`, short-circuiting left to right.
pub struct And<S> {
    filters: Vec<Arc<dyn Filter<S>>>,
}

impl<S> And<S> {
    pub fn new(filter: impl Filter<S> + 'static) -> Self {
        Self {
            filters: vec![Arc::new(filter)],
        }
    }

    #[must_use]
    pub fn and(mut self, filter: impl Filter<S> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }
}

#[async_trait]
impl<S: Send + Sync> Filter<S> for And<S> {
    async fn check(&self, request: &Request<S>) -> bool {
        for filter in &self.filters {
            if !filter.check(request).await {
                return false;
            }
        }
        true
    }
}

/// `a || b || ...`, short-circuiting left to right.
pub struct Or<S> {
    filters: Vec<Arc<dyn Filter<S>>>,
}

impl<S> Or<S> {
    pub fn new(filter: impl Filter<S> + 'static) -> Self {
        Self {
            filters: vec![Arc::new(filter)],
        }
    }

    #[must_use]
    pub fn or(mut self, filter: impl Filter<S> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }
}

#[async_trait]
impl<S: Send + Sync> Filter<S> for Or<S> {
    async fn check(&self, request: &Request<S>) -> bool {
        for filter in &self.filters {
            if filter.check(request).await {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Bot, ReqwestSession};
    use crate::context::Context;
    use crate::types::{MessageRemoved, Update, UpdateKind};
    use std::sync::Mutex;

    fn request() -> Request<ReqwestSession> {
        Request::new(
            Arc::new(Bot::new("1:secret")),
            Arc::new(Update::new(
                1,
                UpdateKind::MessageRemoved(MessageRemoved {
                    message_id: "m".into(),
                    chat_id: 1,
                    user_id: 2,
                }),
            )),
            Arc::new(Mutex::new(Context::new())),
        )
    }

    struct Always(bool);

    #[async_trait]
    impl Filter<ReqwestSession> for Always {
        async fn check(&self, _request: &Request<ReqwestSession>) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn and_requires_every_filter() {
        let filter = And::new(Always(true)).and(Always(false));
        assert!(!filter.check(&request()).await);

        let filter = And::new(Always(true)).and(Always(true));
        assert!(filter.check(&request()).await);
    }

    #[tokio::test]
    async fn or_requires_any_filter() {
        let filter = Or::new(Always(false)).or(Always(true));
        assert!(filter.check(&request()).await);

        let filter = Or::new(Always(false)).or(Always(false));
        assert!(!filter.check(&request()).await);
    }

    #[tokio::test]
    async fn invert_flips_result() {
        assert!(!Invert::new(Always(true)).check(&request()).await);
        assert!(Invert::new(Always(false)).check(&request()).await);
    }
}
