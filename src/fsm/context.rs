//! The [`Context`] facade: a thin, cheaply-cloned handle combining a
//! [`Storage`] with one [`StorageKey`], so handler code reads
//! `context.get_state().await?` instead of threading both the storage and
//! the key through every call site.
//!
//! Rather than handing out a stateful `MemoryContext`/`RedisContext`
//! object per key (constructed fresh, with its own lock or connection,
//! on each access), the dispatcher holds one shared `Arc<dyn Storage>`
//! and builds a `Context` value (storage handle + key) per dispatched
//! update; it's cheaper to pass around and there's no separate context
//! cache to keep coherent with the backing storage.

use std::{collections::HashMap, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{state::State, Storage, StorageKey};

/// A storage handle scoped to one [`StorageKey`].
#[derive(Clone)]
pub struct Context {
    storage: Arc<dyn Storage>,
    key: StorageKey,
}

impl Context {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, key: StorageKey) -> Self {
        Self { storage, key }
    }

    #[must_use]
    pub fn key(&self) -> StorageKey {
        self.key
    }

    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn get_data(&self) -> anyhow::Result<HashMap<String, Value>> {
        self.storage.get_data(&self.key).await
    }

    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn set_data(&self, data: HashMap<String, Value>) -> anyhow::Result<()> {
        self.storage.set_data(&self.key, data).await
    }

    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn update_data(&self, patch: HashMap<String, Value>) -> anyhow::Result<()> {
        self.storage.update_data(&self.key, patch).await
    }

    /// Convenience over [`Context::get_data`] for one typed field.
    ///
    /// # Errors
    /// Propagates storage errors, or a JSON deserialization failure if the
    /// stored value doesn't match `T`.
    pub async fn get<T: DeserializeOwned>(&self, field: &str) -> anyhow::Result<Option<T>> {
        let data = self.get_data().await?;
        data.get(field)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Convenience over [`Context::update_data`] for one typed field.
    ///
    /// # Errors
    /// Propagates storage errors, or a JSON serialization failure.
    pub async fn set<T: Serialize>(&self, field: &str, value: T) -> anyhow::Result<()> {
        self.update_data(HashMap::from([(field.to_owned(), serde_json::to_value(value)?)]))
            .await
    }

    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn get_state(&self) -> anyhow::Result<Option<String>> {
        self.storage.get_state(&self.key).await
    }

    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn set_state(&self, state: Option<&State>) -> anyhow::Result<()> {
        self.storage
            .set_state(&self.key, state.map(|state| state.name().to_owned()))
            .await
    }

    /// Clears both state and data for this key.
    ///
    /// # Errors
    /// Propagates the backing [`Storage`]'s errors.
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.storage.clear(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fsm::MemoryStorage, states_group};
    use serde_json::json;

    states_group! {
        Flow {
            Start,
            Done,
        }
    }

    fn context() -> Context {
        Context::new(Arc::new(MemoryStorage::new()), StorageKey::new(1, Some(1), Some(2)))
    }

    #[tokio::test]
    async fn typed_get_set_round_trip() {
        let ctx = context();
        ctx.set("count", 3_i64).await.unwrap();
        assert_eq!(ctx.get::<i64>("count").await.unwrap(), Some(3));
        assert_eq!(ctx.get::<i64>("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn state_round_trips_by_canonical_name() {
        let ctx = context();
        assert_eq!(ctx.get_state().await.unwrap(), None);

        ctx.set_state(Some(&Flow::Start)).await.unwrap();
        assert_eq!(ctx.get_state().await.unwrap(), Some("Flow:Start".to_owned()));

        ctx.set_state(None).await.unwrap();
        assert_eq!(ctx.get_state().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_resets_data_and_state() {
        let ctx = context();
        ctx.set("x", json!(1)).await.unwrap();
        ctx.set_state(Some(&Flow::Done)).await.unwrap();

        ctx.clear().await.unwrap();

        assert_eq!(ctx.get_data().await.unwrap(), HashMap::new());
        assert_eq!(ctx.get_state().await.unwrap(), None);
    }
}
