//! [`Storage`] and its implementations: where FSM state and data actually
//! live.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::StorageKey;

/// Persists FSM state and an arbitrary JSON data bag per [`StorageKey`].
///
/// An empty data map is equivalent to no entry at all: implementations are
/// free to drop the backing record once both state is cleared and data is
/// empty, matching the reference Redis implementation's
/// delete-when-empty behavior.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_data(&self, key: &StorageKey) -> anyhow::Result<HashMap<String, Value>>;

    async fn set_data(&self, key: &StorageKey, data: HashMap<String, Value>) -> anyhow::Result<()>;

    /// Merges `patch` into the existing data for `key`, overwriting any
    /// keys `patch` also sets. Implementations must perform this
    /// read-modify-write atomically with respect to concurrent callers on
    /// the same key.
    async fn update_data(&self, key: &StorageKey, patch: HashMap<String, Value>) -> anyhow::Result<()>;

    async fn set_state(&self, key: &StorageKey, state: Option<String>) -> anyhow::Result<()>;

    async fn get_state(&self, key: &StorageKey) -> anyhow::Result<Option<String>>;

    /// Clears both state and data for `key`.
    async fn clear(&self, key: &StorageKey) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
struct Record {
    data: HashMap<String, Value>,
    state: Option<String>,
}

/// In-process [`Storage`], keyed by a `RwLock<HashMap<..>>`. Data does not
/// survive process restart; use [`RedisStorage`] (feature `redis-storage`)
/// for that.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<StorageKey, Record>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_data(&self, key: &StorageKey) -> anyhow::Result<HashMap<String, Value>> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .map(|record| record.data.clone())
            .unwrap_or_default())
    }

    async fn set_data(&self, key: &StorageKey, data: HashMap<String, Value>) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.entry(*key).or_default().data = data;
        Ok(())
    }

    async fn update_data(&self, key: &StorageKey, patch: HashMap<String, Value>) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.entry(*key).or_default().data.extend(patch);
        Ok(())
    }

    async fn set_state(&self, key: &StorageKey, state: Option<String>) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.entry(*key).or_default().state = state;
        Ok(())
    }

    async fn get_state(&self, key: &StorageKey) -> anyhow::Result<Option<String>> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .and_then(|record| record.state.clone()))
    }

    async fn clear(&self, key: &StorageKey) -> anyhow::Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }
}

#[cfg(feature = "redis-storage")]
mod redis_storage {
    use std::borrow::Cow;

    use redis::AsyncCommands;

    use super::{HashMap, StorageKey, Value};

    /// Key part stored under a given [`StorageKey`], using a
    /// `"bot_id:chat_id:user_id:part"` scheme.
    fn redis_key(key: &StorageKey, part: &str) -> String {
        format!(
            "{}:{}:{}:{part}",
            key.bot_id,
            key.chat_id.map_or_else(|| "-".to_owned(), |id| id.to_string()),
            key.user_id.map_or_else(|| "-".to_owned(), |id| id.to_string()),
        )
    }

    /// Atomically merges new fields into the JSON object stored at
    /// `KEYS[1]`, creating it if absent.
    const UPDATE_DATA_SCRIPT: &str = r"
        local data = redis.call('get', KEYS[1])
        local decoded = {}
        if data then
            decoded = cjson.decode(data)
        end
        local updates = cjson.decode(ARGV[1])
        for k, v in pairs(updates) do
            decoded[k] = v
        end
        redis.call('set', KEYS[1], cjson.encode(decoded))
        return redis.status_reply('OK')
    ";

    /// Redis-backed [`super::Storage`]. State and data live under separate
    /// keys so that clearing data doesn't require re-parsing JSON to find
    /// the state, and vice versa.
    pub struct RedisStorage {
        client: redis::Client,
        key_prefix: Cow<'static, str>,
        state_ttl: Option<u64>,
        data_ttl: Option<u64>,
    }

    impl RedisStorage {
        #[must_use]
        pub fn new(client: redis::Client) -> Self {
            Self {
                client,
                key_prefix: Cow::Borrowed("maxers"),
                state_ttl: None,
                data_ttl: None,
            }
        }

        #[must_use]
        pub fn with_key_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
            self.key_prefix = prefix.into();
            self
        }

        #[must_use]
        pub fn with_state_ttl(mut self, seconds: u64) -> Self {
            self.state_ttl = Some(seconds);
            self
        }

        #[must_use]
        pub fn with_data_ttl(mut self, seconds: u64) -> Self {
            self.data_ttl = Some(seconds);
            self
        }

        fn data_key(&self, key: &StorageKey) -> String {
            format!("{}:{}", self.key_prefix, redis_key(key, "data"))
        }

        fn state_key(&self, key: &StorageKey) -> String {
            format!("{}:{}", self.key_prefix, redis_key(key, "state"))
        }
    }

    #[async_trait::async_trait]
    impl super::Storage for RedisStorage {
        async fn get_data(&self, key: &StorageKey) -> anyhow::Result<HashMap<String, Value>> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let raw: Option<String> = conn.get(self.data_key(key)).await?;
            Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?.unwrap_or_default())
        }

        async fn set_data(&self, key: &StorageKey, data: HashMap<String, Value>) -> anyhow::Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let redis_key = self.data_key(key);

            if data.is_empty() {
                conn.del::<_, ()>(redis_key).await?;
                return Ok(());
            }

            let encoded = serde_json::to_string(&data)?;
            match self.data_ttl {
                Some(ttl) => conn.set_ex::<_, _, ()>(redis_key, encoded, ttl).await?,
                None => conn.set::<_, _, ()>(redis_key, encoded).await?,
            }
            Ok(())
        }

        async fn update_data(&self, key: &StorageKey, patch: HashMap<String, Value>) -> anyhow::Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let script = redis::Script::new(UPDATE_DATA_SCRIPT);
            let encoded = serde_json::to_string(&patch)?;

            script
                .key(self.data_key(key))
                .arg(encoded)
                .invoke_async::<_, ()>(&mut conn)
                .await?;

            if let Some(ttl) = self.data_ttl {
                conn.expire::<_, ()>(self.data_key(key), ttl as i64).await?;
            }

            Ok(())
        }

        async fn set_state(&self, key: &StorageKey, state: Option<String>) -> anyhow::Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let redis_key = self.state_key(key);

            match state {
                None => conn.del::<_, ()>(redis_key).await?,
                Some(state) => match self.state_ttl {
                    Some(ttl) => conn.set_ex::<_, _, ()>(redis_key, state, ttl).await?,
                    None => conn.set::<_, _, ()>(redis_key, state).await?,
                },
            }
            Ok(())
        }

        async fn get_state(&self, key: &StorageKey) -> anyhow::Result<Option<String>> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            Ok(conn.get(self.state_key(key)).await?)
        }

        async fn clear(&self, key: &StorageKey) -> anyhow::Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.del::<_, ()>((self.data_key(key), self.state_key(key))).await?;
            Ok(())
        }
    }
}

#[cfg(feature = "redis-storage")]
pub use redis_storage::RedisStorage;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> StorageKey {
        StorageKey::new(1, Some(10), Some(20))
    }

    #[tokio::test]
    async fn data_round_trips_through_memory_storage() {
        let storage = MemoryStorage::new();
        let key = key();

        assert_eq!(storage.get_data(&key).await.unwrap(), HashMap::new());

        storage
            .set_data(&key, HashMap::from([("a".to_owned(), json!(1))]))
            .await
            .unwrap();
        assert_eq!(
            storage.get_data(&key).await.unwrap(),
            HashMap::from([("a".to_owned(), json!(1))])
        );
    }

    #[tokio::test]
    async fn update_data_merges_rather_than_replaces() {
        let storage = MemoryStorage::new();
        let key = key();

        storage
            .set_data(&key, HashMap::from([("a".to_owned(), json!(1))]))
            .await
            .unwrap();
        storage
            .update_data(&key, HashMap::from([("b".to_owned(), json!(2))]))
            .await
            .unwrap();

        assert_eq!(
            storage.get_data(&key).await.unwrap(),
            HashMap::from([("a".to_owned(), json!(1)), ("b".to_owned(), json!(2))])
        );
    }

    #[tokio::test]
    async fn state_defaults_to_none_and_round_trips() {
        let storage = MemoryStorage::new();
        let key = key();

        assert_eq!(storage.get_state(&key).await.unwrap(), None);

        storage
            .set_state(&key, Some("Registration:AwaitingName".to_owned()))
            .await
            .unwrap();
        assert_eq!(
            storage.get_state(&key).await.unwrap(),
            Some("Registration:AwaitingName".to_owned())
        );
    }

    #[tokio::test]
    async fn clear_resets_both_data_and_state() {
        let storage = MemoryStorage::new();
        let key = key();

        storage
            .set_data(&key, HashMap::from([("a".to_owned(), json!(1))]))
            .await
            .unwrap();
        storage.set_state(&key, Some("S".to_owned())).await.unwrap();

        storage.clear(&key).await.unwrap();

        assert_eq!(storage.get_data(&key).await.unwrap(), HashMap::new());
        assert_eq!(storage.get_state(&key).await.unwrap(), None);
    }
}
