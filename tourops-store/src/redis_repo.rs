use async_trait::async_trait;
use redis::AsyncCommands;
use tourops_core::{CoreError, CoreResult, KeyValueStore};
use tracing::info;

/// Redis-backed [`KeyValueStore`] for per-user client state
#[derive(Clone)]
pub struct RedisKeyValueStore {
    client: redis::Client,
}

impl RedisKeyValueStore {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis key/value store configured");
        Ok(Self { client })
    }

    async fn connection(&self) -> CoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_error)
    }
}

fn store_error(err: redis::RedisError) -> CoreError {
    CoreError::Store(err.to_string())
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(store_error)
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(RedisKeyValueStore::new("not a redis url").is_err());
        assert!(RedisKeyValueStore::new("redis://127.0.0.1:6379").is_ok());
    }
}
