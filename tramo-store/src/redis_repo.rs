use async_trait::async_trait;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use tramo_core::booking::{ExtendedRecord, TentativeRecord};
use tramo_core::repository::{extended_key, BookingStateStore};
use tramo_core::{CoreError, CoreResult};

/// Booking state kept in Redis as JSON strings with `SET EX` expiry.
///
/// The tentative record lives under the transaction id, the extended record under
/// `{transaction id}-Transaction`.
#[derive(Clone)]
pub struct RedisStateStore {
    client: redis::Client,
}

impl RedisStateStore {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> CoreResult<()> {
        let payload = serde_json::to_string(value)
            .map_err(|e| CoreError::InternalError(format!("encode {}: {}", key, e)))?;
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(internal)?;
        conn.set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1))
            .await
            .map_err(internal)?;
        debug!("Stored {} for {}s", key, ttl.as_secs());
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CoreResult<Option<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(internal)?;
        let payload: Option<String> = conn.get(key).await.map_err(internal)?;
        payload
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| CoreError::InternalError(format!("decode {}: {}", key, e)))
            })
            .transpose()
    }
}

fn internal(err: redis::RedisError) -> CoreError {
    CoreError::InternalError(format!("redis: {}", err))
}

#[async_trait]
impl BookingStateStore for RedisStateStore {
    async fn put_tentative(
        &self,
        transaction_id: &str,
        record: &TentativeRecord,
        ttl: Duration,
    ) -> CoreResult<()> {
        self.put_json(transaction_id, record, ttl).await
    }

    async fn get_tentative(&self, transaction_id: &str) -> CoreResult<Option<TentativeRecord>> {
        self.get_json(transaction_id).await
    }

    async fn delete_tentative(&self, transaction_id: &str) -> CoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(internal)?;
        conn.del::<_, ()>(transaction_id).await.map_err(internal)?;
        info!("Tentative record removed: {}", transaction_id);
        Ok(())
    }

    async fn put_extended(
        &self,
        transaction_id: &str,
        record: &ExtendedRecord,
        ttl: Duration,
    ) -> CoreResult<()> {
        self.put_json(&extended_key(transaction_id), record, ttl).await
    }

    async fn get_extended(&self, transaction_id: &str) -> CoreResult<Option<ExtendedRecord>> {
        self.get_json(&extended_key(transaction_id)).await
    }
}
