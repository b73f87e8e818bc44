use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tramo_core::booking::{ExtendedRecord, TentativeRecord};
use tramo_core::repository::{extended_key, BookingStateStore};
use tramo_core::CoreResult;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// Process-local store with the same expiry semantics as Redis. Used in tests and
/// single-instance development runs.
#[derive(Default)]
pub struct InMemoryStateStore {
    tentative: RwLock<HashMap<String, Entry<TentativeRecord>>>,
    extended: RwLock<HashMap<String, Entry<ExtendedRecord>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn live<T: Clone>(entry: Option<&Entry<T>>) -> Option<T> {
    entry
        .filter(|entry| entry.expires_at > Instant::now())
        .map(|entry| entry.value.clone())
}

#[async_trait]
impl BookingStateStore for InMemoryStateStore {
    async fn put_tentative(
        &self,
        transaction_id: &str,
        record: &TentativeRecord,
        ttl: Duration,
    ) -> CoreResult<()> {
        self.tentative.write().await.insert(
            transaction_id.to_string(),
            Entry {
                value: record.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get_tentative(&self, transaction_id: &str) -> CoreResult<Option<TentativeRecord>> {
        Ok(live(self.tentative.read().await.get(transaction_id)))
    }

    async fn delete_tentative(&self, transaction_id: &str) -> CoreResult<()> {
        self.tentative.write().await.remove(transaction_id);
        Ok(())
    }

    async fn put_extended(
        &self,
        transaction_id: &str,
        record: &ExtendedRecord,
        ttl: Duration,
    ) -> CoreResult<()> {
        self.extended.write().await.insert(
            extended_key(transaction_id),
            Entry {
                value: record.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get_extended(&self, transaction_id: &str) -> CoreResult<Option<ExtendedRecord>> {
        Ok(live(self.extended.read().await.get(&extended_key(transaction_id))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramo_core::booking::{LegTransactions, PendingTicket};
    use tramo_core::secret::Secret;

    fn tentative() -> TentativeRecord {
        TentativeRecord {
            token: Secret::new("token-1".to_string()),
            seats: vec![3, 4],
            passengers: Vec::new(),
            whitelabel: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_expire_after_ttl() {
        let store = InMemoryStateStore::new();
        store
            .put_tentative("txn-1", &tentative(), Duration::from_secs(900))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(899)).await;
        assert_eq!(store.get_tentative("txn-1").await.unwrap(), Some(tentative()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get_tentative("txn-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_extended_records_are_kept_apart() {
        let store = InMemoryStateStore::new();
        let record = ExtendedRecord {
            whitelabel: Some("acme".to_string()),
            legs: vec![LegTransactions {
                reference_id: "1a2b3c4dXY12".to_string(),
                tickets: vec![PendingTicket {
                    seat: 3,
                    transaction_id: "TX-1".to_string(),
                }],
            }],
        };
        store
            .put_extended("txn-1", &record, Duration::from_secs(1_800))
            .await
            .unwrap();

        assert!(store.get_tentative("txn-1").await.unwrap().is_none());
        assert_eq!(store.get_extended("txn-1").await.unwrap(), Some(record));

        store.delete_tentative("txn-1").await.unwrap();
        assert!(store.get_extended("txn-1").await.unwrap().is_some());
    }
}
