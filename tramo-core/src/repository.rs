use async_trait::async_trait;
use std::time::Duration;

use crate::booking::{ExtendedRecord, TentativeRecord};
use crate::CoreResult;

/// Key under which the extended record of a transaction is stored.
pub fn extended_key(transaction_id: &str) -> String {
    format!("{}-Transaction", transaction_id)
}

/// Short-lived storage for booking state between marketplace calls.
///
/// Records disappear once their TTL elapses; a `None` read means the hold is gone.
#[async_trait]
pub trait BookingStateStore: Send + Sync {
    async fn put_tentative(
        &self,
        transaction_id: &str,
        record: &TentativeRecord,
        ttl: Duration,
    ) -> CoreResult<()>;

    async fn get_tentative(&self, transaction_id: &str) -> CoreResult<Option<TentativeRecord>>;

    async fn delete_tentative(&self, transaction_id: &str) -> CoreResult<()>;

    async fn put_extended(
        &self,
        transaction_id: &str,
        record: &ExtendedRecord,
        ttl: Duration,
    ) -> CoreResult<()>;

    async fn get_extended(&self, transaction_id: &str) -> CoreResult<Option<ExtendedRecord>>;
}
