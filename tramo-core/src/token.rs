//! Vendor authentication tokens.
//!
//! Read paths (listings, seat maps) share a bounded pool of long-lived tokens. Write
//! paths (block, offline confirmation, catalog fetch) always mint a fresh one.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::vendor::{Credentials, VendorApi};
use crate::{CoreError, CoreResult};

/// Vendor tokens are valid for twenty minutes after minting.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Clone)]
pub struct TokenPoolConfig {
    pub size: usize,
    /// Minimum pause between a slot being released and leased again.
    pub lease_delay: Duration,
    pub lease_timeout: Duration,
    pub token_ttl: Duration,
}

impl Default for TokenPoolConfig {
    fn default() -> Self {
        Self {
            size: 5,
            lease_delay: Duration::ZERO,
            lease_timeout: Duration::from_secs(5),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    minted_at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<CachedToken>,
    released_at: Option<Instant>,
}

/// Fixed number of token slots, each leased by one caller at a time.
pub struct TokenPool {
    name: String,
    slots: Mutex<VecDeque<Slot>>,
    permits: Semaphore,
    config: TokenPoolConfig,
}

impl TokenPool {
    pub fn new(name: &str, config: TokenPoolConfig) -> Self {
        let size = config.size.max(1);
        Self {
            name: name.to_string(),
            slots: Mutex::new((0..size).map(|_| Slot::default()).collect()),
            permits: Semaphore::new(size),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for a free slot, up to the lease timeout.
    ///
    /// A slot only leaves the queue once its lease delay has passed, so dropping this
    /// future at any await point leaves the pool intact.
    pub async fn lease(&self) -> CoreResult<Lease<'_>> {
        let permit = tokio::time::timeout(self.config.lease_timeout, self.permits.acquire())
            .await
            .map_err(|_| {
                warn!(
                    "Token pool {} lease timeout after {:?}",
                    self.name, self.config.lease_timeout
                );
                CoreError::PoolExhausted {
                    pool: self.name.clone(),
                    timeout_ms: self.config.lease_timeout.as_millis(),
                }
            })?
            .map_err(|e| CoreError::InternalError(format!("token pool {}: {}", self.name, e)))?;

        let slot = loop {
            let ready_at = {
                let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
                let released_at = slots
                    .front()
                    .ok_or_else(|| self.lost_slot())?
                    .released_at;
                match released_at.map(|at| at + self.config.lease_delay) {
                    Some(ready_at) if ready_at > Instant::now() => ready_at,
                    _ => break slots.pop_front().ok_or_else(|| self.lost_slot())?,
                }
            };
            tokio::time::sleep_until(ready_at).await;
        };

        Ok(Lease {
            pool: self,
            slot: Some(slot),
            token_ttl: self.config.token_ttl,
            _permit: permit,
        })
    }

    fn lost_slot(&self) -> CoreError {
        CoreError::InternalError(format!("token pool {} lost a slot", self.name))
    }
}

/// Exclusive use of one pool slot. The slot goes back to the pool on drop.
pub struct Lease<'a> {
    pool: &'a TokenPool,
    slot: Option<Slot>,
    token_ttl: Duration,
    _permit: SemaphorePermit<'a>,
}

impl Lease<'_> {
    /// The slot's token, unless it is missing or expired.
    pub fn valid_token(&self) -> Option<String> {
        let cached = self.slot.as_ref()?.token.as_ref()?;
        if cached.minted_at + self.token_ttl > Instant::now() {
            Some(cached.value.clone())
        } else {
            None
        }
    }

    pub fn store(&mut self, token: String) {
        if let Some(slot) = self.slot.as_mut() {
            slot.token = Some(CachedToken {
                value: token,
                minted_at: Instant::now(),
            });
        }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(mut slot) = self.slot.take() {
            slot.released_at = Some(Instant::now());
            self.pool
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(slot);
        }
    }
}

/// Default credentials plus per-white-label overrides.
#[derive(Debug, Clone)]
pub struct CredentialBook {
    pub default: Credentials,
    pub whitelabels: HashMap<String, Credentials>,
}

impl CredentialBook {
    pub fn new(default: Credentials) -> Self {
        Self {
            default,
            whitelabels: HashMap::new(),
        }
    }

    pub fn with_whitelabel(mut self, tag: &str, credentials: Credentials) -> Self {
        self.whitelabels.insert(tag.to_string(), credentials);
        self
    }

    pub fn resolve(&self, whitelabel: Option<&str>) -> &Credentials {
        whitelabel
            .and_then(|tag| self.whitelabels.get(tag))
            .unwrap_or(&self.default)
    }
}

pub struct TokenSource {
    vendor: Arc<dyn VendorApi>,
    pool: TokenPool,
    credentials: CredentialBook,
}

impl TokenSource {
    pub fn new(vendor: Arc<dyn VendorApi>, pool: TokenPool, credentials: CredentialBook) -> Self {
        Self {
            vendor,
            pool,
            credentials,
        }
    }

    /// Always authenticate, with the white-label's credentials when it has any.
    pub async fn mint(&self, whitelabel: Option<&str>) -> CoreResult<String> {
        let credentials = self.credentials.resolve(whitelabel);
        debug!("Minting vendor token for {}", credentials.user);
        self.vendor.authenticate(credentials).await
    }

    /// A pooled token, minted into its slot when the cached one has expired.
    pub async fn pooled(&self) -> CoreResult<String> {
        let mut lease = self.pool.lease().await?;
        self.token_for(&mut lease, false).await
    }

    async fn token_for(&self, lease: &mut Lease<'_>, force_refresh: bool) -> CoreResult<String> {
        if !force_refresh {
            if let Some(token) = lease.valid_token() {
                return Ok(token);
            }
        }
        let token = self.mint(None).await?;
        lease.store(token.clone());
        Ok(token)
    }

    /// Run a read call with a pooled token held for its duration.
    ///
    /// Any failure is retried exactly once with a freshly minted pooled token.
    pub async fn with_read_token<T, F, Fut>(&self, op: F) -> CoreResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        match self.read_attempt(&op, false).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("Read with pooled token failed, retrying with a new token: {}", err);
                let value = self.read_attempt(&op, true).await?;
                info!("Read retry on pool {} succeeded", self.pool.name());
                Ok(value)
            }
        }
    }

    async fn read_attempt<T, F, Fut>(&self, op: &F, force_refresh: bool) -> CoreResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        let mut lease = self.pool.lease().await?;
        let token = self.token_for(&mut lease, force_refresh).await?;
        op(token).await
    }
}
