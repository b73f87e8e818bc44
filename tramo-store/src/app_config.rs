use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tramo_core::token::TokenPoolConfig;
use tramo_core::vendor::Credentials;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub vendor: VendorConfig,
    #[serde(default)]
    pub token_pool: TokenPoolSettings,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub credentials: Credentials,
    /// White-label tag -> credential pair.
    #[serde(default)]
    pub whitelabels: HashMap<String, Credentials>,
}

fn default_connect_timeout_ms() -> u64 { 3_000 }
fn default_request_timeout_ms() -> u64 { 30_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct TokenPoolSettings {
    #[serde(default = "default_pool_size")]
    pub size: usize,
    #[serde(default)]
    pub lease_delay_ms: u64,
    #[serde(default = "default_lease_timeout_ms")]
    pub lease_timeout_ms: u64,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

fn default_pool_size() -> usize { 5 }
fn default_lease_timeout_ms() -> u64 { 5_000 }
fn default_token_ttl_seconds() -> u64 { 1_200 }

impl Default for TokenPoolSettings {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            lease_delay_ms: 0,
            lease_timeout_ms: default_lease_timeout_ms(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl TokenPoolSettings {
    pub fn pool_config(&self) -> TokenPoolConfig {
        TokenPoolConfig {
            size: self.size,
            lease_delay: Duration::from_millis(self.lease_delay_ms),
            lease_timeout: Duration::from_millis(self.lease_timeout_ms),
            token_ttl: Duration::from_secs(self.token_ttl_seconds),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_block_duration_seconds")]
    pub block_duration_seconds: u64,
    #[serde(default = "default_extended_duration_seconds")]
    pub extended_duration_seconds: u64,
    /// Company whose services are sold.
    pub company_code: String,
    #[serde(default)]
    pub support_connections: bool,
    #[serde(default)]
    pub skip_template_layout: bool,
}

fn default_block_duration_seconds() -> u64 { 900 }
fn default_extended_duration_seconds() -> u64 { 1_800 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TRAMO_VENDOR__BASE_URL=http://...` sets `vendor.base_url`
            .add_source(
                config::Environment::with_prefix("TRAMO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }
}
