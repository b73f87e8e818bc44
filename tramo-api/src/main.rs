use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tramo_api::{app, AppState};
use tramo_catalog::{CatalogSettings, InventoryService};
use tramo_core::token::{CredentialBook, TokenPool, TokenSource};
use tramo_core::vendor::VendorApi;
use tramo_order::{BookingCoordinator, BookingPolicy};
use tramo_store::app_config::Config;
use tramo_store::RedisStateStore;
use tramo_vendor::HttpVendorClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tramo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tramo API on port {}", config.server.port);

    let app_state = build_state(&config)?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let vendor: Arc<dyn VendorApi> = Arc::new(
        HttpVendorClient::new(
            &config.vendor.base_url,
            Duration::from_millis(config.vendor.connect_timeout_ms),
            Duration::from_millis(config.vendor.request_timeout_ms),
        )
        .context("Failed to build vendor client")?,
    );

    let credentials = config
        .vendor
        .whitelabels
        .iter()
        .fold(CredentialBook::new(config.vendor.credentials.clone()), |book, (tag, creds)| {
            book.with_whitelabel(tag, creds.clone())
        });
    let tokens = Arc::new(TokenSource::new(
        vendor.clone(),
        TokenPool::new("inventory", config.token_pool.pool_config()),
        credentials,
    ));

    let rules = &config.business_rules;
    let inventory = InventoryService::new(
        vendor.clone(),
        tokens.clone(),
        CatalogSettings {
            company: rules.company_code.clone(),
            support_connections: rules.support_connections,
            skip_template_layout: rules.skip_template_layout,
        },
    );

    let store = RedisStateStore::new(&config.redis.url).context("Invalid Redis URL")?;
    let bookings = BookingCoordinator::new(
        vendor,
        tokens,
        Arc::new(store),
        BookingPolicy {
            block_duration: Duration::from_secs(rules.block_duration_seconds),
            extended_duration: Duration::from_secs(rules.extended_duration_seconds),
        },
    );

    Ok(AppState {
        inventory: Arc::new(inventory),
        bookings: Arc::new(bookings),
    })
}
