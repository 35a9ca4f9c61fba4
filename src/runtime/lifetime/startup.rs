use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analytics::{ClickRecorder, RecorderConfig};
use crate::cache::{self, UrlCache};
use crate::config::AppConfig;
use crate::services::GeoIpProvider;
use crate::storage::{LinkStore, StorageFactory};

/// Components shared by every worker, constructed once
pub struct StartupContext {
    pub store: Arc<dyn LinkStore>,
    pub cache: Arc<dyn UrlCache>,
    pub recorder: Arc<ClickRecorder>,
}

/// Pick the process-wide rustls provider before any TLS client is built
pub fn install_crypto_provider() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))
}

/// 准备服务器启动的上下文：存储、缓存、GeoIP、点击记录器
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StorageFactory::create(&config.database, config.analytics.max_retained_clicks)
        .await
        .context("Failed to create storage backend")?;

    let cache = cache::create_cache(&config.cache).await;

    let geoip = GeoIpProvider::new(&config.analytics);
    info!("GeoIP provider: {}", geoip.provider_name());

    let recorder = Arc::new(ClickRecorder::spawn(
        store.clone(),
        geoip,
        RecorderConfig::from(&config.analytics),
    ));

    if config.server.trusted_proxies.is_empty() {
        warn!(
            "Trusted proxies: auto-detect mode. \
             Connections from private IPs will use X-Forwarded-For. \
             Configure server.trusted_proxies to restrict this."
        );
    } else {
        info!("Trusted proxies: {:?}", config.server.trusted_proxies);
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(StartupContext {
        store,
        cache,
        recorder,
    })
}
