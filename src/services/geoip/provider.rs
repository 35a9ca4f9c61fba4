//! GeoIP Provider 抽象层
//!
//! 根据配置选择查询实现：
//! 1. maxminddb_path 已配置且可读 → MaxMindProvider
//! 2. 否则配置了 geoip_api_url → ExternalApiProvider
//! 3. 都没有 → 所有公网地址解析为 Unknown

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::AnalyticsConfig;
use crate::utils::ip::is_private_or_local;

/// Country and city used for missing, loopback or private addresses
pub const LOCAL: &str = "Local";
/// Country and city used when a lookup misses or lacks the field
pub const UNKNOWN: &str = "Unknown";

/// Raw lookup result; either field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Resolved location stored on a click event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country: String,
    pub city: String,
}

impl Location {
    pub fn local() -> Self {
        Self {
            country: LOCAL.to_string(),
            city: LOCAL.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            country: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
        }
    }
}

impl From<GeoInfo> for Location {
    fn from(info: GeoInfo) -> Self {
        let non_empty = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        Self {
            country: non_empty(info.country),
            city: non_empty(info.city),
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// Lookup used when no backend is configured
pub struct DisabledLookup;

#[async_trait]
impl GeoIpLookup for DisabledLookup {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// 统一 GeoIP Provider
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    pub fn new(config: &AnalyticsConfig) -> Self {
        let external = || -> Arc<dyn GeoIpLookup> {
            match config.geoip_api_url.as_deref().filter(|u| !u.is_empty()) {
                Some(url) => Arc::new(ExternalApiProvider::new(url)),
                None => Arc::new(DisabledLookup),
            }
        };

        let inner = match config.maxminddb_path.as_deref() {
            Some(path) => match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider) as Arc<dyn GeoIpLookup>
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back",
                        path, e
                    );
                    external()
                }
            },
            None => {
                debug!("GeoIP: No MaxMind database configured");
                external()
            }
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// Wrap an explicit lookup backend
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    pub fn disabled() -> Self {
        Self::with_lookup(Arc::new(DisabledLookup))
    }

    /// Resolve a client address; never fails
    ///
    /// Missing, unparsable-as-public, loopback and private addresses map to
    /// `Local`. Anything the backend cannot place maps to `Unknown`.
    pub async fn resolve(&self, ip: Option<&str>) -> Location {
        let Some(ip) = ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
            return Location::local();
        };
        if let Ok(addr) = ip.parse::<IpAddr>()
            && is_private_or_local(&addr)
        {
            return Location::local();
        }

        match self.inner.lookup(ip).await {
            Some(info) => Location::from(info),
            None => Location::unknown(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
