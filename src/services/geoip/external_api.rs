//! HTTP GeoIP API 查询（如 ip-api.com）
//!
//! 结果按 IP 缓存在 moka 中，同一 IP 的并发查询只发一次请求

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};

const CACHE_TTL_SECS: u64 = 15 * 60;
const CACHE_MAX_CAPACITY: u64 = 10_000;
const HTTP_TIMEOUT_SECS: u64 = 2;

pub struct ExternalApiProvider {
    /// `{ip}` is replaced by the queried address
    url_template: String,
    agent: Agent,
    /// None 也会被缓存（负缓存）
    cache: Cache<String, Option<GeoInfo>>,
}

impl ExternalApiProvider {
    pub fn new(url_template: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into();
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .max_capacity(CACHE_MAX_CAPACITY)
            .build();

        Self {
            url_template: url_template.to_string(),
            agent,
            cache,
        }
    }

    fn fetch_blocking(agent: Agent, url: String) -> Option<GeoInfo> {
        let resp = match agent.get(&url).call() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("GeoIP API request to \"{}\" failed: {}", url, e);
                return None;
            }
        };
        match resp.into_body().read_json::<Value>() {
            Ok(json) => parse_response(&json),
            Err(e) => {
                warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
                None
            }
        }
    }

    async fn fetch(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.url_template.replace("{ip}", ip);
        let agent = self.agent.clone();
        // ureq 是同步的
        tokio::task::spawn_blocking(move || Self::fetch_blocking(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP lookup task failed: {}", e);
                None
            })
    }
}

/// Accepts ip-api.com (`countryCode`) and the common `country_code` / `country` shapes
fn parse_response(json: &Value) -> Option<GeoInfo> {
    if json["status"].as_str() == Some("fail") {
        trace!("GeoIP API returned fail status");
        return None;
    }

    let country = ["countryCode", "country_code", "country"]
        .iter()
        .find_map(|key| json[*key].as_str())
        .map(String::from);
    let city = json["city"].as_str().map(String::from);

    Some(GeoInfo { country, city })
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        self.cache
            .get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}", ip);
                self.fetch(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
