use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LinktallyError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 应用配置（从 TOML + 环境变量加载）
///
/// - server: 监听地址、对外 base_url、可信代理
/// - database: 持久化存储连接与重试
/// - cache: 短码 → URL 缓存
/// - links: 短码生成参数
/// - analytics: GeoIP 与点击记录队列
/// - logging: 日志输出
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LT，分隔符：__
    /// 示例：LT__SERVER__PORT=9999
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("LT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.trusted_proxies")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| LinktallyError::config(format!("Failed to build config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| LinktallyError::config(format!("Failed to deserialize config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// 检查相互约束的字段
    pub fn validate(&self) -> Result<()> {
        if self.links.code_length == 0 {
            return Err(LinktallyError::config("links.code_length must be at least 1"));
        }
        if self.links.max_generation_attempts == 0 {
            return Err(LinktallyError::config(
                "links.max_generation_attempts must be at least 1",
            ));
        }
        if self.analytics.queue_capacity == 0 {
            return Err(LinktallyError::config(
                "analytics.queue_capacity must be at least 1",
            ));
        }
        if self.analytics.max_retained_clicks == Some(0) {
            return Err(LinktallyError::config(
                "analytics.max_retained_clicks must be at least 1 when set",
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Public origin used to build `shortUrl` in responses
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// IPs or CIDRs whose X-Forwarded-For header is honoured.
    /// Empty list: any private/loopback peer is treated as a proxy.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// true → 301, false → 307
    #[serde(default = "default_permanent_redirect")]
    pub permanent_redirect: bool,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `memory://` selects the in-process store
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 缓存类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Memory,
    Redis,
    None,
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    #[serde(default)]
    pub cache_type: CacheType,
    /// TTL of a code → URL entry, independent of the link's own expiry
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

/// 分析统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// MaxMindDB 文件路径 (GeoLite2-City.mmdb)
    #[serde(default)]
    pub maxminddb_path: Option<String>,
    /// 外部 GeoIP API URL，使用 {ip} 作为占位符
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: Option<String>,
    /// Pending clicks buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_analytics_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_analytics_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Raw click events kept per link; older events are folded into counters.
    /// Unset keeps the full history.
    #[serde(default)]
    pub max_retained_clicks: Option<usize>,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_permanent_redirect() -> bool {
    true
}

fn default_database_url() -> String {
    "linktally.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "url:".to_string()
}

fn default_memory_capacity() -> u64 {
    10000
}

fn default_code_length() -> usize {
    6
}

fn default_max_generation_attempts() -> u32 {
    10
}

fn default_geoip_api_url() -> Option<String> {
    Some("http://ip-api.com/json/{ip}?fields=status,countryCode,city".to_string())
}

fn default_queue_capacity() -> usize {
    10000
}

fn default_analytics_max_retries() -> u32 {
    3
}

fn default_analytics_retry_base_delay_ms() -> u64 {
    50
}

fn default_recent_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            base_url: default_base_url(),
            trusted_proxies: Vec::new(),
            cpu_count: default_cpu_count(),
            permanent_redirect: default_permanent_redirect(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::default(),
            default_ttl: default_cache_ttl(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            maxminddb_path: None,
            geoip_api_url: default_geoip_api_url(),
            queue_capacity: default_queue_capacity(),
            max_retries: default_analytics_max_retries(),
            retry_base_delay_ms: default_analytics_retry_base_delay_ms(),
            max_retained_clicks: None,
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.links.code_length, 6);
        assert_eq!(config.links.max_generation_attempts, 10);
        assert_eq!(config.cache.default_ttl, 3600);
        assert_eq!(config.cache.cache_type, CacheType::Memory);
        assert_eq!(config.analytics.recent_limit, 10);
        assert!(config.analytics.max_retained_clicks.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = AppConfig::generate_sample_config();
        let parsed: AppConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.cache.redis.key_prefix, "url:");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [links]
            code_length = 8

            [cache]
            type = "none"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.links.code_length, 8);
        assert_eq!(parsed.links.max_generation_attempts, 10);
        assert_eq!(parsed.cache.cache_type, CacheType::None);
        assert_eq!(parsed.cache.default_ttl, 3600);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.links.code_length = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.analytics.max_retained_clicks = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.database.database_url, "linktally.db");
    }
}
