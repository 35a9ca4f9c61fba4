//! IP 地理位置查询
//!
//! - MaxMind GeoLite2 本地数据库
//! - 外部 HTTP API (ip-api.com 等)

mod external_api;
mod maxmind;
mod provider;

pub use provider::{
    DisabledLookup, GeoInfo, GeoIpLookup, GeoIpProvider, LOCAL, Location, UNKNOWN,
};
